//! Shared fixtures for service unit tests.

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{Config, DEFAULT_PROFILE_IMAGE};
use crate::domain::{
    AuthProvider, Booking, BookingStatus, Hotel, Password, PaymentMethod, Room, RoomType, User,
    UserRole,
};
use crate::infra::{
    BookingRepository, HotelRepository, MockBookingRepository, MockHotelRepository,
    MockRoomRepository, MockUserRepository, RoomRepository, UnitOfWork, UserRepository,
};

pub const TEST_PASSWORD: &str = "password123";

static TEST_PASSWORD_HASH: Lazy<String> = Lazy::new(|| {
    Password::new(TEST_PASSWORD)
        .expect("test password is valid")
        .into_string()
});

pub fn test_config() -> Config {
    Config::for_tests("unit-test-secret-that-is-long-enough-for-hs256")
}

/// Mock repositories to set expectations on before building the unit of work
#[derive(Default)]
pub struct MockRepos {
    pub users: MockUserRepository,
    pub hotels: MockHotelRepository,
    pub rooms: MockRoomRepository,
    pub bookings: MockBookingRepository,
}

impl MockRepos {
    pub fn into_uow(self) -> Arc<TestUnitOfWork> {
        Arc::new(TestUnitOfWork {
            user_repo: Arc::new(self.users),
            hotel_repo: Arc::new(self.hotels),
            room_repo: Arc::new(self.rooms),
            booking_repo: Arc::new(self.bookings),
        })
    }
}

/// Unit of work over mocked repositories
pub struct TestUnitOfWork {
    user_repo: Arc<MockUserRepository>,
    hotel_repo: Arc<MockHotelRepository>,
    room_repo: Arc<MockRoomRepository>,
    booking_repo: Arc<MockBookingRepository>,
}

impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn hotels(&self) -> Arc<dyn HotelRepository> {
        self.hotel_repo.clone()
    }

    fn rooms(&self) -> Arc<dyn RoomRepository> {
        self.room_repo.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingRepository> {
        self.booking_repo.clone()
    }
}

/// Local account whose password is [`TEST_PASSWORD`]
pub fn sample_user(role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        username: "guest".to_string(),
        email: "guest@example.com".to_string(),
        password_hash: Some(TEST_PASSWORD_HASH.clone()),
        google_id: None,
        auth_provider: AuthProvider::Local,
        role,
        image: DEFAULT_PROFILE_IMAGE.to_string(),
        recent_searched_cities: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_hotel(owner_id: Uuid) -> Hotel {
    Hotel {
        id: Uuid::new_v4(),
        name: "Seaside Inn".to_string(),
        address: "1 Beach Road".to_string(),
        city: "Goa".to_string(),
        contact: "+91 98765 43210".to_string(),
        description: String::new(),
        owner_id,
        images: Vec::new(),
        rating: 4.0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_room(hotel_id: Uuid) -> Room {
    Room {
        id: Uuid::new_v4(),
        hotel_id,
        room_type: RoomType::DoubleBed,
        price_per_night: 2500.0,
        amenities: vec!["WiFi".to_string()],
        images: Vec::new(),
        is_available: true,
        max_guests: 2,
        description: String::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn sample_booking(user_id: Uuid, room: &Room, check_in: NaiveDate, nights: i64) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        user_id,
        room_id: room.id,
        hotel_id: room.hotel_id,
        check_in_date: check_in,
        check_out_date: check_in + chrono::Duration::days(nights),
        guests: 1,
        total_price: nights as f64 * room.price_per_night,
        status: BookingStatus::Pending,
        payment_method: PaymentMethod::PayAtHotel,
        is_paid: false,
        razorpay_order_id: None,
        razorpay_payment_id: None,
        razorpay_signature: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
