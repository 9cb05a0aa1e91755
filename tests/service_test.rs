//! Service tests over mocked repositories.
//!
//! Run with `cargo test --features test-utils`.

#![cfg(feature = "test-utils")]

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, Utc};
use mockall::predicate::eq;
use uuid::Uuid;

use hotel_booking_api::domain::{
    Actor, AuthProvider, Booking, BookingStatus, BookingView, Password, PaymentMethod, Room, RoomType, User,
    UserRole,
};
use hotel_booking_api::errors::AppError;
use hotel_booking_api::infra::{
    BookingRepository, HotelRepository, MockBookingRepository, MockHotelRepository,
    MockRoomRepository, MockUserRepository, RoomRepository, UnitOfWork, UserRepository,
};
use hotel_booking_api::services::{
    sign_payment, AuthService, Authenticator, BookingManager, BookingService, CreateBookingInput,
    PaymentConfirmation, SignupInput, UserManager, UserService,
};
use hotel_booking_api::Config;

const JWT_SECRET: &str = "test-secret-key-for-testing-only-32chars";
const RAZORPAY_SECRET: &str = "rzp_test_secret";

fn create_test_user(id: Uuid, password: Option<&str>) -> User {
    User {
        id,
        username: "traveller".to_string(),
        email: "traveller@example.com".to_string(),
        password_hash: password.map(|p| Password::new(p).unwrap().into_string()),
        google_id: None,
        auth_provider: AuthProvider::Local,
        role: UserRole::User,
        image: String::new(),
        recent_searched_cities: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_test_room(hotel_id: Uuid) -> Room {
    Room {
        id: Uuid::new_v4(),
        hotel_id,
        room_type: RoomType::DoubleBed,
        price_per_night: 2000.0,
        amenities: vec!["WiFi".to_string()],
        images: Vec::new(),
        is_available: true,
        max_guests: 2,
        description: String::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Test mock for UnitOfWork that wraps one mock per repository
#[derive(Default)]
struct TestUnitOfWork {
    users: MockUserRepository,
    hotels: MockHotelRepository,
    rooms: MockRoomRepository,
    bookings: MockBookingRepository,
}

struct SharedUnitOfWork {
    users: Arc<MockUserRepository>,
    hotels: Arc<MockHotelRepository>,
    rooms: Arc<MockRoomRepository>,
    bookings: Arc<MockBookingRepository>,
}

impl TestUnitOfWork {
    fn build(self) -> Arc<SharedUnitOfWork> {
        Arc::new(SharedUnitOfWork {
            users: Arc::new(self.users),
            hotels: Arc::new(self.hotels),
            rooms: Arc::new(self.rooms),
            bookings: Arc::new(self.bookings),
        })
    }
}

impl UnitOfWork for SharedUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn hotels(&self) -> Arc<dyn HotelRepository> {
        self.hotels.clone()
    }

    fn rooms(&self) -> Arc<dyn RoomRepository> {
        self.rooms.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingRepository> {
        self.bookings.clone()
    }
}

fn stay(days_ahead: i64, nights: i64) -> (NaiveDate, NaiveDate) {
    let check_in = Utc::now().date_naive() + Duration::days(days_ahead);
    (check_in, check_in + Duration::days(nights))
}

fn booking_input(room_id: Uuid, method: PaymentMethod) -> CreateBookingInput {
    let (check_in_date, check_out_date) = stay(7, 3);
    CreateBookingInput {
        room_id,
        hotel_id: None,
        check_in_date,
        check_out_date,
        guests: 2,
        payment_method: method,
        payment: PaymentConfirmation::default(),
    }
}

fn echo_booking(new_booking: hotel_booking_api::domain::NewBooking) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        user_id: new_booking.user_id,
        room_id: new_booking.room_id,
        hotel_id: new_booking.hotel_id,
        check_in_date: new_booking.check_in_date,
        check_out_date: new_booking.check_out_date,
        guests: new_booking.guests,
        total_price: new_booking.total_price,
        status: new_booking.status,
        payment_method: new_booking.payment_method,
        is_paid: new_booking.is_paid,
        razorpay_order_id: new_booking.razorpay_order_id,
        razorpay_payment_id: new_booking.razorpay_payment_id,
        razorpay_signature: new_booking.razorpay_signature,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Inserted bookings are echoed back and then served by `find_view`
fn echo_bookings(bookings: &mut MockBookingRepository) {
    let stored: Arc<Mutex<Option<Booking>>> = Arc::default();
    let created = stored.clone();
    bookings.expect_create().times(1).returning(move |new_booking| {
        let booking = echo_booking(new_booking);
        *created.lock().unwrap() = Some(booking.clone());
        Ok(booking)
    });
    bookings.expect_find_view().returning(move |_| {
        Ok(stored.lock().unwrap().clone().map(|booking| BookingView {
            booking,
            room: None,
            hotel: None,
            user: None,
        }))
    });
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_signup_returns_token_for_new_account() {
    let mut uow = TestUnitOfWork::default();
    uow.users
        .expect_find_by_email_or_username()
        .with(eq("new@example.com"), eq("newbie"))
        .returning(|_, _| Ok(None));
    uow.users.expect_create().returning(|new_user| {
        assert_eq!(new_user.role, UserRole::HotelOwner);
        let mut user = create_test_user(Uuid::new_v4(), None);
        user.username = new_user.username;
        user.email = new_user.email;
        user.role = new_user.role;
        user.password_hash = new_user.password_hash;
        Ok(user)
    });

    let auth = Authenticator::new(uow.build(), Config::for_tests(JWT_SECRET), None);
    let response = auth
        .signup(SignupInput {
            username: " newbie ".to_string(),
            email: "New@Example.com".to_string(),
            password: "secret123".to_string(),
            role: Some(UserRole::HotelOwner),
        })
        .await
        .unwrap();

    assert_eq!(response.email, "new@example.com");
    let claims = auth.verify_token(&response.token).unwrap();
    assert_eq!(claims.sub, response.id);
    assert_eq!(claims.role, "hotelOwner");
}

#[tokio::test]
async fn test_signup_rejects_admin_role() {
    let mut uow = TestUnitOfWork::default();
    uow.users.expect_create().never();

    let auth = Authenticator::new(uow.build(), Config::for_tests(JWT_SECRET), None);
    let result = auth
        .signup(SignupInput {
            username: "sneaky".to_string(),
            email: "sneaky@example.com".to_string(),
            password: "secret123".to_string(),
            role: Some(UserRole::Admin),
        })
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_signup_duplicate_conflicts() {
    let mut uow = TestUnitOfWork::default();
    uow.users
        .expect_find_by_email_or_username()
        .returning(|_, _| Ok(Some(create_test_user(Uuid::new_v4(), None))));
    uow.users.expect_create().never();

    let auth = Authenticator::new(uow.build(), Config::for_tests(JWT_SECRET), None);
    let result = auth
        .signup(SignupInput {
            username: "traveller".to_string(),
            email: "traveller@example.com".to_string(),
            password: "secret123".to_string(),
            role: None,
        })
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_login_success_and_wrong_password() {
    let mut uow = TestUnitOfWork::default();
    uow.users
        .expect_find_by_email()
        .with(eq("traveller@example.com"))
        .returning(|_| Ok(Some(create_test_user(Uuid::new_v4(), Some("secret123")))));

    let auth = Authenticator::new(uow.build(), Config::for_tests(JWT_SECRET), None);

    let ok = auth
        .login("Traveller@Example.com".to_string(), "secret123".to_string())
        .await
        .unwrap();
    assert!(!ok.token.is_empty());

    let wrong = auth
        .login("traveller@example.com".to_string(), "secret124".to_string())
        .await;
    assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_google_sign_in_without_provider() {
    let auth = Authenticator::new(
        TestUnitOfWork::default().build(),
        Config::for_tests(JWT_SECRET),
        None,
    );

    assert!(matches!(
        auth.google_authorization_url(),
        Err(AppError::NotConfigured(_))
    ));
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_get_user_not_found() {
    let mut uow = TestUnitOfWork::default();
    uow.users.expect_find_by_id().returning(|_| Ok(None));

    let service = UserManager::new(uow.build());
    let result = service.get_user(Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::NotFound("User"))));
}

#[tokio::test]
async fn test_change_password_checks_current_password() {
    let user_id = Uuid::new_v4();
    let mut uow = TestUnitOfWork::default();
    uow.users
        .expect_find_by_id()
        .with(eq(user_id))
        .returning(|id| Ok(Some(create_test_user(id, Some("secret123")))));
    uow.users
        .expect_update()
        .times(1)
        .returning(|id, changes| {
            let hash = changes.password_hash.expect("new hash");
            assert!(Password::from_hash(hash).verify("brandnew1"));
            Ok(create_test_user(id, None))
        });

    let service = UserManager::new(uow.build());

    let wrong = service
        .change_password(user_id, "nope".to_string(), "brandnew1".to_string())
        .await;
    assert!(matches!(wrong, Err(AppError::BadRequest(_))));

    service
        .change_password(user_id, "secret123".to_string(), "brandnew1".to_string())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_change_password_for_google_account() {
    let mut uow = TestUnitOfWork::default();
    uow.users
        .expect_find_by_id()
        .returning(|id| Ok(Some(create_test_user(id, None))));
    uow.users.expect_update().never();

    let service = UserManager::new(uow.build());
    let result = service
        .change_password(Uuid::new_v4(), "x".to_string(), "brandnew1".to_string())
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

// =============================================================================
// Bookings
// =============================================================================

#[tokio::test]
async fn test_pay_at_hotel_booking_is_priced_and_pending() {
    let room = create_test_room(Uuid::new_v4());
    let room_id = room.id;
    let guest = Actor::new(Uuid::new_v4(), UserRole::User);

    let mut uow = TestUnitOfWork::default();
    uow.rooms
        .expect_find_by_id()
        .with(eq(room_id))
        .returning(move |_| Ok(Some(room.clone())));
    echo_bookings(&mut uow.bookings);

    let service = BookingManager::new(uow.build(), None);
    let booking = service
        .create_booking(guest, booking_input(room_id, PaymentMethod::PayAtHotel))
        .await
        .unwrap()
        .booking;

    assert_eq!(booking.user_id, guest.id);
    assert_eq!(booking.total_price, 6000.0);
    assert_eq!(booking.status, BookingStatus::Pending);
    assert!(!booking.is_paid);
}

#[tokio::test]
async fn test_razorpay_booking_needs_valid_signature() {
    let room = create_test_room(Uuid::new_v4());
    let room_id = room.id;
    let guest = Actor::new(Uuid::new_v4(), UserRole::User);

    let mut uow = TestUnitOfWork::default();
    uow.rooms
        .expect_find_by_id()
        .returning(move |_| Ok(Some(room.clone())));
    echo_bookings(&mut uow.bookings);

    let service = BookingManager::new(uow.build(), Some(RAZORPAY_SECRET.to_string()));

    let mut forged = booking_input(room_id, PaymentMethod::Razorpay);
    forged.payment = PaymentConfirmation {
        order_id: Some("order_1".into()),
        payment_id: Some("pay_1".into()),
        signature: Some("deadbeef".into()),
    };
    let rejected = service.create_booking(guest, forged).await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));

    let mut paid = booking_input(room_id, PaymentMethod::Razorpay);
    paid.payment = PaymentConfirmation {
        order_id: Some("order_1".into()),
        payment_id: Some("pay_1".into()),
        signature: Some(sign_payment(RAZORPAY_SECRET, "order_1", "pay_1").unwrap()),
    };
    let booking = service.create_booking(guest, paid).await.unwrap().booking;

    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert!(booking.is_paid);
    assert_eq!(booking.razorpay_payment_id.as_deref(), Some("pay_1"));
}

#[tokio::test]
async fn test_booking_rejects_too_many_guests_and_unavailable_room() {
    let mut full = create_test_room(Uuid::new_v4());
    full.is_available = false;
    let full_id = full.id;
    let small = create_test_room(Uuid::new_v4());
    let small_id = small.id;
    let guest = Actor::new(Uuid::new_v4(), UserRole::User);

    let mut uow = TestUnitOfWork::default();
    uow.rooms.expect_find_by_id().returning(move |id| {
        Ok(Some(if id == full_id {
            full.clone()
        } else {
            small.clone()
        }))
    });
    uow.bookings.expect_create().never();

    let service = BookingManager::new(uow.build(), None);

    let unavailable = service
        .create_booking(guest, booking_input(full_id, PaymentMethod::PayAtHotel))
        .await;
    assert!(matches!(unavailable, Err(AppError::BadRequest(_))));

    let mut crowd = booking_input(small_id, PaymentMethod::PayAtHotel);
    crowd.guests = 5;
    let too_many = service.create_booking(guest, crowd).await;
    assert!(matches!(too_many, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_booking_rejects_mismatched_hotel() {
    let room = create_test_room(Uuid::new_v4());
    let room_id = room.id;

    let mut uow = TestUnitOfWork::default();
    uow.rooms
        .expect_find_by_id()
        .returning(move |_| Ok(Some(room.clone())));
    uow.bookings.expect_create().never();

    let service = BookingManager::new(uow.build(), None);
    let mut input = booking_input(room_id, PaymentMethod::PayAtHotel);
    input.hotel_id = Some(Uuid::new_v4());

    let result = service
        .create_booking(Actor::new(Uuid::new_v4(), UserRole::User), input)
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}
