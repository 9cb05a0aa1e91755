//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories behind one injectable handle.
//! Multi-statement atomicity lives inside the repository that needs it
//! (booking placement), so services stay mockable.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    BookingRepository, BookingStore, HotelRepository, HotelStore, RoomRepository, RoomStore,
    UserRepository, UserStore,
};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get hotel repository
    fn hotels(&self) -> Arc<dyn HotelRepository>;

    /// Get room repository
    fn rooms(&self) -> Arc<dyn RoomRepository>;

    /// Get booking repository
    fn bookings(&self) -> Arc<dyn BookingRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
    hotel_repo: Arc<HotelStore>,
    room_repo: Arc<RoomStore>,
    booking_repo: Arc<BookingStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            hotel_repo: Arc::new(HotelStore::new(db.clone())),
            room_repo: Arc::new(RoomStore::new(db.clone())),
            booking_repo: Arc::new(BookingStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
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
