//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod booking_repository;
pub(crate) mod entities;
mod hotel_repository;
mod query;
mod room_repository;
mod user_repository;

pub use booking_repository::{BookingRepository, BookingStore, ALREADY_BOOKED};
pub use hotel_repository::{HotelRepository, HotelStore};
pub use room_repository::{RoomRepository, RoomStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use booking_repository::MockBookingRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use hotel_repository::MockHotelRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use room_repository::MockRoomRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
