//! Domain layer - Core business entities and logic
//!
//! Entities, value objects and the pure booking rules. Nothing in here
//! touches the database or HTTP.

pub mod booking;
pub mod hotel;
pub mod password;
pub mod room;
pub mod user;

pub use booking::{
    Booking, BookingChanges, BookingFilter, BookingStatus, BookingView, MonthlyRevenue,
    NewBooking, PaymentMethod,
};
pub use hotel::{Hotel, HotelChanges, HotelFilter, HotelView, NewHotel};
pub use password::Password;
pub use room::{
    NewRoom, Room, RoomChanges, RoomSearch, RoomSearchQuery, RoomSort, RoomType, RoomView,
    SortOrder,
};
pub use user::{
    Actor, AuthProvider, NewUser, User, UserChanges, UserFilter, UserResponse, UserRole,
    UserSummary,
};
