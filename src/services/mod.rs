//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain rules and repositories to fulfill the
//! application use cases. Each one is a trait with a generic implementation
//! over `UnitOfWork`, so handlers and tests depend on abstractions only.

mod admin_service;
mod auth_service;
mod booking_service;
pub mod container;
mod hotel_service;
mod payment_service;
mod room_service;
mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use admin_service::{
    AdminManager, AdminService, AdminUserUpdate, Analytics, BookingCounts, HotelOwnerSummary,
    Overview,
};
pub use auth_service::{
    generate_token, AuthResponse, AuthService, Authenticator, Claims, SignupInput,
};
pub use booking_service::{BookingManager, BookingService, BookingUpdate, CreateBookingInput};
pub use hotel_service::{HotelManager, HotelService};
pub use payment_service::{
    sign_payment, to_minor_units, verify_payment_signature, CreatedOrder, PaymentConfirmation,
    PaymentProcessor, PaymentService, VerifiedPayment,
};
pub use room_service::{RoomManager, RoomService};
pub use user_service::{ProfileUpdate, UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
