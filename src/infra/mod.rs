//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Redis (rate limiting)
//! - Outbound HTTP clients for the payment gateway and Google sign-in

pub mod cache;
pub mod db;
pub mod google_oauth;
pub mod payment_gateway;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, RateLimitStatus};
pub use db::{Database, MigrationState, Migrator};
pub use google_oauth::{GoogleOAuthClient, GoogleProfile, IdentityProvider};
pub use payment_gateway::{GatewayOrder, OrderRequest, PaymentGateway, RazorpayClient};
pub use repositories::{
    BookingRepository, BookingStore, HotelRepository, HotelStore, RoomRepository, RoomStore,
    UserRepository, UserStore, ALREADY_BOOKED,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use google_oauth::MockIdentityProvider;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_gateway::MockPaymentGateway;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockBookingRepository, MockHotelRepository, MockRoomRepository, MockUserRepository,
};
