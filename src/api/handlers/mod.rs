//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod booking_handler;
pub mod hotel_handler;
pub mod payment_handler;
pub mod room_handler;
pub mod user_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::{auth_protected_routes, auth_routes};
pub use booking_handler::booking_routes;
pub use hotel_handler::{hotel_owner_routes, hotel_routes};
pub use payment_handler::payment_routes;
pub use room_handler::{room_owner_routes, room_routes};
pub use user_handler::user_routes;
