//! Hotel Booking API - REST backend for a hotel booking marketplace.
//!
//! Guests search and book rooms, hotel owners manage their properties,
//! rooms and incoming bookings, and administrators oversee the platform.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and rules
//! - **services**: Application use cases
//! - **infra**: Database, Redis and external gateway clients
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Apply migrations, then load the demo catalog
//! cargo run -- migrate up
//! cargo run -- seed
//!
//! # Bootstrap an administrator
//! cargo run -- create-superuser --email admin@example.com --password secret123
//!
//! # Serve on another port
//! cargo run -- serve --port 8080
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Booking, Hotel, Password, Room, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
