//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `create-superuser` - Bootstrap an administrator
//! - `seed` - Demo data

pub mod args;

pub use args::{Cli, Commands};
