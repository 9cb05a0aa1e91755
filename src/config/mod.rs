//! Runtime settings and fixed limits.
//!
//! `settings` reads the environment (after `.env`); `constants` holds the
//! defaults and business limits shared across layers.

mod constants;
mod settings;

pub use constants::*;
pub use settings::{Config, GoogleOAuthConfig, RazorpayConfig};
