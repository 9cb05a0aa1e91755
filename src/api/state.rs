//! Shared application state.

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, Database};
use crate::services::{ServiceContainer, Services};

/// Handed to every handler and middleware through axum `State`.
#[derive(Clone)]
pub struct AppState {
    /// Auth, users, hotels, rooms, bookings, payment and admin services
    pub services: Arc<dyn ServiceContainer>,
    pub config: Arc<Config>,
    /// Redis, for rate limiting and the health report
    pub cache: Arc<Cache>,
    /// Kept for the health report; services hold their own connection clones
    pub database: Arc<Database>,
}

impl AppState {
    /// Wire the production services onto an open database and Redis.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        config: Config,
    ) -> AppResult<Self> {
        let services = Services::from_connection(database.get_connection(), config.clone())?;

        Ok(Self {
            services: Arc::new(services),
            config: Arc::new(config),
            cache,
            database,
        })
    }
}
