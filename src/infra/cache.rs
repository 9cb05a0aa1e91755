//! Redis cache implementation.
//!
//! Backs the fixed-window request limiter and the health check.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};

use crate::config::{Config, CACHE_PREFIX_RATE_LIMIT};
use crate::errors::{AppError, AppResult};

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Requests counted in the current window, including this one
    pub count: u64,
    pub allowed: bool,
    /// Seconds until the window resets
    pub reset_in: u64,
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let client = Client::open(config.redis_url.as_str()).map_err(cache_error)?;
        let connection = ConnectionManager::new(client).await.map_err(cache_error)?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }

    /// Round-trip a PING to Redis.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    // =========================================================================
    // Rate Limiting
    // =========================================================================

    /// Count a request against a fixed window.
    ///
    /// The first request of a window creates the counter and arms its expiry.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<RateLimitStatus> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let count: i64 = conn.incr(&key, 1).await.map_err(cache_error)?;
        if count == 1 {
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(cache_error)?;
        }

        let ttl: i64 = conn.ttl(&key).await.map_err(cache_error)?;
        // A counter that lost its expiry would otherwise block forever
        let reset_in = if ttl < 0 {
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(cache_error)?;
            window_seconds
        } else {
            ttl as u64
        };

        let count = count.max(0) as u64;
        Ok(RateLimitStatus {
            count,
            allowed: count <= max_requests,
            reset_in,
        })
    }
}

fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_key_prefix() {
        assert_eq!(CACHE_PREFIX_RATE_LIMIT, "rate_limit:");
    }
}
