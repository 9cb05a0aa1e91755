//! Application route configuration.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    admin_routes, auth_protected_routes, auth_routes, booking_routes, hotel_owner_routes,
    hotel_routes, payment_routes, room_owner_routes, room_routes, user_routes,
};
use super::middleware::{
    admin_middleware, auth_middleware, rate_limit_auth_middleware, rate_limit_middleware,
};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Anonymous routes; sign-in endpoints get the stricter limit
    let public = Router::new()
        .nest(
            "/auth",
            auth_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_auth_middleware,
            )),
        )
        .nest("/hotels", hotel_routes())
        .nest("/rooms", room_routes());

    // Bearer token required; admin routes additionally check the role
    let protected = Router::new()
        .nest("/auth", auth_protected_routes())
        .nest("/users", user_routes())
        .nest("/hotels", hotel_owner_routes())
        .nest("/rooms", room_owner_routes())
        .nest("/bookings", booking_routes())
        .nest("/payment", payment_routes())
        .nest(
            "/admin",
            admin_routes().route_layer(middleware::from_fn(admin_middleware)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = public
        .merge(protected)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        // Health is never rate limited
        .route("/health", get(health));

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins; any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Route not found" })),
    )
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    timestamp: DateTime<Utc>,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_check<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                status: "connected",
                error: None,
            },
            Err(e) => Self {
                status: "disconnected",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_up(&self) -> bool {
        self.error.is_none()
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (db, redis) = tokio::join!(state.database.ping(), state.cache.ping());
    let database = ServiceStatus::from_check(db);
    let redis = ServiceStatus::from_check(redis);

    let all_healthy = database.is_up() && redis.is_up();

    let (status_code, status, message) = if all_healthy {
        (StatusCode::OK, "OK", "Hotel booking API is running")
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "DEGRADED",
            "One or more backing services are unavailable",
        )
    };

    let response = HealthResponse {
        status,
        message,
        timestamp: Utc::now(),
        services: ServiceHealth { database, redis },
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status() {
        let up = ServiceStatus::from_check::<String>(Ok(()));
        assert!(up.is_up());
        assert_eq!(up.status, "connected");

        let down = ServiceStatus::from_check(Err("connection refused"));
        assert!(!down.is_up());
        assert_eq!(down.error.as_deref(), Some("connection refused"));
    }
}
