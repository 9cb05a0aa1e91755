//! Authentication handlers.

use axum::{
    extract::{Query, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{UserResponse, UserRole};
use crate::errors::AppResult;
use crate::services::{AuthResponse, SignupInput};
use crate::types::{ApiResponse, Created};

pub(crate) static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("username pattern compiles"));

/// Account registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(
        length(
            min = 3,
            max = 30,
            message = "Username must be between 3 and 30 characters"
        ),
        regex(
            path = *USERNAME_PATTERN,
            message = "Username may only contain letters, numbers, dots, dashes and underscores"
        )
    )]
    #[schema(example = "johndoe")]
    pub username: String,
    #[validate(email(message = "Please provide a valid email"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "secret123", min_length = 6)]
    pub password: String,
    /// `user` (default) or `hotelOwner`
    pub role: Option<UserRole>,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "secret123")]
    pub password: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct GoogleCallbackQuery {
    /// Authorization code from Google
    pub code: Option<String>,
    /// Set by Google when the user denies consent
    pub error: Option<String>,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/google", get(google_redirect))
        .route("/google/callback", get(google_callback))
}

/// Routes under /auth that need a bearer token
pub fn auth_protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// 302 to an absolute URL
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Validation error or admin role requested"),
        (status = 409, description = "Email or username already taken")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> AppResult<Created<AuthResponse>> {
    let response = state
        .services
        .auth()
        .signup(SignupInput {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            role: payload.role,
        })
        .await?;

    Ok(Created::with_message(response, "User registered successfully"))
}

/// Login and get JWT token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let response = state
        .services
        .auth()
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(ApiResponse::with_message(response, "Login successful")))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state.services.auth().current_user(current_user.id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// Redirect to the Google consent screen
#[utoipa::path(
    get,
    path = "/api/auth/google",
    tag = "Authentication",
    responses(
        (status = 302, description = "Redirect to Google"),
        (status = 503, description = "Google sign-in not configured")
    )
)]
pub async fn google_redirect(State(state): State<AppState>) -> AppResult<Response> {
    let url = state.services.auth().google_authorization_url()?;
    Ok(found(&url))
}

/// Google OAuth callback; always redirects back to the frontend
#[utoipa::path(
    get,
    path = "/api/auth/google/callback",
    tag = "Authentication",
    params(GoogleCallbackQuery),
    responses(
        (status = 302, description = "Redirect to the frontend with a token or an error")
    )
)]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Response {
    let frontend = state.config.frontend_url.as_str();
    let failure = format!("{}/login?error=oauth_failed", frontend);

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        tracing::warn!(error = ?query.error, "Google callback without code");
        return found(&failure);
    };

    match state.services.auth().google_login(code).await {
        Ok(token) => found(&format!("{}/auth/callback?token={}", frontend, token)),
        Err(e) => {
            tracing::error!(error = %e, "Google sign-in failed");
            found(&failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let valid = SignupRequest {
            username: "jane_doe".into(),
            email: "jane@example.com".into(),
            password: "secret1".into(),
            role: Some(UserRole::HotelOwner),
        };
        assert!(valid.validate().is_ok());

        let short_name = SignupRequest {
            username: "jd".into(),
            ..valid_request()
        };
        assert!(short_name.validate().is_err());

        let bad_chars = SignupRequest {
            username: "jane doe!".into(),
            ..valid_request()
        };
        assert!(bad_chars.validate().is_err());

        let short_password = SignupRequest {
            password: "12345".into(),
            ..valid_request()
        };
        assert!(short_password.validate().is_err());
    }

    fn valid_request() -> SignupRequest {
        SignupRequest {
            username: "guest".into(),
            email: "guest@example.com".into(),
            password: "secret123".into(),
            role: None,
        }
    }

    #[test]
    fn test_found_sets_location() {
        let response = found("http://localhost:5173/login?error=oauth_failed");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            "http://localhost:5173/login?error=oauth_failed"
        );
    }
}
