//! User profile handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::services::ProfileUpdate;
use crate::types::ApiResponse;

use super::auth_handler::USERNAME_PATTERN;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"),
        regex(
            path = *USERNAME_PATTERN,
            message = "Username may only contain letters, numbers, dots, dashes and underscores"
        )
    )]
    pub username: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    pub image: Option<String>,
    /// Most recent first; trimmed, de-duplicated and capped server side
    pub recent_searched_cities: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}

/// Create user routes (all require a bearer token)
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/password", put(update_password))
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "Users",
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state.services.users().get_user(current_user.id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// Update the caller's profile
#[utoipa::path(
    put,
    path = "/api/users/profile",
    tag = "Users",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email or username already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .services
        .users()
        .update_profile(
            current_user.id,
            ProfileUpdate {
                username: payload.username,
                email: payload.email,
                image: payload.image,
                recent_searched_cities: payload.recent_searched_cities,
            },
        )
        .await?;

    Ok(Json(ApiResponse::with_message(
        user.into(),
        "Profile updated successfully",
    )))
}

/// Change the caller's password
#[utoipa::path(
    put,
    path = "/api/users/password",
    tag = "Users",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Invalid current password or account without password")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdatePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .services
        .users()
        .change_password(current_user.id, payload.current_password, payload.new_password)
        .await?;

    Ok(Json(ApiResponse::message("Password updated successfully")))
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    require_admin(&current_user)?;

    let users = state.services.users().list_users().await?;
    let response: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::list(response)))
}
