//! Admin handlers. Every route here sits behind `admin_middleware`.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    Booking, BookingStatus, BookingView, Hotel, HotelFilter, HotelView, Room, RoomView,
    UserFilter, UserResponse, UserRole,
};
use crate::errors::AppResult;
use crate::services::{AdminUserUpdate, Analytics, HotelOwnerSummary};
use crate::types::{ApiResponse, Created};

use super::auth_handler::USERNAME_PATTERN;
use super::hotel_handler::UpdateHotelRequest;
use super::room_handler::UpdateRoomRequest;

/// `all` or blank means no filter
fn filter_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "all")
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// `user`, `hotelOwner`, `admin` or `all`
    pub role: Option<String>,
    /// Case-insensitive match on username or email
    pub search: Option<String>,
}

impl TryFrom<UserListQuery> for UserFilter {
    type Error = crate::errors::AppError;

    fn try_from(query: UserListQuery) -> AppResult<Self> {
        Ok(UserFilter {
            role: filter_value(query.role)
                .map(|r| r.parse::<UserRole>())
                .transpose()?,
            search: filter_value(query.search),
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingListQuery {
    /// `pending`, `confirmed`, `cancelled`, `completed` or `all`
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"),
        regex(
            path = *USERNAME_PATTERN,
            message = "Username may only contain letters, numbers, dots, dashes and underscores"
        )
    )]
    pub username: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Defaults to `user`
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminUpdateUserRequest {
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
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSuperuserRequest {
    #[validate(
        length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"),
        regex(
            path = *USERNAME_PATTERN,
            message = "Username may only contain letters, numbers, dots, dashes and underscores"
        )
    )]
    pub username: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/hotel-owners", get(hotel_owners))
        .route("/hotels", get(list_hotels))
        .route("/hotels/:id", put(update_hotel).delete(delete_hotel))
        .route("/rooms", get(list_rooms))
        .route("/rooms/:id", put(update_room).delete(delete_room))
        .route("/bookings", get(list_bookings))
        .route("/bookings/:id", axum::routing::delete(delete_booking))
        .route("/bookings/:id/status", put(update_booking_status))
        .route("/analytics", get(analytics))
        .route("/superusers", get(list_superusers).post(create_superuser))
}

fn user_list(users: Vec<crate::domain::User>) -> ApiResponse<Vec<UserResponse>> {
    ApiResponse::list(users.into_iter().map(UserResponse::from).collect())
}

// =============================================================================
// Users
// =============================================================================

/// List users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    params(UserListQuery),
    responses((status = 200, description = "Users", body = Vec<UserResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = state.services.admin().list_users(query.try_into()?).await?;
    Ok(Json(user_list(users)))
}

/// Get a user
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state.services.admin().get_user(id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

/// Create a user with any role
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Admin",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 409, description = "Email or username already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state
        .services
        .admin()
        .create_user(
            payload.username,
            payload.email,
            payload.password,
            payload.role.unwrap_or(UserRole::User),
        )
        .await?;

    Ok(Created::with_message(user.into(), "User created successfully"))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email or username already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<AdminUpdateUserRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state
        .services
        .admin()
        .update_user(
            id,
            AdminUserUpdate {
                username: payload.username,
                email: payload.email,
                role: payload.role,
            },
        )
        .await?;

    Ok(Json(ApiResponse::with_message(
        user.into(),
        "User updated successfully",
    )))
}

/// Delete a user with their hotels and bookings
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "You cannot delete your own account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .services
        .admin()
        .delete_user(current_user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}

/// Hotel owners with their hotel counts
#[utoipa::path(
    get,
    path = "/api/admin/hotel-owners",
    tag = "Admin",
    responses((status = 200, description = "Hotel owners", body = Vec<HotelOwnerSummary>)),
    security(("bearer_auth" = []))
)]
pub async fn hotel_owners(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<HotelOwnerSummary>>>> {
    let owners = state.services.admin().hotel_owners().await?;
    Ok(Json(ApiResponse::list(owners)))
}

// =============================================================================
// Hotels and rooms
// =============================================================================

/// List every hotel
#[utoipa::path(
    get,
    path = "/api/admin/hotels",
    tag = "Admin",
    responses((status = 200, description = "Hotels", body = Vec<HotelView>)),
    security(("bearer_auth" = []))
)]
pub async fn list_hotels(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<HotelView>>>> {
    let hotels = state
        .services
        .hotels()
        .list_hotels(HotelFilter::default())
        .await?;
    Ok(Json(ApiResponse::list(hotels)))
}

/// Update any hotel
#[utoipa::path(
    put,
    path = "/api/admin/hotels/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Hotel ID")),
    request_body = UpdateHotelRequest,
    responses(
        (status = 200, description = "Hotel updated", body = Hotel),
        (status = 404, description = "Hotel not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_hotel(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateHotelRequest>,
) -> AppResult<Json<ApiResponse<Hotel>>> {
    let hotel = state
        .services
        .hotels()
        .update_hotel(current_user.actor(), id, payload.into())
        .await?;
    Ok(Json(ApiResponse::with_message(hotel, "Hotel updated successfully")))
}

/// Delete any hotel
#[utoipa::path(
    delete,
    path = "/api/admin/hotels/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Hotel deleted"),
        (status = 404, description = "Hotel not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_hotel(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .services
        .hotels()
        .delete_hotel(current_user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::message("Hotel deleted successfully")))
}

/// List every room
#[utoipa::path(
    get,
    path = "/api/admin/rooms",
    tag = "Admin",
    responses((status = 200, description = "Rooms", body = Vec<RoomView>)),
    security(("bearer_auth" = []))
)]
pub async fn list_rooms(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<RoomView>>>> {
    let rooms = state.services.rooms().list_rooms().await?;
    Ok(Json(ApiResponse::list(rooms)))
}

/// Update any room
#[utoipa::path(
    put,
    path = "/api/admin/rooms/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Room updated", body = Room),
        (status = 404, description = "Room not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_room(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateRoomRequest>,
) -> AppResult<Json<ApiResponse<Room>>> {
    let room = state
        .services
        .rooms()
        .update_room(current_user.actor(), id, payload.into())
        .await?;
    Ok(Json(ApiResponse::with_message(room, "Room updated successfully")))
}

/// Delete any room
#[utoipa::path(
    delete,
    path = "/api/admin/rooms/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room deleted"),
        (status = 404, description = "Room not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_room(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .services
        .rooms()
        .delete_room(current_user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::message("Room deleted successfully")))
}

// =============================================================================
// Bookings
// =============================================================================

/// List bookings, optionally by status
#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    tag = "Admin",
    params(BookingListQuery),
    responses(
        (status = 200, description = "Bookings", body = Vec<BookingView>),
        (status = 400, description = "Unknown status")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<Vec<BookingView>>>> {
    let status = filter_value(query.status)
        .map(|s| s.parse::<BookingStatus>())
        .transpose()?;
    let bookings = state.services.bookings().list_bookings(status).await?;
    Ok(Json(ApiResponse::list(bookings)))
}

/// Set a booking's status
#[utoipa::path(
    put,
    path = "/api/admin/bookings/{id}/status",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Booking),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_booking_status(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let booking = state
        .services
        .bookings()
        .set_status(id, payload.status)
        .await?;
    Ok(Json(ApiResponse::with_message(
        booking,
        "Booking status updated successfully",
    )))
}

/// Permanently delete a booking
#[utoipa::path(
    delete,
    path = "/api/admin/bookings/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking deleted"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.bookings().delete_booking(id).await?;
    Ok(Json(ApiResponse::message("Booking deleted successfully")))
}

// =============================================================================
// Analytics and superusers
// =============================================================================

/// Platform analytics
#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    tag = "Admin",
    responses((status = 200, description = "Dashboard figures", body = Analytics)),
    security(("bearer_auth" = []))
)]
pub async fn analytics(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Analytics>>> {
    let analytics = state.services.admin().analytics().await?;
    Ok(Json(ApiResponse::success(analytics)))
}

/// List admin accounts
#[utoipa::path(
    get,
    path = "/api/admin/superusers",
    tag = "Admin",
    responses((status = 200, description = "Admins", body = Vec<UserResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_superusers(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let admins = state.services.admin().list_superusers().await?;
    Ok(Json(user_list(admins)))
}

/// Create an admin account
#[utoipa::path(
    post,
    path = "/api/admin/superusers",
    tag = "Admin",
    request_body = CreateSuperuserRequest,
    responses(
        (status = 201, description = "Admin created", body = UserResponse),
        (status = 409, description = "Email or username already taken")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_superuser(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateSuperuserRequest>,
) -> AppResult<Created<UserResponse>> {
    let admin = state
        .services
        .admin()
        .create_superuser(payload.username, payload.email, payload.password)
        .await?;
    Ok(Created::with_message(
        admin.into(),
        "Superuser created successfully",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_means_no_filter() {
        let filter = UserFilter::try_from(UserListQuery {
            role: Some("all".into()),
            search: Some("".into()),
        })
        .unwrap();
        assert_eq!(filter, UserFilter::default());
    }

    #[test]
    fn test_role_filter_parses() {
        let filter = UserFilter::try_from(UserListQuery {
            role: Some("hotelOwner".into()),
            search: Some(" jane ".into()),
        })
        .unwrap();
        assert_eq!(filter.role, Some(UserRole::HotelOwner));
        assert_eq!(filter.search.as_deref(), Some("jane"));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = UserFilter::try_from(UserListQuery {
            role: Some("superhero".into()),
            search: None,
        });
        assert!(result.is_err());
    }
}
