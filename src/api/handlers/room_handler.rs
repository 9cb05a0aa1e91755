//! Room handlers.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::config::DEFAULT_MAX_GUESTS;
use crate::domain::{
    NewRoom, Room, RoomChanges, RoomSearch, RoomSearchQuery, RoomType, RoomView, UserRole,
};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created};

fn default_max_guests() -> i32 {
    DEFAULT_MAX_GUESTS
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Hotel the room belongs to
    pub hotel: Uuid,
    pub room_type: RoomType,
    #[validate(range(min = 0.0, message = "Price per night must be a non-negative number"))]
    #[schema(example = 2500.0)]
    pub price_per_night: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_max_guests")]
    #[validate(range(min = 1, message = "Max guests must be at least 1"))]
    pub max_guests: i32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    pub room_type: Option<RoomType>,
    #[validate(range(min = 0.0, message = "Price per night must be a non-negative number"))]
    pub price_per_night: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub is_available: Option<bool>,
    #[validate(range(min = 1, message = "Max guests must be at least 1"))]
    pub max_guests: Option<i32>,
    pub description: Option<String>,
}

impl From<UpdateRoomRequest> for RoomChanges {
    fn from(req: UpdateRoomRequest) -> Self {
        RoomChanges {
            room_type: req.room_type,
            price_per_night: req.price_per_night,
            amenities: req.amenities,
            images: req.images,
            is_available: req.is_available,
            max_guests: req.max_guests,
            description: req.description,
        }
    }
}

/// Public room routes
pub fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search_rooms))
        .route("/:id", get(get_room))
        .route("/hotel/:hotel_id", get(rooms_by_hotel))
}

/// Room management routes (behind auth)
pub fn room_owner_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_room))
        .route("/:id", put(update_room).delete(delete_room))
}

/// Search rooms
#[utoipa::path(
    get,
    path = "/api/rooms",
    tag = "Rooms",
    params(RoomSearchQuery),
    responses(
        (status = 200, description = "One page of matching rooms", body = Vec<RoomView>),
        (status = 400, description = "Malformed query parameter")
    )
)]
pub async fn search_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomSearchQuery>,
) -> AppResult<Json<ApiResponse<Vec<RoomView>>>> {
    let search = RoomSearch::try_from(query)?;
    let page = state.services.rooms().search_rooms(search).await?;
    Ok(Json(ApiResponse::page(page)))
}

/// Get a room
#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    tag = "Rooms",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room with hotel populated", body = RoomView),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<RoomView>>> {
    let room = state.services.rooms().get_room(id).await?;
    Ok(Json(ApiResponse::success(room)))
}

/// All rooms of a hotel
#[utoipa::path(
    get,
    path = "/api/rooms/hotel/{hotel_id}",
    tag = "Rooms",
    params(("hotel_id" = Uuid, Path, description = "Hotel ID")),
    responses((status = 200, description = "Rooms of the hotel", body = Vec<RoomView>))
)]
pub async fn rooms_by_hotel(
    State(state): State<AppState>,
    IdPath(hotel_id): IdPath,
) -> AppResult<Json<ApiResponse<Vec<RoomView>>>> {
    let rooms = state.services.rooms().rooms_by_hotel(hotel_id).await?;
    Ok(Json(ApiResponse::list(rooms)))
}

/// Add a room to a hotel
#[utoipa::path(
    post,
    path = "/api/rooms",
    tag = "Rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomView),
        (status = 403, description = "Not the hotel owner"),
        (status = 404, description = "Hotel not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_room(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateRoomRequest>,
) -> AppResult<Created<RoomView>> {
    require_role(&current_user, UserRole::HotelOwner)?;

    let room = state
        .services
        .rooms()
        .create_room(
            current_user.actor(),
            NewRoom {
                hotel_id: payload.hotel,
                room_type: payload.room_type,
                price_per_night: payload.price_per_night,
                amenities: payload.amenities,
                images: payload.images,
                max_guests: payload.max_guests,
                description: payload.description,
            },
        )
        .await?;

    Ok(Created::with_message(room, "Room created successfully"))
}

/// Update a room
#[utoipa::path(
    put,
    path = "/api/rooms/{id}",
    tag = "Rooms",
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Room updated", body = Room),
        (status = 403, description = "Not the hotel owner"),
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
    require_role(&current_user, UserRole::HotelOwner)?;

    let room = state
        .services
        .rooms()
        .update_room(current_user.actor(), id, payload.into())
        .await?;

    Ok(Json(ApiResponse::with_message(room, "Room updated successfully")))
}

/// Delete a room and its bookings
#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    tag = "Rooms",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room deleted"),
        (status = 403, description = "Not the hotel owner"),
        (status = 404, description = "Room not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_room(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<()>>> {
    require_role(&current_user, UserRole::HotelOwner)?;

    state
        .services
        .rooms()
        .delete_room(current_user.actor(), id)
        .await?;

    Ok(Json(ApiResponse::message("Room deleted successfully")))
}
