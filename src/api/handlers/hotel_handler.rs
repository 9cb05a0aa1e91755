//! Hotel handlers.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::domain::{Hotel, HotelChanges, HotelFilter, HotelView, NewHotel, UserRole};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HotelListQuery {
    /// Exact city
    pub city: Option<String>,
    /// Case-insensitive match on name or address
    pub search: Option<String>,
}

impl From<HotelListQuery> for HotelFilter {
    fn from(query: HotelListQuery) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        HotelFilter {
            city: non_blank(query.city),
            search: non_blank(query.search),
            owner_id: None,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateHotelRequest {
    #[validate(length(min = 1, message = "Hotel name is required"))]
    #[schema(example = "Sea Breeze Resort")]
    pub name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    #[schema(example = "Goa")]
    pub city: String,
    #[validate(length(min = 1, message = "Contact is required"))]
    pub contact: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateHotelRequest {
    #[validate(length(min = 1, message = "Hotel name cannot be empty"))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
    pub description: Option<String>,
    /// Replaces the image list when present
    pub images: Option<Vec<String>>,
    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5"))]
    pub rating: Option<f64>,
}

impl From<UpdateHotelRequest> for HotelChanges {
    fn from(req: UpdateHotelRequest) -> Self {
        HotelChanges {
            name: req.name,
            address: req.address,
            city: req.city,
            contact: req.contact,
            description: req.description,
            images: req.images,
            rating: req.rating,
        }
    }
}

/// Public hotel routes
pub fn hotel_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_hotels))
        .route("/:id", get(get_hotel))
}

/// Hotel routes for owners and admins (behind auth)
pub fn hotel_owner_routes() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create_hotel))
        .route("/:id", axum::routing::put(update_hotel).delete(delete_hotel))
        .route("/owner/my-hotels", get(my_hotels))
}

/// List hotels
#[utoipa::path(
    get,
    path = "/api/hotels",
    tag = "Hotels",
    params(HotelListQuery),
    responses((status = 200, description = "Hotels with owner populated", body = Vec<HotelView>))
)]
pub async fn list_hotels(
    State(state): State<AppState>,
    Query(query): Query<HotelListQuery>,
) -> AppResult<Json<ApiResponse<Vec<HotelView>>>> {
    let hotels = state.services.hotels().list_hotels(query.into()).await?;
    Ok(Json(ApiResponse::list(hotels)))
}

/// Get a hotel
#[utoipa::path(
    get,
    path = "/api/hotels/{id}",
    tag = "Hotels",
    params(("id" = Uuid, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Hotel", body = HotelView),
        (status = 404, description = "Hotel not found")
    )
)]
pub async fn get_hotel(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<HotelView>>> {
    let hotel = state.services.hotels().get_hotel(id).await?;
    Ok(Json(ApiResponse::success(hotel)))
}

/// Create a hotel owned by the caller
#[utoipa::path(
    post,
    path = "/api/hotels",
    tag = "Hotels",
    request_body = CreateHotelRequest,
    responses(
        (status = 201, description = "Hotel created", body = Hotel),
        (status = 403, description = "Hotel owner role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_hotel(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateHotelRequest>,
) -> AppResult<Created<Hotel>> {
    require_role(&current_user, UserRole::HotelOwner)?;

    let hotel = state
        .services
        .hotels()
        .create_hotel(
            current_user.actor(),
            NewHotel {
                name: payload.name,
                address: payload.address,
                city: payload.city,
                contact: payload.contact,
                description: payload.description,
                owner_id: current_user.id,
                images: payload.images,
            },
        )
        .await?;

    Ok(Created::with_message(hotel, "Hotel created successfully"))
}

/// Update a hotel
#[utoipa::path(
    put,
    path = "/api/hotels/{id}",
    tag = "Hotels",
    params(("id" = Uuid, Path, description = "Hotel ID")),
    request_body = UpdateHotelRequest,
    responses(
        (status = 200, description = "Hotel updated", body = Hotel),
        (status = 403, description = "Not the owner"),
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
    require_role(&current_user, UserRole::HotelOwner)?;

    let hotel = state
        .services
        .hotels()
        .update_hotel(current_user.actor(), id, payload.into())
        .await?;

    Ok(Json(ApiResponse::with_message(hotel, "Hotel updated successfully")))
}

/// Delete a hotel with its rooms and bookings
#[utoipa::path(
    delete,
    path = "/api/hotels/{id}",
    tag = "Hotels",
    params(("id" = Uuid, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Hotel deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Hotel not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_hotel(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<()>>> {
    require_role(&current_user, UserRole::HotelOwner)?;

    state
        .services
        .hotels()
        .delete_hotel(current_user.actor(), id)
        .await?;

    Ok(Json(ApiResponse::message("Hotel deleted successfully")))
}

/// Hotels owned by the caller
#[utoipa::path(
    get,
    path = "/api/hotels/owner/my-hotels",
    tag = "Hotels",
    responses(
        (status = 200, description = "Caller's hotels", body = Vec<HotelView>),
        (status = 403, description = "Hotel owner role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_hotels(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<HotelView>>>> {
    require_role(&current_user, UserRole::HotelOwner)?;

    let hotels = state.services.hotels().my_hotels(current_user.actor()).await?;
    Ok(Json(ApiResponse::list(hotels)))
}
