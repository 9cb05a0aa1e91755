//! Booking handlers.

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Booking, BookingStatus, BookingView, PaymentMethod};
use crate::errors::AppResult;
use crate::services::{BookingUpdate, CreateBookingInput, PaymentConfirmation};
use crate::types::{ApiResponse, Created};

/// Accept `YYYY-MM-DD` or a full RFC 3339 timestamp (date part is used).
fn parse_stay_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| format!("invalid date: {}", raw))
}

fn stay_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_stay_date(&raw).map_err(serde::de::Error::custom)
}

fn optional_stay_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_stay_date(&raw).map_err(serde::de::Error::custom))
        .transpose()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Room to book
    pub room: Uuid,
    /// Optional; must be the room's hotel
    pub hotel: Option<Uuid>,
    #[serde(deserialize_with = "stay_date")]
    #[schema(value_type = String, format = Date, example = "2026-12-20")]
    pub check_in_date: NaiveDate,
    #[serde(deserialize_with = "stay_date")]
    #[schema(value_type = String, format = Date, example = "2026-12-23")]
    pub check_out_date: NaiveDate,
    #[validate(range(min = 1, message = "At least one guest is required"))]
    pub guests: i32,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    #[serde(default, deserialize_with = "optional_stay_date")]
    #[schema(value_type = Option<String>, format = Date)]
    pub check_in_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_stay_date")]
    #[schema(value_type = Option<String>, format = Date)]
    pub check_out_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "At least one guest is required"))]
    pub guests: Option<i32>,
    /// Hotel owner or admin only
    pub status: Option<BookingStatus>,
    /// Hotel owner or admin only
    pub is_paid: Option<bool>,
}

impl From<CreateBookingRequest> for CreateBookingInput {
    fn from(req: CreateBookingRequest) -> Self {
        CreateBookingInput {
            room_id: req.room,
            hotel_id: req.hotel,
            check_in_date: req.check_in_date,
            check_out_date: req.check_out_date,
            guests: req.guests,
            payment_method: req.payment_method,
            payment: PaymentConfirmation {
                order_id: req.razorpay_order_id,
                payment_id: req.razorpay_payment_id,
                signature: req.razorpay_signature,
            },
        }
    }
}

impl From<UpdateBookingRequest> for BookingUpdate {
    fn from(req: UpdateBookingRequest) -> Self {
        BookingUpdate {
            check_in_date: req.check_in_date,
            check_out_date: req.check_out_date,
            guests: req.guests,
            status: req.status,
            is_paid: req.is_paid,
        }
    }
}

/// Create booking routes (all require a bearer token)
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(my_bookings).post(create_booking))
        .route(
            "/:id",
            get(get_booking).put(update_booking).delete(cancel_booking),
        )
        .route("/hotel/:hotel_id", get(hotel_bookings))
}

/// Caller's bookings, newest first
#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "Bookings",
    responses((status = 200, description = "Caller's bookings", body = Vec<BookingView>)),
    security(("bearer_auth" = []))
)]
pub async fn my_bookings(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<BookingView>>>> {
    let bookings = state
        .services
        .bookings()
        .my_bookings(current_user.actor())
        .await?;
    Ok(Json(ApiResponse::list(bookings)))
}

/// Get a booking
#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = BookingView),
        (status = 403, description = "Not your booking"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_booking(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<BookingView>>> {
    let booking = state
        .services
        .bookings()
        .get_booking(current_user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::success(booking)))
}

/// Book a room
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "Bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingView),
        (status = 400, description = "Invalid dates, guests, room or payment"),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room is already booked for the selected dates")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_booking(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateBookingRequest>,
) -> AppResult<Created<BookingView>> {
    let booking = state
        .services
        .bookings()
        .create_booking(current_user.actor(), payload.into())
        .await?;

    Ok(Created::with_message(booking, "Booking created successfully"))
}

/// Update a booking
#[utoipa::path(
    put,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Booking updated", body = BookingView),
        (status = 400, description = "Invalid change"),
        (status = 403, description = "Not allowed to make this change"),
        (status = 409, description = "Room is already booked for the selected dates")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_booking(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateBookingRequest>,
) -> AppResult<Json<ApiResponse<BookingView>>> {
    let booking = state
        .services
        .bookings()
        .update_booking(current_user.actor(), id, payload.into())
        .await?;

    Ok(Json(ApiResponse::with_message(
        booking,
        "Booking updated successfully",
    )))
}

/// Cancel a booking
#[utoipa::path(
    delete,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = Booking),
        (status = 400, description = "Completed bookings cannot be cancelled"),
        (status = 403, description = "Not your booking")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(id): IdPath,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let booking = state
        .services
        .bookings()
        .cancel_booking(current_user.actor(), id)
        .await?;

    Ok(Json(ApiResponse::with_message(
        booking,
        "Booking cancelled successfully",
    )))
}

/// Bookings of a hotel the caller manages
#[utoipa::path(
    get,
    path = "/api/bookings/hotel/{hotel_id}",
    tag = "Bookings",
    params(("hotel_id" = Uuid, Path, description = "Hotel ID")),
    responses(
        (status = 200, description = "Hotel bookings", body = Vec<BookingView>),
        (status = 403, description = "Not the hotel owner"),
        (status = 404, description = "Hotel not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn hotel_bookings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    IdPath(hotel_id): IdPath,
) -> AppResult<Json<ApiResponse<Vec<BookingView>>>> {
    let bookings = state
        .services
        .bookings()
        .hotel_bookings(current_user.actor(), hotel_id)
        .await?;
    Ok(Json(ApiResponse::list(bookings)))
}
