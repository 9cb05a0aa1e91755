//! Payment gateway handlers.

use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::{CreatedOrder, PaymentConfirmation, VerifiedPayment};
use crate::types::ApiResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    /// Amount in major units (e.g. rupees)
    #[schema(example = 7500.0)]
    pub amount: f64,
    /// Defaults to INR
    pub currency: Option<String>,
    pub receipt: Option<String>,
}

/// Checkout callback fields, named as the gateway sends them
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

impl From<VerifyPaymentRequest> for PaymentConfirmation {
    fn from(req: VerifyPaymentRequest) -> Self {
        PaymentConfirmation {
            order_id: req.razorpay_order_id,
            payment_id: req.razorpay_payment_id,
            signature: req.razorpay_signature,
        }
    }
}

/// Create payment routes (all require a bearer token)
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/verify", post(verify_payment))
}

/// Create a gateway order for checkout
#[utoipa::path(
    post,
    path = "/api/payment/create-order",
    tag = "Payment",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = CreatedOrder),
        (status = 400, description = "Invalid amount"),
        (status = 502, description = "Payment gateway error"),
        (status = 503, description = "Payment gateway not configured")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<CreatedOrder>>> {
    let order = state
        .services
        .payments()
        .create_order(payload.amount, payload.currency, payload.receipt)
        .await?;

    Ok(Json(ApiResponse::success(order)))
}

/// Verify a checkout signature
#[utoipa::path(
    post,
    path = "/api/payment/verify",
    tag = "Payment",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified", body = VerifiedPayment),
        (status = 400, description = "Missing details or invalid signature")
    ),
    security(("bearer_auth" = []))
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyPaymentRequest>,
) -> AppResult<Json<ApiResponse<VerifiedPayment>>> {
    let verified = state.services.payments().verify_payment(payload.into())?;
    Ok(Json(ApiResponse::with_message(
        verified,
        "Payment verified successfully",
    )))
}
