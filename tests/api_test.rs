//! Integration tests for the public API surface.
//!
//! These tests exercise response envelopes, error mapping and the booking
//! and payment rules without requiring database or Redis connections.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{NaiveDate, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use hotel_booking_api::domain::booking::{
    monthly_revenue, total_price, validate_guests, validate_stay,
};
use hotel_booking_api::domain::{
    AuthProvider, BookingStatus, Password, PaymentMethod, RoomSearch, RoomSearchQuery, RoomSort,
    RoomType, SortOrder, User, UserRole,
};
use hotel_booking_api::errors::{AppError, AppResult};
use hotel_booking_api::infra::{GatewayOrder, OrderRequest, PaymentGateway};
use hotel_booking_api::services::{
    generate_token, sign_payment, to_minor_units, verify_payment_signature, Claims,
    PaymentConfirmation, PaymentProcessor, PaymentService,
};
use hotel_booking_api::types::{ApiResponse, Paginated, PaginationParams};
use hotel_booking_api::Config;

const JWT_SECRET: &str = "test-secret-key-for-testing-only-32chars";
const RAZORPAY_SECRET: &str = "rzp_test_secret";

// =============================================================================
// Mock Gateway for Testing
// =============================================================================

/// Gateway that records the order it was asked for and echoes it back
struct RecordingGateway {
    last_order: Mutex<Option<OrderRequest>>,
}

impl RecordingGateway {
    fn new() -> Self {
        Self {
            last_order: Mutex::new(None),
        }
    }

    fn last_order(&self) -> Option<OrderRequest> {
        self.last_order.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    fn key_id(&self) -> String {
        "rzp_test_key".to_string()
    }

    async fn create_order(&self, order: OrderRequest) -> AppResult<GatewayOrder> {
        let created = GatewayOrder {
            id: "order_test_1".to_string(),
            amount: order.amount,
            currency: order.currency.clone(),
        };
        *self.last_order.lock().unwrap() = Some(order);
        Ok(created)
    }
}

/// Gateway that is always down
struct FailingGateway;

#[async_trait]
impl PaymentGateway for FailingGateway {
    fn key_id(&self) -> String {
        "rzp_test_key".to_string()
    }

    async fn create_order(&self, _order: OrderRequest) -> AppResult<GatewayOrder> {
        Err(AppError::Gateway("connection refused".to_string()))
    }
}

fn test_user(role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        username: "traveller".to_string(),
        email: "traveller@example.com".to_string(),
        password_hash: None,
        google_id: None,
        auth_provider: AuthProvider::Local,
        role,
        image: String::new(),
        recent_searched_cities: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn error_body(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =============================================================================
// Response Envelope Tests
// =============================================================================

#[test]
fn test_api_response_success() {
    let response = ApiResponse::success("room booked");
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["data"], "room booked");
    assert!(json.get("message").is_none());
    assert!(json.get("count").is_none());
}

#[test]
fn test_api_response_list_carries_count() {
    let response = ApiResponse::list(vec!["Goa", "Shimla", "Mumbai"]);
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["count"], 3);
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
    assert!(json.get("pagination").is_none());
}

#[test]
fn test_api_response_page_carries_pagination() {
    let params = PaginationParams::new(Some(2), Some(2));
    let page = Paginated::new(vec![3, 4], params, 5);
    let json = serde_json::to_value(ApiResponse::page(page)).unwrap();

    assert_eq!(json["count"], 2);
    assert_eq!(json["pagination"]["total"], 5);
    assert_eq!(json["pagination"]["page"], 2);
    assert_eq!(json["pagination"]["pages"], 3);
}

#[test]
fn test_api_response_message_only() {
    let json = serde_json::to_value(ApiResponse::message("Booking deleted")).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Booking deleted");
    assert!(json.get("data").is_none());
}

#[test]
fn test_pagination_clamps_limits() {
    let params = PaginationParams::new(Some(0), Some(10_000));
    assert_eq!(params.page, 1);
    assert_eq!(params.limit, 100);

    let defaults = PaginationParams::new(None, None);
    assert_eq!(defaults.limit, 9);
    assert_eq!(defaults.offset(), 0);
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::forbidden("nope").status(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::NotFound("Room").status(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::conflict("taken").status(), StatusCode::CONFLICT);
    assert_eq!(AppError::bad_request("bad").status(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::validation("bad").status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        AppError::Gateway("down".into()).status(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        AppError::NotConfigured("Payment gateway").status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        AppError::internal("boom").status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_error_body_shape() {
    let (status, body) = error_body(AppError::NotFound("Hotel")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Hotel not found");
}

#[tokio::test]
async fn test_internal_error_details_are_hidden() {
    let (_, body) = error_body(AppError::internal("secret stack trace")).await;

    assert_eq!(body["message"], "An internal error occurred");
    assert!(!body.to_string().contains("secret stack trace"));
}

// =============================================================================
// Password Tests
// =============================================================================

#[test]
fn test_password_hashing() {
    let password = Password::new("secret123").unwrap();

    assert!(password.verify("secret123"));
    assert!(!password.verify("secret124"));
    assert!(password.as_str().starts_with("$argon2"));
}

#[test]
fn test_password_too_short() {
    let result = Password::new("12345");
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn test_account_without_password_never_matches() {
    let user = test_user(UserRole::User);
    assert!(!user.verify_password("anything"));
}

// =============================================================================
// Token Tests
// =============================================================================

#[test]
fn test_generated_token_carries_identity() {
    let config = Config::for_tests(JWT_SECRET);
    let user = test_user(UserRole::HotelOwner);

    let token = generate_token(&user, &config).unwrap();
    let claims = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )
    .unwrap()
    .claims;

    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.email, user.email);
    assert_eq!(claims.role, "hotelOwner");
    assert!(claims.exp > claims.iat);
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let config = Config::for_tests("another-secret-key-that-is-long-enough");
    let token = generate_token(&test_user(UserRole::User), &config).unwrap();

    let result = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    );
    assert!(result.is_err());
}

// =============================================================================
// Domain Value Tests
// =============================================================================

#[test]
fn test_role_parsing() {
    assert_eq!("hotelOwner".parse::<UserRole>().unwrap(), UserRole::HotelOwner);
    assert!("superuser".parse::<UserRole>().is_err());
    assert_eq!(UserRole::from("garbage"), UserRole::User);
    assert!(UserRole::Admin.can_access(&UserRole::HotelOwner));
    assert!(!UserRole::User.can_access(&UserRole::HotelOwner));
}

#[test]
fn test_payment_method_initial_state() {
    assert_eq!(
        PaymentMethod::PayAtHotel.initial_state(),
        (BookingStatus::Pending, false)
    );
    assert_eq!(
        PaymentMethod::Razorpay.initial_state(),
        (BookingStatus::Confirmed, true)
    );
    assert_eq!(
        serde_json::to_value(PaymentMethod::PayAtHotel).unwrap(),
        "Pay At Hotel"
    );
}

#[test]
fn test_only_open_bookings_are_modifiable() {
    assert!(BookingStatus::Pending.is_modifiable());
    assert!(BookingStatus::Confirmed.is_modifiable());
    assert!(!BookingStatus::Cancelled.is_modifiable());
    assert!(!BookingStatus::Completed.is_modifiable());
}

// =============================================================================
// Booking Rule Tests
// =============================================================================

#[test]
fn test_stay_pricing() {
    let today = date(2025, 6, 1);
    let nights = validate_stay(date(2025, 6, 10), date(2025, 6, 13), today).unwrap();

    assert_eq!(nights, 3);
    assert_eq!(total_price(nights, 2500.0), 7500.0);
}

#[test]
fn test_stay_rejections() {
    let today = date(2025, 6, 10);

    assert!(validate_stay(date(2025, 6, 9), date(2025, 6, 12), today).is_err());
    assert!(validate_stay(date(2025, 6, 12), date(2025, 6, 12), today).is_err());
    assert!(validate_stay(date(2025, 6, 10), date(2025, 6, 11), today).is_ok());
}

#[test]
fn test_guest_limits() {
    assert!(validate_guests(4, 4).is_ok());
    assert!(validate_guests(5, 4).is_err());
    assert!(validate_guests(0, 4).is_err());
}

#[test]
fn test_monthly_revenue_sums_per_month() {
    let at = |m, d| Utc.with_ymd_and_hms(2025, m, d, 12, 0, 0).unwrap();
    let paid = [(at(3, 5), 1000.0), (at(2, 1), 500.0), (at(3, 20), 250.0)];

    let months = monthly_revenue(&paid);

    assert_eq!(months.len(), 2);
    assert_eq!((months[0].month, months[0].revenue, months[0].count), (2, 500.0, 1));
    assert_eq!((months[1].month, months[1].revenue, months[1].count), (3, 1250.0, 2));
}

// =============================================================================
// Room Search Tests
// =============================================================================

#[test]
fn test_room_search_defaults() {
    let search = RoomSearch::try_from(RoomSearchQuery::default()).unwrap();

    assert_eq!(search.sort, RoomSort::HotelName);
    assert_eq!(search.order, SortOrder::Asc);
    assert_eq!(search.pagination, PaginationParams::default());
    assert!(search.amenities.is_empty());
}

#[test]
fn test_room_search_parses_filters() {
    let hotel_id = Uuid::new_v4();
    let query = RoomSearchQuery {
        city: Some(" Goa ".into()),
        hotel: Some(hotel_id.to_string()),
        room_type: Some("Double Bed".into()),
        available: Some("true".into()),
        min_price: Some("1000".into()),
        max_price: Some("5000.5".into()),
        amenities: Some("WiFi, Pool Access,,".into()),
        page: Some("2".into()),
        limit: Some("5".into()),
        sort_by: Some("price".into()),
        sort_order: Some("desc".into()),
        ..Default::default()
    };

    let search = RoomSearch::try_from(query).unwrap();

    assert_eq!(search.city.as_deref(), Some("Goa"));
    assert_eq!(search.hotel_id, Some(hotel_id));
    assert_eq!(search.room_type, Some(RoomType::DoubleBed));
    assert_eq!(search.available, Some(true));
    assert_eq!(search.min_price, Some(1000.0));
    assert_eq!(search.max_price, Some(5000.5));
    assert_eq!(search.amenities, vec!["WiFi", "Pool Access"]);
    assert_eq!(search.pagination, PaginationParams::new(Some(2), Some(5)));
    assert_eq!(search.sort, RoomSort::Price);
    assert_eq!(search.order, SortOrder::Desc);
}

#[test]
fn test_room_search_rejects_malformed_values() {
    let bad_price = RoomSearchQuery {
        min_price: Some("cheap".into()),
        ..Default::default()
    };
    let bad_hotel = RoomSearchQuery {
        hotel: Some("not-a-uuid".into()),
        ..Default::default()
    };
    let bad_type = RoomSearchQuery {
        room_type: Some("Penthouse".into()),
        ..Default::default()
    };

    assert!(RoomSearch::try_from(bad_price).is_err());
    assert!(RoomSearch::try_from(bad_hotel).is_err());
    assert!(RoomSearch::try_from(bad_type).is_err());
}

// =============================================================================
// Payment Tests
// =============================================================================

#[test]
fn test_minor_units() {
    assert_eq!(to_minor_units(2500.0).unwrap(), 250_000);
    assert_eq!(to_minor_units(99.99).unwrap(), 9999);
    assert!(to_minor_units(0.0).is_err());
    assert!(to_minor_units(-5.0).is_err());
}

#[test]
fn test_signature_round_trip() {
    let signature = sign_payment(RAZORPAY_SECRET, "order_1", "pay_1").unwrap();

    assert!(verify_payment_signature(RAZORPAY_SECRET, "order_1", "pay_1", &signature));
    assert!(!verify_payment_signature(RAZORPAY_SECRET, "order_1", "pay_2", &signature));
    assert!(!verify_payment_signature("other", "order_1", "pay_1", &signature));
    assert!(!verify_payment_signature(RAZORPAY_SECRET, "order_1", "pay_1", "zz"));
}

#[tokio::test]
async fn test_create_order_uses_defaults() {
    let gateway = Arc::new(RecordingGateway::new());
    let shared: Arc<dyn PaymentGateway> = gateway.clone();
    let processor = PaymentProcessor::new(Some(shared), Some(RAZORPAY_SECRET.into()));

    let order = processor.create_order(1499.99, None, None).await.unwrap();

    assert_eq!(order.order_id, "order_test_1");
    assert_eq!(order.amount, 149_999);
    assert_eq!(order.currency, "INR");
    assert_eq!(order.key_id, "rzp_test_key");

    let sent = gateway.last_order().unwrap();
    assert!(sent.receipt.starts_with("receipt_"));
    assert_eq!(sent.payment_capture, 1);
}

#[tokio::test]
async fn test_create_order_reports_gateway_failure() {
    let gateway: Arc<dyn PaymentGateway> = Arc::new(FailingGateway);
    let processor = PaymentProcessor::new(Some(gateway), None);

    let err = processor.create_order(100.0, None, None).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_create_order_without_gateway() {
    let processor = PaymentProcessor::new(None, None);

    let err = processor.create_order(100.0, None, None).await.unwrap_err();
    assert!(matches!(err, AppError::NotConfigured(_)));
}

#[test]
fn test_verify_payment() {
    let processor = PaymentProcessor::new(None, Some(RAZORPAY_SECRET.into()));
    let signature = sign_payment(RAZORPAY_SECRET, "order_9", "pay_9").unwrap();

    let verified = processor
        .verify_payment(PaymentConfirmation {
            order_id: Some("order_9".into()),
            payment_id: Some("pay_9".into()),
            signature: Some(signature),
        })
        .unwrap();
    assert_eq!(verified.payment_id, "pay_9");

    let missing = processor.verify_payment(PaymentConfirmation {
        order_id: Some("order_9".into()),
        ..Default::default()
    });
    assert!(matches!(missing, Err(AppError::BadRequest(_))));
}
