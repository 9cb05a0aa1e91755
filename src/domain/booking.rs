//! Booking domain entity and stay rules.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Hotel, Room, UserSummary};
use crate::errors::{AppError, AppResult};

/// Booking lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Guests may still move dates or change party size
    pub fn is_modifiable(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Invalid booking status: {}", s)))
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Pay At Hotel")]
    PayAtHotel,
    Stripe,
    PayPal,
    Razorpay,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::PayAtHotel,
        PaymentMethod::Stripe,
        PaymentMethod::PayPal,
        PaymentMethod::Razorpay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::PayAtHotel => "Pay At Hotel",
            PaymentMethod::Stripe => "Stripe",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::Razorpay => "Razorpay",
        }
    }

    /// Status and paid flag a new booking starts with
    pub fn initial_state(&self) -> (BookingStatus, bool) {
        match self {
            PaymentMethod::Razorpay => (BookingStatus::Confirmed, true),
            PaymentMethod::Stripe | PaymentMethod::PayPal => (BookingStatus::Pending, true),
            PaymentMethod::PayAtHotel => (BookingStatus::Pending, false),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Invalid payment method: {}", s)))
    }
}

/// A reservation of one room for a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub hotel_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: i32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    #[serde(skip_serializing)]
    pub razorpay_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking with room, hotel and guest populated
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub room: Option<Room>,
    pub hotel: Option<Hotel>,
    pub user: Option<UserSummary>,
}

/// Fields needed to insert a booking
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub hotel_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub guests: i32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

/// Partial booking update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingChanges {
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub guests: Option<i32>,
    pub total_price: Option<f64>,
    pub status: Option<BookingStatus>,
    pub is_paid: Option<bool>,
}

impl BookingChanges {
    /// Changes that move the stay and therefore need an availability re-check
    pub fn moves_stay(&self) -> bool {
        self.check_in_date.is_some() || self.check_out_date.is_some()
    }

    /// Whether applying these changes to a booking in `current` status must
    /// first prove the room is free. True when the booking ends up live and
    /// either its dates move or it comes back from `cancelled`.
    pub fn needs_availability_check(&self, current: BookingStatus) -> bool {
        let next = self.status.unwrap_or(current);
        if next == BookingStatus::Cancelled {
            return false;
        }
        let reactivated = current == BookingStatus::Cancelled;
        self.moves_stay() || reactivated
    }
}

/// Booking listing filters; unset fields do not constrain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingFilter {
    pub user_id: Option<Uuid>,
    pub hotel_id: Option<Uuid>,
    pub status: Option<BookingStatus>,
    pub limit: Option<u64>,
}

/// Paid revenue for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
    pub count: u64,
}

/// Group paid bookings by (year, month) of creation, oldest month first.
pub fn monthly_revenue(paid: &[(DateTime<Utc>, f64)]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<(i32, u32), (f64, u64)> = BTreeMap::new();
    for (created_at, amount) in paid {
        let entry = months
            .entry((created_at.year(), created_at.month()))
            .or_insert((0.0, 0));
        entry.0 += amount;
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|((year, month), (revenue, count))| MonthlyRevenue {
            year,
            month,
            revenue,
            count,
        })
        .collect()
}

/// Validate a stay and return its number of nights.
///
/// Check-in may be today but not earlier; check-out must follow check-in.
pub fn validate_stay(check_in: NaiveDate, check_out: NaiveDate, today: NaiveDate) -> AppResult<i64> {
    if check_in < today {
        return Err(AppError::bad_request("Check-in date cannot be in the past"));
    }
    if check_out <= check_in {
        return Err(AppError::bad_request(
            "Check-out date must be after check-in date",
        ));
    }
    Ok((check_out - check_in).num_days())
}

pub fn validate_guests(guests: i32, max_guests: i32) -> AppResult<()> {
    if guests < 1 {
        return Err(AppError::bad_request("At least one guest is required"));
    }
    if guests > max_guests {
        return Err(AppError::bad_request(format!(
            "This room allows a maximum of {} guests",
            max_guests
        )));
    }
    Ok(())
}

pub fn total_price(nights: i64, price_per_night: f64) -> f64 {
    nights as f64 * price_per_night
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_stay_counts_nights() {
        let today = date(2025, 3, 1);
        assert_eq!(validate_stay(date(2025, 3, 1), date(2025, 3, 4), today).unwrap(), 3);
    }

    #[test]
    fn test_validate_stay_rejects_past_and_inverted() {
        let today = date(2025, 3, 10);
        assert!(validate_stay(date(2025, 3, 9), date(2025, 3, 12), today).is_err());
        assert!(validate_stay(date(2025, 3, 12), date(2025, 3, 12), today).is_err());
        assert!(validate_stay(date(2025, 3, 12), date(2025, 3, 11), today).is_err());
    }

    #[test]
    fn test_guest_bounds() {
        assert!(validate_guests(2, 2).is_ok());
        assert!(validate_guests(3, 2).is_err());
        assert!(validate_guests(0, 2).is_err());
    }

    #[test]
    fn test_reactivating_cancelled_booking_needs_availability_check() {
        for status in [BookingStatus::Pending, BookingStatus::Confirmed, BookingStatus::Completed] {
            let changes = BookingChanges {
                status: Some(status),
                ..Default::default()
            };
            assert!(changes.needs_availability_check(BookingStatus::Cancelled));
        }
    }

    #[test]
    fn test_status_only_change_on_live_booking_skips_check() {
        let changes = BookingChanges {
            status: Some(BookingStatus::Completed),
            is_paid: Some(true),
            ..Default::default()
        };
        assert!(!changes.needs_availability_check(BookingStatus::Confirmed));
        assert!(!BookingChanges::default().needs_availability_check(BookingStatus::Cancelled));
    }

    #[test]
    fn test_moving_dates_needs_check_unless_cancelled() {
        let moved = BookingChanges {
            check_in_date: Some(date(2025, 5, 2)),
            ..Default::default()
        };
        assert!(moved.needs_availability_check(BookingStatus::Pending));
        assert!(!moved.needs_availability_check(BookingStatus::Cancelled));

        let moved_and_cancelled = BookingChanges {
            status: Some(BookingStatus::Cancelled),
            ..moved
        };
        assert!(!moved_and_cancelled.needs_availability_check(BookingStatus::Pending));
    }

    #[test]
    fn test_monthly_revenue_groups_and_sorts() {
        let at = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
                .and_utc()
        };
        let rows = vec![
            (at(2025, 2, 3), 100.0),
            (at(2024, 12, 31), 50.0),
            (at(2025, 2, 20), 25.5),
        ];
        let months = monthly_revenue(&rows);
        assert_eq!(months.len(), 2);
        assert_eq!((months[0].year, months[0].month), (2024, 12));
        assert_eq!(months[1].revenue, 125.5);
        assert_eq!(months[1].count, 2);
    }

    #[test]
    fn test_payment_method_initial_state() {
        assert_eq!(
            PaymentMethod::Razorpay.initial_state(),
            (BookingStatus::Confirmed, true)
        );
        assert_eq!(
            PaymentMethod::default().initial_state(),
            (BookingStatus::Pending, false)
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::PayAtHotel).unwrap(),
            "\"Pay At Hotel\""
        );
    }
}
