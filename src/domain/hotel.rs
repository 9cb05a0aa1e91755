//! Hotel domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserSummary;
use crate::config::MAX_HOTEL_RATING;
use crate::errors::{AppError, AppResult};

/// A property listed by a hotel owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub contact: String,
    pub description: String,
    pub owner_id: Uuid,
    pub images: Vec<String>,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hotel {
    /// Owners manage their own hotels; admins manage all of them.
    pub fn is_managed_by(&self, user_id: Uuid, is_admin: bool) -> bool {
        is_admin || self.owner_id == user_id
    }
}

/// Hotel with its owner populated
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HotelView {
    #[serde(flatten)]
    pub hotel: Hotel,
    pub owner: Option<UserSummary>,
}

/// Fields needed to insert a hotel
#[derive(Debug, Clone)]
pub struct NewHotel {
    pub name: String,
    pub address: String,
    pub city: String,
    pub contact: String,
    pub description: String,
    pub owner_id: Uuid,
    pub images: Vec<String>,
}

/// Partial hotel update
#[derive(Debug, Clone, Default)]
pub struct HotelChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub rating: Option<f64>,
}

/// Filters for the public hotel listing
#[derive(Debug, Clone, Default)]
pub struct HotelFilter {
    /// Exact city match
    pub city: Option<String>,
    /// Case-insensitive substring over name or address
    pub search: Option<String>,
    pub owner_id: Option<Uuid>,
}

pub fn validate_rating(rating: f64) -> AppResult<()> {
    if !(0.0..=MAX_HOTEL_RATING).contains(&rating) {
        return Err(AppError::validation(format!(
            "Rating must be between 0 and {}",
            MAX_HOTEL_RATING
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(5.1).is_err());
        assert!(validate_rating(-0.5).is_err());
        assert!(validate_rating(f64::NAN).is_err());
    }
}
