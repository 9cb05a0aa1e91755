//! Room domain entity and room search parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::HotelView;
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Room categories offered by hotels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RoomType {
    #[serde(rename = "Single Bed")]
    SingleBed,
    #[serde(rename = "Double Bed")]
    DoubleBed,
    Suite,
    Deluxe,
    #[serde(rename = "Presidential Suite")]
    PresidentialSuite,
}

impl RoomType {
    pub const ALL: [RoomType; 5] = [
        RoomType::SingleBed,
        RoomType::DoubleBed,
        RoomType::Suite,
        RoomType::Deluxe,
        RoomType::PresidentialSuite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::SingleBed => "Single Bed",
            RoomType::DoubleBed => "Double Bed",
            RoomType::Suite => "Suite",
            RoomType::Deluxe => "Deluxe",
            RoomType::PresidentialSuite => "Presidential Suite",
        }
    }
}

impl std::str::FromStr for RoomType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Invalid room type: {}", s)))
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bookable room inside a hotel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_type: RoomType,
    pub price_per_night: f64,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub is_available: bool,
    pub max_guests: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Room with its hotel populated
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomView {
    #[serde(flatten)]
    pub room: Room,
    pub hotel: Option<HotelView>,
}

/// Fields needed to insert a room
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub hotel_id: Uuid,
    pub room_type: RoomType,
    pub price_per_night: f64,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub max_guests: i32,
    pub description: String,
}

/// Partial room update
#[derive(Debug, Clone, Default)]
pub struct RoomChanges {
    pub room_type: Option<RoomType>,
    pub price_per_night: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub is_available: Option<bool>,
    pub max_guests: Option<i32>,
    pub description: Option<String>,
}

pub fn validate_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation("Price per night must be a non-negative number"));
    }
    Ok(())
}

pub fn validate_max_guests(max_guests: i32) -> AppResult<()> {
    if max_guests < 1 {
        return Err(AppError::validation("Max guests must be at least 1"));
    }
    Ok(())
}

// =============================================================================
// Search
// =============================================================================

/// Raw room search query string.
///
/// Every value is taken as text so malformed numbers surface as a 400 with a
/// readable message instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RoomSearchQuery {
    /// Exact hotel city
    pub city: Option<String>,
    /// Case-insensitive match on hotel name or city
    pub search: Option<String>,
    /// Hotel id
    pub hotel: Option<String>,
    pub room_type: Option<String>,
    /// `true` or `false`
    pub available: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// Comma separated; rooms must offer all of them
    pub amenities: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    /// `name` (hotel name, default), `price`, anything else sorts newest first
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`
    pub sort_order: Option<String>,
}

/// Sort key for room search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomSort {
    HotelName,
    Price,
    Newest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Parsed and validated room search
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSearch {
    pub city: Option<String>,
    pub search: Option<String>,
    pub hotel_id: Option<Uuid>,
    pub room_type: Option<RoomType>,
    pub available: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub amenities: Vec<String>,
    pub pagination: PaginationParams,
    pub sort: RoomSort,
    pub order: SortOrder,
}

impl Default for RoomSearch {
    fn default() -> Self {
        Self {
            city: None,
            search: None,
            hotel_id: None,
            room_type: None,
            available: None,
            min_price: None,
            max_price: None,
            amenities: Vec::new(),
            pagination: PaginationParams::default(),
            sort: RoomSort::HotelName,
            order: SortOrder::Asc,
        }
    }
}

impl TryFrom<RoomSearchQuery> for RoomSearch {
    type Error = AppError;

    fn try_from(query: RoomSearchQuery) -> AppResult<Self> {
        let hotel_id = non_blank(query.hotel)
            .map(|id| {
                Uuid::parse_str(&id).map_err(|_| AppError::bad_request("Invalid hotel id"))
            })
            .transpose()?;

        let room_type = non_blank(query.room_type)
            .map(|t| t.parse::<RoomType>())
            .transpose()?;

        let available = non_blank(query.available)
            .map(|v| match v.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(AppError::bad_request("available must be true or false")),
            })
            .transpose()?;

        let min_price = parse_number::<f64>(query.min_price, "minPrice")?;
        let max_price = parse_number::<f64>(query.max_price, "maxPrice")?;

        let amenities = query
            .amenities
            .as_deref()
            .map(parse_amenities)
            .unwrap_or_default();

        let page = parse_number::<u64>(query.page, "page")?;
        let limit = parse_number::<u64>(query.limit, "limit")?;

        let sort = match non_blank(query.sort_by).as_deref() {
            None | Some("name") => RoomSort::HotelName,
            Some("price") => RoomSort::Price,
            Some(_) => RoomSort::Newest,
        };

        let order = match non_blank(query.sort_order).as_deref() {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };

        Ok(Self {
            city: non_blank(query.city),
            search: non_blank(query.search),
            hotel_id,
            room_type,
            available,
            min_price,
            max_price,
            amenities,
            pagination: PaginationParams::new(page, limit),
            sort,
            order,
        })
    }
}

/// Split a comma separated amenity list
pub fn parse_amenities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, name: &str) -> AppResult<Option<T>> {
    non_blank(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| AppError::bad_request(format!("{} must be a number", name)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&RoomType::PresidentialSuite).unwrap(),
            "\"Presidential Suite\""
        );
        assert_eq!("Double Bed".parse::<RoomType>().unwrap(), RoomType::DoubleBed);
        assert!("Penthouse".parse::<RoomType>().is_err());
    }

    #[test]
    fn test_empty_query_uses_defaults() {
        let search = RoomSearch::try_from(RoomSearchQuery::default()).unwrap();
        assert_eq!(search, RoomSearch::default());
    }

    #[test]
    fn test_sort_parsing() {
        let query = RoomSearchQuery {
            sort_by: Some("price".into()),
            sort_order: Some("desc".into()),
            ..Default::default()
        };
        let search = RoomSearch::try_from(query).unwrap();
        assert_eq!(search.sort, RoomSort::Price);
        assert_eq!(search.order, SortOrder::Desc);

        let query = RoomSearchQuery {
            sort_by: Some("createdAt".into()),
            ..Default::default()
        };
        assert_eq!(RoomSearch::try_from(query).unwrap().sort, RoomSort::Newest);
    }

    #[test]
    fn test_malformed_price_is_rejected() {
        let query = RoomSearchQuery {
            min_price: Some("cheap".into()),
            ..Default::default()
        };
        let err = RoomSearch::try_from(query).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_amenities_csv() {
        assert_eq!(parse_amenities("WiFi, Pool ,,Spa"), vec!["WiFi", "Pool", "Spa"]);
    }

    #[test]
    fn test_limit_is_clamped() {
        let query = RoomSearchQuery {
            page: Some("0".into()),
            limit: Some("500".into()),
            ..Default::default()
        };
        let search = RoomSearch::try_from(query).unwrap();
        assert_eq!(search.pagination.page, 1);
        assert_eq!(search.pagination.limit, 100);
    }
}
