use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::{PageInfo, Paginated};

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            pagination: None,
            data: Some(data),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// List response carrying `count`
    pub fn list(items: Vec<T>) -> Self {
        Self {
            count: Some(items.len()),
            ..Self::success(items)
        }
    }

    /// One page of a paginated listing; `count` is the page size
    pub fn page(page: Paginated<T>) -> Self {
        Self {
            pagination: Some(page.info),
            ..Self::list(page.items)
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            pagination: None,
            data: None,
        }
    }
}

/// Created response helper for POST endpoints
pub struct Created<T: Serialize>(pub ApiResponse<T>);

impl<T: Serialize> Created<T> {
    pub fn new(data: T) -> Self {
        Self(ApiResponse::success(data))
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self(ApiResponse::with_message(data, message))
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}
