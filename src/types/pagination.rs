//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Page selection after defaults and clamping have been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PaginationParams {
    pub page: u64,
    pub limit: u64,
}

impl PaginationParams {
    /// Build from optional raw values. Page is at least 1 and limit is
    /// clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE_NUMBER).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Calculate offset for database query
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit
    }

    /// Zero-based page index, as SeaORM paginators expect
    pub fn page_index(&self) -> u64 {
        self.page.saturating_sub(1)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// `ceil(total / limit)`, zero when nothing matches
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

/// Pagination metadata returned alongside a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageInfo {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

/// One page of results plus its metadata
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, params: PaginationParams, total: u64) -> Self {
        Self {
            items,
            info: PageInfo {
                total,
                page: params.page,
                pages: total_pages(total, params.limit),
            },
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            info: self.info,
        }
    }
}
