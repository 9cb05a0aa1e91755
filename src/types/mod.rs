//! Shared response and pagination types.

mod pagination;
mod response;

pub use pagination::{total_pages, PageInfo, Paginated, PaginationParams};
pub use response::{ApiResponse, Created};
