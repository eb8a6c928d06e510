//! Shared pagination types for list endpoints.
//!
//! All paginated endpoints use 1-based `page`/`limit` query parameters and
//! wrap their rows in [`PaginatedResponse`].

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Default number of items to return per page.
pub const DEFAULT_LIMIT: i64 = 20;

/// Maximum number of items that can be requested per page.
///
/// The clamp keeps a single request from forcing a full-table fetch.
pub const MAX_LIMIT: i64 = 100;

/// Standard pagination parameters for list endpoints.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct Pagination {
    /// 1-based page number (default: 1)
    #[param(default = 1, minimum = 1)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page: Option<i64>,

    /// Maximum number of items to return (default: 20, max: 100)
    #[param(default = 20, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}

impl Pagination {
    /// Get the page number, floored at 1.
    #[inline]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get the limit, clamped between 1 and MAX_LIMIT.
    #[inline]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Number of rows to skip for the current page.
    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Generic paginated response wrapper for list endpoints.
///
/// A page past the end of the result set yields empty `rows` with the totals
/// still populated; clamping the page number is the caller's concern.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T: ToSchema> {
    /// The items for the current page
    pub rows: Vec<T>,
    /// ceil(totalCount / limit)
    pub total_pages: i64,
    /// The requested page number
    pub current_page: i64,
    /// Total number of items matching the query (before pagination)
    pub total_count: i64,
}

impl<T: ToSchema> PaginatedResponse<T> {
    /// Wrap one page of rows with totals computed from the full count.
    pub fn new(rows: Vec<T>, total_count: i64, pagination: &Pagination) -> Self {
        let limit = pagination.limit();
        Self {
            rows,
            total_pages: (total_count + limit - 1) / limit,
            current_page: pagination.page(),
            total_count,
        }
    }
}
