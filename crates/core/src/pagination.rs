//! Page/offset arithmetic shared by list queries.

/// Default number of revisions returned per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on a requested page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
///
/// The result is at least 1 even when `max` is not positive.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).min(max).max(1)
}

/// Row offset for a 1-based page number. Pages below 1 are treated as 1.
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(page_size)
}

/// One page of results together with the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    /// Whether another page exists after this one.
    pub fn has_more(&self) -> bool {
        page_offset(self.page, self.page_size) + (self.items.len() as i64) < self.total
    }
}
