//! Page metadata derived from `(total_count, limit, offset)`.

use serde::Serialize;

/// Default page size when the caller supplies none.
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("limit must be between 1 and {max}")]
    InvalidLimit { max: i64 },

    #[error("offset must not be negative")]
    InvalidOffset,
}

impl PageError {
    /// Name of the request parameter the error is attributed to.
    pub fn field(&self) -> &'static str {
        match self {
            PageError::InvalidLimit { .. } => "limit",
            PageError::InvalidOffset => "offset",
        }
    }
}

/// Response-only page metadata. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Compute page metadata.
    ///
    /// A negative `offset` is treated as `0`. The page is clamped to
    /// `total_pages`, and floored at `1` so an empty result reports page 1 of 0.
    /// `limit` is expected to be normalized upstream; non-positive values are
    /// treated as `1`.
    pub fn compute(total_count: i64, limit: i64, offset: i64) -> Self {
        let limit = limit.max(1);
        let total_count = total_count.max(0);
        let total_pages = (total_count + limit - 1) / limit;

        let offset = offset.max(0);
        let page = (offset / limit + 1).min(total_pages).max(1);

        Self {
            page,
            page_size: limit,
            total_count,
            total_pages,
        }
    }
}

/// Resolve a caller-supplied limit.
///
/// `None` and `0` mean "unset" and yield `default`.
pub fn resolve_limit(limit: Option<i64>, default: i64, max: i64) -> Result<i64, PageError> {
    match limit {
        None | Some(0) => Ok(default),
        Some(l) if (1..=max).contains(&l) => Ok(l),
        Some(_) => Err(PageError::InvalidLimit { max }),
    }
}

/// Resolve a caller-supplied offset.
///
/// `None` and `0` both mean "first page" and yield `None`.
pub fn resolve_offset(offset: Option<i64>) -> Result<Option<i64>, PageError> {
    match offset {
        None | Some(0) => Ok(None),
        Some(o) if o > 0 => Ok(Some(o)),
        Some(_) => Err(PageError::InvalidOffset),
    }
}
