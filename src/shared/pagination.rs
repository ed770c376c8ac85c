//! Offset/limit paging for list endpoints

use serde::Deserialize;

use crate::shared::error::SharedError;

/// Page size when the caller does not pass `limit`
pub const DEFAULT_PAGE_LIMIT: i64 = 10;
/// Largest page size a caller may request
pub const MAX_PAGE_LIMIT: i64 = 100;

/// `?offset=&limit=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// Validated window into a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl PageParams {
    /// Reject negative offsets and limits outside `1..=MAX_PAGE_LIMIT`
    pub fn validate(self) -> Result<Page, SharedError> {
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(SharedError::validation("offset", "Offset cannot be negative"));
        }
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(SharedError::validation(
                "limit",
                format!("Limit must be between 1 and {}", MAX_PAGE_LIMIT),
            ));
        }
        Ok(Page { offset, limit })
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}
