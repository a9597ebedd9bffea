//! Pagination utilities for Kondukto API responses.
//!
//! Kondukto list endpoints page by offset: `start` is the index of the first
//! item and `limit` the page size.

use serde::{Deserialize, Serialize};

/// A page of results from the Kondukto API.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages (if known).
    pub total: Option<u64>,
    /// Offset of the first item on this page.
    pub start: u32,
    /// Requested page size.
    pub limit: u32,
    /// Whether there are more pages.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a new page from items and pagination info.
    #[must_use]
    pub fn new(items: Vec<T>, start: u32, limit: u32, total: Option<u64>) -> Self {
        let has_more = match total {
            Some(t) => (u64::from(start) + items.len() as u64) < t && !items.is_empty(),
            None => items.len() >= limit as usize && limit > 0,
        };
        Self {
            items,
            total,
            start,
            limit,
            has_more,
        }
    }

    /// Offset of the page following this one.
    #[must_use]
    pub fn next_start(&self) -> u32 {
        self.start.saturating_add(self.items.len() as u32)
    }
}

/// Query parameters for paginated requests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Offset of the first item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    /// Number of items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Create pagination params for a specific offset.
    #[must_use]
    pub fn at(start: u32, limit: u32) -> Self {
        Self {
            start: Some(start),
            limit: Some(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_has_more_with_total() {
        let page: Page<i32> = Page::new(vec![1; 100], 0, 100, Some(250));
        assert!(page.has_more);
        assert_eq!(page.next_start(), 100);

        let page: Page<i32> = Page::new(vec![1; 50], 200, 100, Some(250));
        assert!(!page.has_more);
    }

    #[test]
    fn test_page_has_more_without_total() {
        let page: Page<i32> = Page::new(vec![1; 100], 0, 100, None);
        assert!(page.has_more);

        let page: Page<i32> = Page::new(vec![1; 50], 0, 100, None);
        assert!(!page.has_more);
    }

    #[test]
    fn test_empty_page_never_has_more() {
        // A server that reports a stale total must not cause endless paging.
        let page: Page<i32> = Page::new(vec![], 100, 100, Some(500));
        assert!(!page.has_more);
    }
}
