//! Offset pagination for listing endpoints.

use serde::{Deserialize, Serialize};

/// `?page=N&search=...` query string accepted by listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Search term with surrounding whitespace removed; blank means no filter.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Window into an ordered result set. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, per_page: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page,
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_zero_is_clamped_to_first_page() {
        let request = PageRequest::new(Some(0), 10);
        assert_eq!(request.page, 1);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let request = PageRequest::new(Some(3), 20);
        assert_eq!(request.limit(), 20);
        assert_eq!(request.offset(), 40);
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = ListQuery {
            page: None,
            search: Some("   ".to_string()),
        };
        assert_eq!(query.search_term(), None);
    }
}
