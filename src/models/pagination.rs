//! Page requests and paged results

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::book::BookSummary;

/// A 1-based page of a fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    /// Page numbers below 1 are treated as 1, page sizes below 1 as 1
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Rows to ask the store for: one more than the page holds, so the
    /// presence of a next page can be detected without a COUNT query.
    pub fn fetch_limit(&self) -> i64 {
        self.page_size.saturating_add(1)
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub last_page: bool,
}

impl<T> Page<T> {
    /// Build a page from at most `fetch_limit()` rows
    pub fn from_overfetch(mut rows: Vec<T>, request: &PageRequest) -> Self {
        let size = usize::try_from(request.page_size()).unwrap_or(usize::MAX);
        let last_page = rows.len() <= size;
        rows.truncate(size);
        Self {
            items: rows,
            last_page,
        }
    }

    /// Slice an already ordered, fully materialized sequence
    pub fn slice(rows: &[T], request: &PageRequest) -> Self
    where
        T: Clone,
    {
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.fetch_limit()).unwrap_or(usize::MAX);
        let window = rows.iter().skip(offset).take(limit).cloned().collect();
        Self::from_overfetch(window, request)
    }
}

/// Book listing handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookListing {
    pub books: Vec<BookSummary>,
    pub current_page: i64,
    pub last_page: bool,
}

impl BookListing {
    pub fn new(page: Page<BookSummary>, request: &PageRequest) -> Self {
        Self {
            books: page.items,
            current_page: request.page(),
            last_page: page.last_page,
        }
    }
}

/// `?page=` query parameter
#[derive(Debug, Default, Deserialize, Validate, IntoParams, ToSchema)]
pub struct PageQuery {
    /// Page number (default: 1)
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        let req = PageRequest::new(3, 10);
        assert_eq!(req.offset(), 20);
        assert_eq!(req.fetch_limit(), 11);

        let req = PageRequest::new(0, 0);
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 1);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_overfetch_detects_next_page() {
        let req = PageRequest::new(1, 2);
        let page = Page::from_overfetch(vec![1, 2, 3], &req);
        assert_eq!(page.items, vec![1, 2]);
        assert!(!page.last_page);

        let page = Page::from_overfetch(vec![1, 2], &req);
        assert_eq!(page.items, vec![1, 2]);
        assert!(page.last_page);
    }

    #[test]
    fn test_slice_past_the_end() {
        let rows = vec![1, 2, 3, 4, 5];
        let page = Page::slice(&rows, &PageRequest::new(3, 2));
        assert_eq!(page.items, vec![5]);
        assert!(page.last_page);

        let page = Page::slice(&rows, &PageRequest::new(9, 2));
        assert!(page.items.is_empty());
        assert!(page.last_page);
    }

    #[test]
    fn test_listing_serializes_camel_case() {
        let listing = BookListing {
            books: vec![],
            current_page: 1,
            last_page: true,
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["lastPage"], true);
        assert!(json["books"].is_array());
    }

    #[test]
    fn test_page_query_validation() {
        assert!(PageQuery { page: Some(0) }.validate().is_err());
        assert!(PageQuery { page: Some(2) }.validate().is_ok());
        assert_eq!(PageQuery::default().page(), 1);
    }
}
