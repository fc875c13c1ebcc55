//! Pagination arithmetic for list endpoints.

use serde::Serialize;

use crate::limit::Limit;

/// Rows per page when the caller does not choose.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// One page of a listing.
///
/// A page index past the end, or an empty listing, collapses to page 1 with
/// a zero limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub item_count: i64,
    pub page_index: i64,
    pub page_size: i64,
    pub page_count: i64,
    pub offset: i64,
    pub limit: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Page {
    /// Computes the page at 1-based `page_index`.
    pub fn new(item_count: i64, page_index: i64, page_size: i64) -> Self {
        let page_size = page_size.max(1);
        let item_count = item_count.max(0);
        let page_count = item_count / page_size + i64::from(item_count % page_size != 0);

        let (page_index, offset, limit) =
            if item_count == 0 || page_index > page_count || page_index < 1 {
                (1, 0, 0)
            } else {
                (page_index, page_size * (page_index - 1), page_size)
            };

        Self {
            item_count,
            page_index,
            page_size,
            page_count,
            offset,
            limit,
            has_next: page_index < page_count,
            has_previous: page_index > 1,
        }
    }

    /// The `(offset, count)` limit selecting this page.
    pub fn limit(&self) -> Limit {
        Limit::Range {
            offset: self.offset,
            count: self.limit,
        }
    }
}

/// Parses a 1-based page index from a query parameter; anything unusable
/// becomes 1.
pub fn page_index(raw: &str) -> i64 {
    raw.trim().parse::<i64>().ok().filter(|p| *p >= 1).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_page() {
        let p = Page::new(91, 3, DEFAULT_PAGE_SIZE);
        assert_eq!(p.page_count, 10);
        assert_eq!(p.offset, 20);
        assert_eq!(p.limit, 10);
        assert!(p.has_next);
        assert!(p.has_previous);
        assert_eq!(p.limit(), Limit::Range { offset: 20, count: 10 });
    }

    #[test]
    fn last_and_out_of_range_pages() {
        let p = Page::new(91, 10, DEFAULT_PAGE_SIZE);
        assert_eq!(p.offset, 90);
        assert!(!p.has_next);

        let p = Page::new(91, 11, DEFAULT_PAGE_SIZE);
        assert_eq!((p.page_index, p.offset, p.limit), (1, 0, 0));
    }

    #[test]
    fn empty_listing() {
        let p = Page::new(0, 1, DEFAULT_PAGE_SIZE);
        assert_eq!(p.page_count, 0);
        assert_eq!(p.limit, 0);
        assert!(!p.has_next);
        assert!(!p.has_previous);
    }

    #[test]
    fn huge_item_counts_do_not_overflow() {
        let p = Page::new(i64::MAX, 1, DEFAULT_PAGE_SIZE);
        assert_eq!(p.page_count, i64::MAX / 10 + 1);
        assert_eq!((p.offset, p.limit), (0, 10));
        assert!(p.has_next);

        let p = Page::new(i64::MAX, p.page_count, DEFAULT_PAGE_SIZE);
        assert_eq!(p.offset, (i64::MAX / 10) * 10);
        assert!(!p.has_next);
    }

    #[test]
    fn parses_page_index() {
        assert_eq!(page_index("4"), 4);
        assert_eq!(page_index(" 2 "), 2);
        assert_eq!(page_index("x"), 1);
        assert_eq!(page_index("0"), 1);
        assert_eq!(page_index("-3"), 1);
    }
}
