//! Pagination over an already-built view list

use serde::Serialize;

/// Largest page size a screen may ask for
pub const MAX_LIMIT: usize = 100;

/// A page of rows with its metadata
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// The paginated data
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PageMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PageMeta {
    /// Create pagination metadata; page is at least 1, limit in 1..=MAX_LIMIT
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_LIMIT);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        let start = (page - 1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }
}

/// Slice `items` into the requested page
pub fn paginate<T: Clone>(items: &[T], page: usize, limit: usize) -> Page<T> {
    let pagination = PageMeta::new(page, limit, items.len());
    let data = items
        .iter()
        .skip((pagination.page - 1).saturating_mul(pagination.limit))
        .take(pagination.limit)
        .cloned()
        .collect();

    Page { data, pagination }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_meta() {
        let meta = PageMeta::new(1, 20, 145);
        assert_eq!(meta.total, 145);
        assert_eq!(meta.total_pages, 8);
        assert!(!meta.has_prev);
        assert!(meta.has_next);
    }

    #[test]
    fn test_pagination_clamps() {
        let meta = PageMeta::new(0, 0, 3);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.limit, 1);

        assert_eq!(PageMeta::new(1, 500, 3).limit, MAX_LIMIT);
        assert_eq!(PageMeta::new(1, 10, 0).total_pages, 0);
    }

    #[test]
    fn test_paginate_last_page() {
        let items: Vec<u32> = (1..=7).collect();
        let page = paginate(&items, 3, 3);
        assert_eq!(page.data, vec![7]);
        assert!(!page.pagination.has_next);
        assert!(page.pagination.has_prev);

        let beyond = paginate(&items, 9, 3);
        assert!(beyond.data.is_empty());
    }

    #[test]
    fn test_huge_page_number() {
        let meta = PageMeta::new(usize::MAX, 10, 3);
        assert_eq!(meta.page, usize::MAX);
        assert!(!meta.has_next);
        assert!(meta.has_prev);

        let items: Vec<u32> = (1..=3).collect();
        let page = paginate(&items, usize::MAX, MAX_LIMIT);
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, 3);
    }
}
