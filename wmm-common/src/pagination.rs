//! Pagination utilities
//!
//! The catalog page size is a runtime setting (`catalog_page_size`), so it
//! is passed in rather than fixed.

/// Page size used when the setting is missing or invalid
pub const DEFAULT_PAGE_SIZE: i64 = 15;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub page_size: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Calculate pagination metadata from total results and requested page
///
/// The page is clamped to `[1, total_pages]`. A non-positive page size
/// falls back to [`DEFAULT_PAGE_SIZE`].
///
/// # Examples
/// ```
/// use wmm_common::pagination::calculate_pagination;
///
/// // 40 songs at 15 per page = 3 pages (15 + 15 + 10)
/// let p = calculate_pagination(40, 2, 15);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 15);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(40, 99, 15);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 30);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64, page_size: i64) -> Pagination {
    let page_size = if page_size > 0 { page_size } else { DEFAULT_PAGE_SIZE };
    let total_pages = (total_results.max(0) + page_size - 1) / page_size;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        page_size,
        total_pages,
        offset,
    }
}
