/// Shared listing primitives
///
/// Every collection endpoint (clients, projects, tasks, staff, activity)
/// uses the same pagination model:
///
/// - Pages are 1-based; page values below 1 are clamped to 1
/// - Each entity has its own default page size
/// - `totalPages` is the ceiling of the filtered count over the page size
/// - A page beyond the end returns an empty list with unchanged metadata
///
/// # Example
///
/// ```
/// use opsdesk_shared::listing::{PageMeta, PageRequest};
///
/// let page = PageRequest::new(Some(2), None, 6);
/// assert_eq!(page.offset(), 6);
///
/// let meta = PageMeta::new(20, 13, &page);
/// assert_eq!(meta.total_pages, 3);
/// ```

use serde::Serialize;

/// A resolved pagination request
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// Page number, 1-based, always >= 1
    pub page: i64,

    /// Page size, always >= 1
    pub limit: i64,
}

impl PageRequest {
    /// Resolves raw query values against an entity's default page size
    ///
    /// Out-of-range values are clamped rather than rejected: page 0 or a
    /// negative page becomes page 1, and a non-positive limit falls back
    /// to the default.
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = match limit {
            Some(l) if l >= 1 => l,
            _ => default_limit,
        };

        Self { page, limit }
    }

    /// SQL OFFSET for this page
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Pagination metadata returned alongside every listing
///
/// `total` is the unfiltered collection size; `filtered` is the count
/// matching the active filters and is what `totalPages` is derived from.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Count of all records in the collection (ignoring filters)
    pub total: i64,

    /// Count of records matching the active filters
    pub filtered: i64,

    /// The page that was served (1-based)
    pub page: i64,

    /// Total number of pages at the current page size
    pub total_pages: i64,
}

impl PageMeta {
    /// Builds metadata from the counts and the request that produced them
    pub fn new(total: i64, filtered: i64, request: &PageRequest) -> Self {
        Self {
            total,
            filtered,
            page: request.page,
            total_pages: (filtered + request.limit - 1) / request.limit,
        }
    }
}

/// Builds a case-insensitive substring pattern for ILIKE matching
///
/// LIKE metacharacters in the user's search term are escaped so they match
/// literally.
pub fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = PageRequest::new(None, None, 6);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 6);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_clamped_to_one() {
        assert_eq!(PageRequest::new(Some(0), None, 6).page, 1);
        assert_eq!(PageRequest::new(Some(-5), None, 6).page, 1);
    }

    #[test]
    fn test_invalid_limit_falls_back_to_default() {
        assert_eq!(PageRequest::new(None, Some(0), 5).limit, 5);
        assert_eq!(PageRequest::new(None, Some(-1), 5).limit, 5);
        assert_eq!(PageRequest::new(None, Some(20), 5).limit, 20);
    }

    #[test]
    fn test_offset_math() {
        let page = PageRequest::new(Some(3), Some(10), 6);
        assert_eq!(page.offset(), 20);
    }

    #[test]
    fn test_total_pages_is_ceiling_of_filtered() {
        let page = PageRequest::new(Some(1), Some(6), 6);
        assert_eq!(PageMeta::new(100, 0, &page).total_pages, 0);
        assert_eq!(PageMeta::new(100, 1, &page).total_pages, 1);
        assert_eq!(PageMeta::new(100, 6, &page).total_pages, 1);
        assert_eq!(PageMeta::new(100, 7, &page).total_pages, 2);
        assert_eq!(PageMeta::new(100, 13, &page).total_pages, 3);
    }

    #[test]
    fn test_beyond_end_page_keeps_metadata() {
        // Page 99 of 13 records still reports the true counts
        let page = PageRequest::new(Some(99), Some(6), 6);
        let meta = PageMeta::new(20, 13, &page);
        assert_eq!(meta.page, 99);
        assert_eq!(meta.total, 20);
        assert_eq!(meta.filtered, 13);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("acme"), "%acme%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }
}
