//! Pagination engine shared by every list endpoint.
//!
//! Raw query parameters are coerced, never rejected: non-numeric values fall
//! back to the defaults, `page` is floored at 1 and `limit` is clamped into
//! `[1, 100]`. The computed metadata is serialized with the camelCase names
//! the HTTP contract promises.

use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Validated `{page, limit, offset}` triple derived from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
    pub offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_LIMIT);
        Self {
            page,
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }

    /// Parse raw query values. Missing and non-numeric values coerce to the
    /// defaults; numeric values are floored at 1 (page) or clamped into
    /// [1, 100] (limit).
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_integer(page).unwrap_or(DEFAULT_PAGE as i64);
        let limit = parse_integer(limit).unwrap_or(DEFAULT_LIMIT as i64);
        Self::new(page.max(1) as u64, limit.clamp(1, MAX_LIMIT as i64) as u64)
    }
}

fn parse_integer(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub next_page: Option<u64>,
    pub previous_page: Option<u64>,
    pub start_item: u64,
    pub end_item: u64,
}

impl PaginationMeta {
    /// `total_items = 0` intentionally yields `total_pages = 0`,
    /// `start_item = 1` and `end_item = 0`; clients rely on that shape.
    pub fn calculate(page: u64, limit: u64, total_items: u64) -> Self {
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = total_items.div_ceil(limit);
        let has_next_page = page < total_pages;
        let has_previous_page = page > 1;
        Self {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: limit,
            has_next_page,
            has_previous_page,
            next_page: has_next_page.then(|| page + 1),
            previous_page: has_previous_page.then(|| page - 1),
            start_item: (page - 1).saturating_mul(limit).saturating_add(1),
            end_item: page.saturating_mul(limit).min(total_items),
        }
    }
}

/// Wrap a page of items and its metadata into the `{<key>: [...], pagination}`
/// envelope. Pure structural formatting, no side effects.
pub fn paginated_envelope<T: Serialize>(
    key: &str,
    items: &[T],
    pagination: &PaginationMeta,
) -> Result<serde_json::Value, serde_json::Error> {
    let mut body = serde_json::Map::with_capacity(2);
    body.insert(key.to_string(), serde_json::to_value(items)?);
    body.insert("pagination".to_string(), serde_json::to_value(pagination)?);
    Ok(serde_json::Value::Object(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_params_coerce_instead_of_failing() {
        assert_eq!(
            PageRequest::from_raw(None, None),
            PageRequest {
                page: 1,
                limit: 10,
                offset: 0
            }
        );
        assert_eq!(PageRequest::from_raw(Some("abc"), Some("xyz")).limit, 10);
        assert_eq!(PageRequest::from_raw(Some("3"), Some("25")).offset, 50);
        assert_eq!(PageRequest::from_raw(Some("1"), Some("5000")).limit, 100);
    }

    #[test]
    fn numeric_limits_below_one_clamp_to_one() {
        // Negative and zero limits are numbers, so they clamp rather than
        // fall back to the default.
        assert_eq!(PageRequest::from_raw(Some("1"), Some("-3")).limit, 1);
        assert_eq!(PageRequest::from_raw(Some("0"), Some("0")).limit, 1);
        assert_eq!(PageRequest::from_raw(Some("-2"), Some("-3")).page, 1);
    }

    #[test]
    fn huge_page_numbers_saturate_instead_of_overflowing() {
        let request = PageRequest::from_raw(Some("9223372036854775807"), Some("100"));
        assert_eq!(request.limit, 100);
        assert_eq!(request.offset, u64::MAX);

        let meta = PaginationMeta::calculate(request.page, request.limit, 48);
        assert_eq!(meta.end_item, 48);
        assert!(!meta.has_next_page);
    }

    #[test]
    fn empty_result_set_boundary() {
        let meta = PaginationMeta::calculate(1, 10, 0);
        assert_eq!(meta.total_pages, 0);
        assert_eq!(meta.start_item, 1);
        assert_eq!(meta.end_item, 0);
        assert!(!meta.has_next_page);
        assert!(!meta.has_previous_page);
        assert_eq!(meta.next_page, None);
        assert_eq!(meta.previous_page, None);
    }

    #[test]
    fn forty_eight_items_in_pages_of_ten() {
        let first = PaginationMeta::calculate(1, 10, 48);
        assert_eq!(first.total_pages, 5);
        assert_eq!(first.start_item, 1);
        assert_eq!(first.end_item, 10);
        assert!(first.has_next_page);
        assert_eq!(first.next_page, Some(2));

        let last = PaginationMeta::calculate(5, 10, 48);
        assert_eq!(last.start_item, 41);
        assert_eq!(last.end_item, 48);
        assert!(!last.has_next_page);
        assert_eq!(last.next_page, None);
        assert_eq!(last.previous_page, Some(4));
    }

    #[test]
    fn envelope_uses_the_given_key() {
        let meta = PaginationMeta::calculate(1, 10, 2);
        let body = paginated_envelope("products", &["a", "b"], &meta).unwrap();
        assert_eq!(body["products"].as_array().unwrap().len(), 2);
        assert_eq!(body["pagination"]["currentPage"], 1);
        assert_eq!(body["pagination"]["itemsPerPage"], 10);
    }
}
