//! Query parameter types for the book listing endpoint.
//!
//! Listing parameters arrive as free-form strings. Anything unusable (a
//! non-numeric page, an unknown status label, an empty search term) falls
//! back to its default instead of rejecting the request, so stale or
//! hand-edited URLs still return a sensible page.

use serde::Deserialize;

use shelfmark_core::{BookStatus, ListBooksRequest};

/// Page number applied when the parameter is missing or unusable.
const DEFAULT_PAGE: i64 = 1;

/// Page size applied when the parameter is missing or unusable.
const DEFAULT_LIMIT: i64 = 10;

/// Raw listing parameters exactly as they appear on the query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub genre: Option<String>,
}

impl ListBooksQuery {
    /// Convert into a typed listing request, applying the lenient defaults.
    pub fn into_request(self) -> ListBooksRequest {
        ListBooksRequest {
            page: parse_positive(self.page.as_deref(), DEFAULT_PAGE),
            limit: parse_positive(self.limit.as_deref(), DEFAULT_LIMIT),
            search: non_empty(self.search),
            status: self.status.and_then(|s| s.parse::<BookStatus>().ok()),
            genre: non_empty(self.genre),
        }
    }
}

/// Parse a 1-based positive integer, falling back to `default` when the
/// value is missing, non-numeric, or below 1.
fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

/// Treat an empty string the same as an absent parameter.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.is_empty())
}
