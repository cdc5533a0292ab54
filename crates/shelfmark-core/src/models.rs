//! Core data models for shelfmark.
//!
//! These types are shared across all shelfmark crates and represent the
//! domain entities as they appear on the wire (camelCase JSON). The
//! persisted-record shape is a separate declaration owned by the database
//! layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// BOOK TYPES
// =============================================================================

/// Reading-progress state of a book.
///
/// Transitions are unconstrained: any value may change to any other at any
/// time. No state machine is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    /// On the shelf, not started yet.
    #[default]
    Planned,
    /// Currently being read.
    Reading,
    /// Finished.
    Completed,
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planned => write!(f, "planned"),
            Self::Reading => write!(f, "reading"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "reading" => Ok(Self::Reading),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

/// A tracked book as returned by the API.
///
/// `genres` is always a decoded list here; the serialized text form only
/// exists at the storage boundary. `startedDate`, `completedDate`, and
/// `publishedDate` are free-form strings by contract and are not validated
/// against `status`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub status: BookStatus,
    pub rating: Option<i64>,
    pub notes: Option<String>,
    /// May hold a data-URL-encoded cover image.
    pub image_url: Option<String>,
    /// Total page count of the book.
    pub pages: Option<i64>,
    /// Reading progress in pages.
    pub current_page: Option<i64>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub isbn: Option<String>,
    pub genres: Vec<String>,
    pub started_date: Option<String>,
    pub completed_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

// =============================================================================
// STATISTICS TYPES
// =============================================================================

/// Per-status book counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BooksByStatus {
    pub planned: i64,
    pub reading: i64,
    pub completed: i64,
}

/// One genre label with its occurrence count across the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GenreCount {
    pub genre: String,
    pub count: i64,
}

/// Completed-book count for one calendar month of the trailing trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MonthlyTrendPoint {
    /// English short month name ("Jan" … "Dec").
    pub month: String,
    pub completed: i64,
}

/// The aggregate snapshot returned by `GET /api/statistics`.
///
/// Always freshly derived from the full collection; never cached or
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStatistics {
    pub total_books: i64,
    pub books_by_status: BooksByStatus,
    pub total_pages_read: i64,
    /// Mean rating of completed books with a positive rating, rounded to
    /// one decimal; 0 when no book qualifies.
    pub average_rating: f64,
    /// At most five entries, ordered by descending count; ties keep
    /// first-encounter order.
    pub top_genres: Vec<GenreCount>,
    /// Exactly six entries, oldest month first, ending at the current month.
    pub monthly_trend: Vec<MonthlyTrendPoint>,
    pub this_month_completed: i64,
    pub this_year_completed: i64,
}
