//! Repository trait and persistence-facing request types.
//!
//! These define the interface the storage layer must satisfy, keeping the
//! HTTP surface decoupled from the concrete store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Book, BookStatus};

// =============================================================================
// BOOK REPOSITORY TRAIT
// =============================================================================

/// Validated request for creating a book.
///
/// Produced by [`crate::validate::CreateBookBody::validate`]; constraints
/// (required title/author, rating bounds, status membership) already hold.
#[derive(Debug, Clone, Default)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub status: BookStatus,
    pub rating: Option<i64>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub pages: Option<i64>,
    pub current_page: Option<i64>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub genres: Vec<String>,
    pub isbn: Option<String>,
    pub started_date: Option<String>,
    pub completed_date: Option<String>,
}

/// Validated partial update. `None` fields are left untouched in storage;
/// `genres: Some(vec![])` clears the stored list.
#[derive(Debug, Clone, Default)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<BookStatus>,
    pub rating: Option<i64>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub pages: Option<i64>,
    pub current_page: Option<i64>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub genres: Option<Vec<String>>,
    pub isbn: Option<String>,
    pub started_date: Option<String>,
    pub completed_date: Option<String>,
}

impl UpdateBookRequest {
    /// True when no field is supplied (a no-op patch).
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.status.is_none()
            && self.rating.is_none()
            && self.notes.is_none()
            && self.image_url.is_none()
            && self.pages.is_none()
            && self.current_page.is_none()
            && self.description.is_none()
            && self.published_date.is_none()
            && self.genres.is_none()
            && self.isbn.is_none()
            && self.started_date.is_none()
            && self.completed_date.is_none()
    }
}

/// Request for listing books. Defaults come from the listing contract:
/// page 1, limit 10, no filters.
#[derive(Debug, Clone)]
pub struct ListBooksRequest {
    /// 1-based page number (>= 1).
    pub page: i64,
    /// Page size (>= 1).
    pub limit: i64,
    /// Substring match on title.
    pub search: Option<String>,
    /// Exact status match.
    pub status: Option<BookStatus>,
    /// Exact genre-element match against the decoded genre list.
    pub genre: Option<String>,
}

impl Default for ListBooksRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            status: None,
            genre: None,
        }
    }
}

impl ListBooksRequest {
    /// Row offset implied by page and limit.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Response for listing books, including total-count metadata computed
/// from a separate count query over the same filters.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListBooksResponse {
    pub books: Vec<Book>,
    /// Size of the full filtered set, not of this page.
    pub total_books: i64,
    /// `ceil(total_books / limit)`.
    pub total_pages: i64,
    pub current_page: i64,
}

/// Repository for book CRUD operations.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a new book, returning the stored record.
    async fn insert(&self, req: CreateBookRequest) -> Result<Book>;

    /// Fetch a book by ID.
    async fn fetch(&self, id: i64) -> Result<Book>;

    /// List books with filtering and pagination.
    async fn list(&self, req: ListBooksRequest) -> Result<ListBooksResponse>;

    /// Apply a partial update and return the updated record.
    async fn update(&self, id: i64, req: UpdateBookRequest) -> Result<Book>;

    /// Hard-delete a book. No recovery.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check whether a book exists.
    async fn exists(&self, id: i64) -> Result<bool>;

    /// Read the entire collection (statistics input).
    async fn all(&self) -> Result<Vec<Book>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_request_defaults() {
        let req = ListBooksRequest::default();
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 10);
        assert!(req.search.is_none());
        assert!(req.status.is_none());
        assert!(req.genre.is_none());
    }

    #[test]
    fn test_offset_from_page_and_limit() {
        let req = ListBooksRequest {
            page: 3,
            limit: 10,
            ..Default::default()
        };
        assert_eq!(req.offset(), 20);

        let first = ListBooksRequest::default();
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn test_empty_patch_detection() {
        assert!(UpdateBookRequest::default().is_empty());

        let patch = UpdateBookRequest {
            rating: Some(4),
            ..Default::default()
        };
        assert!(!patch.is_empty());

        let clears_genres = UpdateBookRequest {
            genres: Some(Vec::new()),
            ..Default::default()
        };
        assert!(!clears_genres.is_empty());
    }

    #[test]
    fn test_list_response_serializes_camel_case() {
        let resp = ListBooksResponse {
            books: Vec::new(),
            total_books: 25,
            total_pages: 3,
            current_page: 1,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"books\":[]"));
        assert!(json.contains("\"totalBooks\":25"));
        assert!(json.contains("\"totalPages\":3"));
        assert!(json.contains("\"currentPage\":1"));
    }
}
