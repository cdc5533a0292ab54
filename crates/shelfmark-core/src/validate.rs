//! Wire-contract request bodies and their validation.
//!
//! The JSON bodies accepted by the API are declared here, separately from
//! the persisted-record shape: validation runs against these declarations
//! at the request boundary and malformed bodies never reach persistence.
//! Validation produces an itemized issue list (one entry per failed
//! field), not a single message.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::BookStatus;
use crate::traits::{CreateBookRequest, UpdateBookRequest};

/// One failed constraint in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ValidationIssue {
    /// Wire name of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Genres as accepted on the wire: either a single label or a list.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum GenresInput {
    One(String),
    Many(Vec<String>),
}

impl GenresInput {
    /// Normalize to the list form. A lone empty string means "no genres".
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(label) => {
                if label.is_empty() {
                    Vec::new()
                } else {
                    vec![label]
                }
            }
            Self::Many(labels) => labels,
        }
    }
}

/// Body of `POST /api/books`.
///
/// Every field is optional at the deserialization layer so that missing
/// required fields surface as validation issues rather than a body-level
/// parse failure.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookBody {
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<String>,
    pub rating: Option<i64>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub pages: Option<i64>,
    pub current_page: Option<i64>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub genres: Option<GenresInput>,
    pub isbn: Option<String>,
    pub started_date: Option<String>,
    pub completed_date: Option<String>,
}

impl CreateBookBody {
    /// Validate the body and produce the typed creation request.
    ///
    /// Issues accumulate across fields; the request is only built when
    /// every constraint holds.
    pub fn validate(self) -> std::result::Result<CreateBookRequest, Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        let title = match self.title {
            Some(t) if !t.is_empty() => Some(t),
            _ => {
                issues.push(ValidationIssue::new("title", "Title is required"));
                None
            }
        };
        let author = match self.author {
            Some(a) if !a.is_empty() => Some(a),
            _ => {
                issues.push(ValidationIssue::new("author", "Author is required"));
                None
            }
        };

        let status = match self.status.as_deref() {
            None => BookStatus::default(),
            Some(raw) => match BookStatus::from_str(raw) {
                Ok(s) => s,
                Err(_) => {
                    issues.push(ValidationIssue::new(
                        "status",
                        "Status must be one of: planned, reading, completed",
                    ));
                    BookStatus::default()
                }
            },
        };

        check_rating(self.rating, &mut issues);
        check_pages(self.pages, &mut issues);
        check_current_page(self.current_page, &mut issues);

        if !issues.is_empty() {
            return Err(issues);
        }

        Ok(CreateBookRequest {
            // Both are Some here: a missing value pushed an issue above.
            title: title.unwrap_or_default(),
            author: author.unwrap_or_default(),
            status,
            rating: self.rating,
            notes: self.notes,
            image_url: self.image_url,
            pages: self.pages,
            current_page: self.current_page,
            description: self.description,
            published_date: self.published_date,
            genres: self.genres.map(GenresInput::into_vec).unwrap_or_default(),
            isbn: self.isbn,
            started_date: self.started_date,
            completed_date: self.completed_date,
        })
    }
}

/// Body of `PUT /api/books/{id}`, the partial form of [`CreateBookBody`].
///
/// An omitted field leaves the stored value untouched. In particular an
/// omitted `genres` preserves the stored list, while `genres: []` clears
/// it.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookBody {
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<String>,
    pub rating: Option<i64>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub pages: Option<i64>,
    pub current_page: Option<i64>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub genres: Option<GenresInput>,
    pub isbn: Option<String>,
    pub started_date: Option<String>,
    pub completed_date: Option<String>,
}

impl UpdateBookBody {
    /// Validate the supplied fields and produce the typed patch.
    ///
    /// Constraints apply only to fields that are present; an empty body is
    /// a valid (no-op) patch.
    pub fn validate(self) -> std::result::Result<UpdateBookRequest, Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        if matches!(self.title.as_deref(), Some("")) {
            issues.push(ValidationIssue::new("title", "Title is required"));
        }
        if matches!(self.author.as_deref(), Some("")) {
            issues.push(ValidationIssue::new("author", "Author is required"));
        }

        let status = match self.status.as_deref() {
            None => None,
            Some(raw) => match BookStatus::from_str(raw) {
                Ok(s) => Some(s),
                Err(_) => {
                    issues.push(ValidationIssue::new(
                        "status",
                        "Status must be one of: planned, reading, completed",
                    ));
                    None
                }
            },
        };

        check_rating(self.rating, &mut issues);
        check_pages(self.pages, &mut issues);
        check_current_page(self.current_page, &mut issues);

        if !issues.is_empty() {
            return Err(issues);
        }

        Ok(UpdateBookRequest {
            title: self.title,
            author: self.author,
            status,
            rating: self.rating,
            notes: self.notes,
            image_url: self.image_url,
            pages: self.pages,
            current_page: self.current_page,
            description: self.description,
            published_date: self.published_date,
            genres: self.genres.map(GenresInput::into_vec),
            isbn: self.isbn,
            started_date: self.started_date,
            completed_date: self.completed_date,
        })
    }
}

fn check_rating(rating: Option<i64>, issues: &mut Vec<ValidationIssue>) {
    if let Some(r) = rating {
        if !(0..=5).contains(&r) {
            issues.push(ValidationIssue::new(
                "rating",
                "Rating must be between 0 and 5",
            ));
        }
    }
}

fn check_pages(pages: Option<i64>, issues: &mut Vec<ValidationIssue>) {
    if let Some(p) = pages {
        if p < 1 {
            issues.push(ValidationIssue::new(
                "pages",
                "Pages must be a positive integer",
            ));
        }
    }
}

fn check_current_page(current_page: Option<i64>, issues: &mut Vec<ValidationIssue>) {
    if let Some(p) = current_page {
        if p < 0 {
            issues.push(ValidationIssue::new(
                "currentPage",
                "Current page must be a non-negative integer",
            ));
        }
    }
}
