//! # shelfmark-core
//!
//! Core types, traits, and abstractions for the shelfmark book tracker.
//!
//! This crate provides the domain model (books, statuses, statistics), the
//! wire-contract request types with their validation, and the repository
//! trait that the persistence layer implements. It performs no I/O.

pub mod error;
pub mod genres;
pub mod logging;
pub mod models;
pub mod stats;
pub mod temporal;
pub mod traits;
pub mod validate;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use stats::compute_statistics;
pub use traits::*;
pub use validate::{CreateBookBody, GenresInput, UpdateBookBody, ValidationIssue};
