//! Error types for store operations.
//!
//! # Design
//! Both failure kinds are expected outcomes, not defects: `Validation` means
//! the caller sent unusable text, `NotFound` means the id does not exist.
//! The `Display` strings are the human-readable messages surfaced to API
//! clients, so they are worded for end users.

use thiserror::Error;

use crate::types::TodoId;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Reasons a todo text is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No text was supplied where one is required.
    #[error("Text is required and must be a string")]
    Missing,

    /// The text is empty or whitespace only.
    #[error("Text cannot be empty")]
    Empty,

    /// The trimmed text is longer than the allowed maximum.
    #[error("Text cannot exceed {max} characters")]
    TooLong { max: usize },
}

/// Errors returned by `TodoStore` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No todo with this id exists.
    #[error("Todo not found")]
    NotFound { id: TodoId },
}
