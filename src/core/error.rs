//! Errors surfaced by the catalog stores.

use thiserror::Error;

use crate::domain::MaterialId;
use crate::storage::StorageError;

/// Malformed input, rejected before anything is changed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required field is empty: {0}")]
    MissingField(&'static str),

    #[error("An uploaded file is required")]
    MissingFile,

    #[error("Comment text is empty")]
    EmptyComment,

    #[error("Rating {0} is outside 1..=5")]
    RatingOutOfRange(i64),
}

/// Errors returned by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Material not found: {0}")]
    NotFound(MaterialId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
