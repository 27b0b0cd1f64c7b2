//! Core catalog logic.
//!
//! This module contains:
//! - MaterialsStore: The material collection and its mutations
//! - BookmarkSet: The caller's bookmarks, mirrored to storage
//! - Query: The pure search/filter/sort pipeline
//! - Error: Validation and lookup failures

pub mod bookmarks;
pub mod error;
pub mod materials;
pub mod query;

// Re-export commonly used types
pub use bookmarks::{BookmarkSet, DEFAULT_BOOKMARKS_KEY};
pub use error::{StoreError, ValidationError};
pub use materials::MaterialsStore;
pub use query::{bookmarked, query, MaterialQuery, SortKey, SubjectFilter};
