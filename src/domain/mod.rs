//! Domain types for the study-material catalog.
//!
//! This module contains the core data structures:
//! - Material: A shared study resource with its comments and ratings
//! - Identity: Caller-supplied user snapshot
//! - Sample: The built-in starter catalog

pub mod identity;
pub mod material;
pub mod sample;

// Re-export commonly used types
pub use identity::Identity;
pub use material::{
    AverageRating, Comment, FileRef, Material, MaterialId, NewMaterial, Rating, ALL_SUBJECTS,
    DEFAULT_CATEGORY, MAX_SCORE, MIN_SCORE, SUBJECTS,
};
pub use sample::sample_catalog;
