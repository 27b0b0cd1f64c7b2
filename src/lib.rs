//! studyhub - Client-side store for a peer-shared study-material catalog
//!
//! Holds the uploaded materials with their threaded comments and per-user
//! ratings, the local caller's bookmarks, and the search/filter/sort
//! pipeline that turns the collection into the list a user sees.
//!
//! # Architecture
//!
//! - `MaterialsStore` owns the material collection and all its mutations
//! - `BookmarkSet` owns the caller's bookmarks and mirrors them to storage
//! - The query pipeline is a pure function read by presentation
//!
//! Stores are constructed explicitly and passed to whatever needs them;
//! caller identity is a parameter of every operation that records one.
//!
//! # Modules
//!
//! - `domain`: Data structures (Material, Comment, Rating, Identity)
//! - `core`: Stores, query pipeline and errors
//! - `storage`: Durable key-value backends
//! - `config`: Layered configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Search the catalog
//! studyhub browse --search calc --sort "Highest Rated"
//!
//! # Bookmark a material
//! studyhub bookmark 2
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod storage;

// Re-export main types at crate root for convenience
pub use self::core::{
    bookmarked, query, BookmarkSet, MaterialQuery, MaterialsStore, SortKey, StoreError,
    SubjectFilter, ValidationError,
};
pub use domain::{AverageRating, Comment, FileRef, Identity, Material, MaterialId, NewMaterial, Rating};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StorageError};
