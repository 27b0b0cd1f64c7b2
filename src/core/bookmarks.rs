//! The local caller's bookmarks, mirrored to durable storage.
//!
//! The set is read once when constructed and written back in full after
//! every change. It is stored as a JSON array of material id strings under a
//! single key; there is no per-user key and no schema version.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::MaterialId;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key used when none is configured
pub const DEFAULT_BOOKMARKS_KEY: &str = "bookmarks";

/// Bookmarked material ids, in the order they were added
pub struct BookmarkSet {
    ids: Vec<MaterialId>,
    storage: Arc<dyn KeyValueStore>,
    key: String,
    changes: watch::Sender<u64>,
}

impl BookmarkSet {
    /// Load the set from `storage`.
    ///
    /// Never fails: a missing, unreadable or malformed value yields an empty
    /// set, which overwrites the bad value on the next change.
    pub fn load(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let ids = match storage.get(&key) {
            Ok(Some(raw)) => decode(&raw).unwrap_or_else(|e| {
                warn!(%key, error = %e, "Malformed bookmark data, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(%key, error = %e, "Failed to read bookmarks, starting empty");
                Vec::new()
            }
        };

        debug!(%key, count = ids.len(), "Loaded bookmarks");
        let (changes, _) = watch::channel(0);

        Self {
            ids,
            storage,
            key,
            changes,
        }
    }

    /// Load from `storage` under [`DEFAULT_BOOKMARKS_KEY`]
    pub fn load_default(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::load(storage, DEFAULT_BOOKMARKS_KEY)
    }

    pub fn is_bookmarked(&self, id: &MaterialId) -> bool {
        self.ids.contains(id)
    }

    /// Add `id` if absent, remove it if present.
    ///
    /// Returns whether `id` is bookmarked afterwards. The new set is written
    /// to storage before this returns; if that write fails the in-memory set
    /// is left as it was.
    pub fn toggle(&mut self, id: &MaterialId) -> Result<bool, StorageError> {
        let mut next = self.ids.clone();
        let bookmarked = if let Some(pos) = next.iter().position(|b| b == id) {
            next.remove(pos);
            false
        } else {
            next.push(id.clone());
            true
        };

        self.commit(next)?;

        if bookmarked {
            info!(material_id = %id, "Bookmarked");
        } else {
            info!(material_id = %id, "Bookmark removed");
        }

        Ok(bookmarked)
    }

    /// Remove `id` if present. Returns whether anything was removed.
    ///
    /// Absent ids cause no write.
    pub fn remove_if_present(&mut self, id: &MaterialId) -> Result<bool, StorageError> {
        let Some(pos) = self.ids.iter().position(|b| b == id) else {
            return Ok(false);
        };

        let mut next = self.ids.clone();
        next.remove(pos);
        self.commit(next)?;

        debug!(material_id = %id, "Dropped bookmark of removed material");
        Ok(true)
    }

    /// Bookmarked ids, oldest bookmark first
    pub fn ids(&self) -> &[MaterialId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Storage key this set is mirrored to
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Subscribe to change notifications (the value is a revision counter)
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Number of successful changes so far
    pub fn revision(&self) -> u64 {
        *self.changes.borrow()
    }

    /// Persist `next`, then make it current
    fn commit(&mut self, next: Vec<MaterialId>) -> Result<(), StorageError> {
        let raw = encode(&next)?;
        self.storage.set(&self.key, &raw)?;
        self.ids = next;
        self.changes.send_modify(|rev| *rev += 1);
        Ok(())
    }
}

impl std::fmt::Debug for BookmarkSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookmarkSet")
            .field("key", &self.key)
            .field("ids", &self.ids)
            .finish()
    }
}

fn encode(ids: &[MaterialId]) -> Result<String, StorageError> {
    let raw: Vec<&str> = ids.iter().map(MaterialId::as_str).collect();
    Ok(serde_json::to_string(&raw)?)
}

/// Parse the stored JSON array, dropping duplicate ids
fn decode(raw: &str) -> Result<Vec<MaterialId>, serde_json::Error> {
    let parsed: Vec<String> = serde_json::from_str(raw)?;
    let mut ids: Vec<MaterialId> = Vec::with_capacity(parsed.len());
    for id in parsed.into_iter().map(MaterialId::from) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
