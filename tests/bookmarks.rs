//! Bookmark Persistence Integration Tests
//!
//! Tests for toggling, write-back to the file store, and recovery from
//! missing or corrupt bookmark data.

use std::sync::Arc;

use studyhub::core::BookmarkSet;
use studyhub::domain::MaterialId;
use studyhub::storage::{FileKeyValueStore, KeyValueStore};
use tempfile::TempDir;

fn open(temp: &TempDir) -> (BookmarkSet, FileKeyValueStore) {
    let storage = FileKeyValueStore::new(temp.path().join("storage"));
    (BookmarkSet::load_default(Arc::new(storage.clone())), storage)
}

#[test]
fn test_toggle_scenario_is_persisted_each_step() {
    let temp = TempDir::new().unwrap();
    let (mut bookmarks, storage) = open(&temp);
    let m1 = MaterialId::new("m1");

    assert!(bookmarks.is_empty());

    assert!(bookmarks.toggle(&m1).unwrap());
    assert!(bookmarks.is_bookmarked(&m1));
    assert_eq!(storage.get("bookmarks").unwrap().as_deref(), Some("[\"m1\"]"));

    assert!(!bookmarks.toggle(&m1).unwrap());
    assert!(!bookmarks.is_bookmarked(&m1));
    assert_eq!(storage.get("bookmarks").unwrap().as_deref(), Some("[]"));
}

#[test]
fn test_toggle_twice_restores_membership() {
    let temp = TempDir::new().unwrap();
    let (mut bookmarks, _) = open(&temp);
    let kept = MaterialId::new("1");
    let flipped = MaterialId::new("2");

    bookmarks.toggle(&kept).unwrap();
    let before = bookmarks.ids().to_vec();

    bookmarks.toggle(&flipped).unwrap();
    bookmarks.toggle(&flipped).unwrap();
    assert_eq!(bookmarks.ids(), before.as_slice());

    bookmarks.toggle(&kept).unwrap();
    bookmarks.toggle(&kept).unwrap();
    assert!(bookmarks.is_bookmarked(&kept));
}

#[test]
fn test_bookmarks_survive_restart() {
    let temp = TempDir::new().unwrap();
    {
        let (mut bookmarks, _) = open(&temp);
        bookmarks.toggle(&MaterialId::new("3")).unwrap();
        bookmarks.toggle(&MaterialId::new("1")).unwrap();
    }

    let (reloaded, _) = open(&temp);
    assert_eq!(
        reloaded.ids(),
        &[MaterialId::new("3"), MaterialId::new("1")]
    );
}

#[test]
fn test_corrupt_file_starts_empty_then_overwritten() {
    let temp = TempDir::new().unwrap();
    let storage_dir = temp.path().join("storage");
    std::fs::create_dir_all(&storage_dir).unwrap();
    std::fs::write(storage_dir.join("bookmarks.json"), "\u{0}garbage[").unwrap();

    let (mut bookmarks, storage) = open(&temp);
    assert!(bookmarks.is_empty());

    bookmarks.toggle(&MaterialId::new("2")).unwrap();
    assert_eq!(storage.get("bookmarks").unwrap().as_deref(), Some("[\"2\"]"));
}

#[test]
fn test_remove_if_present_writes_back() {
    let temp = TempDir::new().unwrap();
    let (mut bookmarks, storage) = open(&temp);
    bookmarks.toggle(&MaterialId::new("1")).unwrap();
    bookmarks.toggle(&MaterialId::new("2")).unwrap();

    assert!(bookmarks.remove_if_present(&MaterialId::new("1")).unwrap());
    assert!(!bookmarks.remove_if_present(&MaterialId::new("1")).unwrap());
    assert_eq!(storage.get("bookmarks").unwrap().as_deref(), Some("[\"2\"]"));
}

#[test]
fn test_custom_key() {
    let temp = TempDir::new().unwrap();
    let storage = FileKeyValueStore::new(temp.path());
    let mut bookmarks = BookmarkSet::load(Arc::new(storage.clone()), "jane-bookmarks");

    bookmarks.toggle(&MaterialId::new("1")).unwrap();

    assert_eq!(bookmarks.key(), "jane-bookmarks");
    assert!(temp.path().join("jane-bookmarks.json").exists());
    assert_eq!(storage.get("bookmarks").unwrap(), None);
}
