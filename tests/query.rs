//! Query Pipeline Integration Tests
//!
//! Tests for text search, subject filtering, every sort order, tie
//! stability and purity.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use studyhub::core::{bookmarked, query, BookmarkSet, MaterialQuery, SortKey, SubjectFilter};
use studyhub::domain::{sample_catalog, AverageRating, Comment, Identity, Material, MaterialId, Rating};
use studyhub::storage::MemoryKeyValueStore;

fn material(id: &str, title: &str, subject: &str) -> Material {
    Material {
        id: MaterialId::new(id),
        title: title.to_string(),
        subject: subject.to_string(),
        category: "General".to_string(),
        description: format!("About {}", title),
        file_url: "#".to_string(),
        file_name: format!("{}.pdf", id),
        uploaded_by: Identity::new("u", "Uploader"),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        views: 0,
        downloads: 0,
        comments: Vec::new(),
        ratings: Vec::new(),
        average_rating: AverageRating::Unrated,
    }
}

fn rated(mut m: Material, scores: &[u8]) -> Material {
    m.ratings = scores
        .iter()
        .enumerate()
        .map(|(i, s)| Rating {
            user_id: format!("r{}", i),
            rating: *s,
        })
        .collect();
    m.average_rating = AverageRating::from_ratings(&m.ratings);
    m
}

fn ids(results: &[&Material]) -> Vec<String> {
    results.iter().map(|m| m.id.to_string()).collect()
}

#[test]
fn test_search_scenario() {
    let mut m1 = material("m1", "Organic Chemistry", "Chemistry");
    let mut m2 = material("m2", "Calculus Workbook", "Mathematics");
    m1.created_at = Utc::now();
    m2.created_at = m1.created_at - Duration::days(1);
    let materials = vec![m1, m2];

    let results = query(&materials, "calc", "All Subjects", "Newest Upload");
    assert_eq!(ids(&results), vec!["m2"]);
}

#[test]
fn test_search_is_case_insensitive_over_title_and_description() {
    let mut notes = material("1", "Week 3 notes", "Physics");
    notes.description = "Covers THERMODYNAMICS basics".to_string();
    let materials = vec![notes, material("2", "Thermodynamics Review", "Physics")];

    let results = query(&materials, "thermo", "All Subjects", "All");
    assert_eq!(ids(&results), vec!["1", "2"]);

    let results = query(&materials, "", "All Subjects", "All");
    assert_eq!(results.len(), 2);

    let results = query(&materials, "quantum", "All Subjects", "All");
    assert!(results.is_empty());
}

#[test]
fn test_subject_filter() {
    let materials = sample_catalog();

    let results = query(&materials, "", "Mathematics", "All");
    assert_eq!(ids(&results), vec!["2"]);

    let results = query(&materials, "", "Astronomy", "All");
    assert!(results.is_empty());

    // Exact match only
    let results = query(&materials, "", "mathematics", "All");
    assert!(results.is_empty());
}

#[test]
fn test_highest_rated_puts_unrated_last() {
    let materials = vec![
        material("unrated", "A", "Physics"),
        rated(material("low", "B", "Physics"), &[1, 2]),
        rated(material("high", "C", "Physics"), &[5, 4]),
    ];

    let results = query(&materials, "", "All Subjects", "Highest Rated");
    assert_eq!(ids(&results), vec!["high", "low", "unrated"]);
}

#[test]
fn test_newest_upload() {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut old = material("old", "A", "History");
    old.created_at = base - Duration::days(30);
    let mut new = material("new", "B", "History");
    new.created_at = base;
    let mut mid = material("mid", "C", "History");
    mid.created_at = base - Duration::days(2);

    let materials = vec![old, new, mid];
    let results = query(&materials, "", "All Subjects", "Newest Upload");
    assert_eq!(ids(&results), vec!["new", "mid", "old"]);
}

#[test]
fn test_most_comments_and_most_downloaded() {
    let who = Identity::new("u", "U");
    let mut a = material("a", "A", "Biology");
    a.comments = vec![Comment::new("one", who.clone())];
    a.downloads = 50;
    let mut b = material("b", "B", "Biology");
    b.comments = vec![Comment::new("one", who.clone()), Comment::new("two", who)];
    b.downloads = 5;
    let c = material("c", "C", "Biology");

    let materials = vec![c, a, b];

    let results = query(&materials, "", "All Subjects", "Most Comments");
    assert_eq!(ids(&results), vec!["b", "a", "c"]);

    let results = query(&materials, "", "All Subjects", "Most Downloaded");
    assert_eq!(ids(&results), vec!["a", "b", "c"]);
}

#[test]
fn test_ties_keep_input_order() {
    let materials = vec![
        rated(material("x", "X", "Economics"), &[4]),
        rated(material("y", "Y", "Economics"), &[3, 5]),
        rated(material("z", "Z", "Economics"), &[4]),
    ];

    let results = query(&materials, "", "All Subjects", "Highest Rated");
    assert_eq!(ids(&results), vec!["x", "y", "z"]);

    // Same timestamps everywhere
    let results = query(&materials, "", "All Subjects", "Newest Upload");
    assert_eq!(ids(&results), vec!["x", "y", "z"]);
}

#[test]
fn test_unknown_sort_preserves_order() {
    let materials = sample_catalog();

    for key in [
        "All",
        "Alphabetical",
        "",
        "highest_rated",
        "newest",
        "MOST-DOWNLOADED",
        "most comments!",
    ] {
        let results = query(&materials, "", "All Subjects", key);
        assert_eq!(ids(&results), vec!["1", "2", "3"], "sort key {key:?}");
    }
}

#[test]
fn test_query_is_pure() {
    let materials = sample_catalog();
    let snapshot = materials.clone();

    let first = ids(&query(&materials, "guide", "All Subjects", "Most Downloaded"));
    let second = ids(&query(&materials, "guide", "All Subjects", "Most Downloaded"));

    assert_eq!(first, second);
    assert_eq!(first, vec!["3", "1"]);
    assert_eq!(materials, snapshot);
}

#[test]
fn test_material_query_builder() {
    let materials = sample_catalog();
    let q = MaterialQuery::new()
        .search("NOTES")
        .subject(SubjectFilter::Only("Mathematics".to_string()))
        .sort(SortKey::HighestRated);

    let results = q.apply(&materials);
    assert_eq!(ids(&results), vec!["2"]);
    assert!(q.matches(&materials[1]));
    assert!(!q.matches(&materials[0]));
}

#[test]
fn test_bookmarked_view_in_collection_order() {
    let materials = sample_catalog();
    let mut bookmarks = BookmarkSet::load_default(Arc::new(MemoryKeyValueStore::new()));
    bookmarks.toggle(&MaterialId::new("3")).unwrap();
    bookmarks.toggle(&MaterialId::new("1")).unwrap();
    bookmarks.toggle(&MaterialId::new("gone")).unwrap();

    let saved = bookmarked(&materials, &bookmarks);
    assert_eq!(ids(&saved), vec!["1", "3"]);
}
