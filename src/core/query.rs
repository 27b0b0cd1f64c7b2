//! Search, subject filter and sort over a material collection.
//!
//! Everything here is a pure function of its inputs: the collection is only
//! borrowed, never reordered in place, and running the same query twice
//! gives the same result.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::bookmarks::BookmarkSet;
use crate::domain::{Material, ALL_SUBJECTS};

/// Ordering applied after filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Keep collection order
    #[default]
    All,

    /// Highest average rating first (unrated counts as 0)
    HighestRated,

    /// Most recently created first
    NewestUpload,

    /// Most comments first
    MostComments,

    /// Most downloads first
    MostDownloaded,
}

impl SortKey {
    /// Every option, in menu order
    pub const OPTIONS: [SortKey; 5] = [
        SortKey::All,
        SortKey::HighestRated,
        SortKey::NewestUpload,
        SortKey::MostComments,
        SortKey::MostDownloaded,
    ];

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::All => "All",
            SortKey::HighestRated => "Highest Rated",
            SortKey::NewestUpload => "Newest Upload",
            SortKey::MostComments => "Most Comments",
            SortKey::MostDownloaded => "Most Downloaded",
        }
    }

    /// Look up a sort option by its exact display label.
    ///
    /// Anything other than one of the five labels means `All`.
    pub fn from_label(label: &str) -> Self {
        SortKey::OPTIONS
            .into_iter()
            .find(|key| key.label() == label)
            .unwrap_or_default()
    }

    fn compare(&self, a: &Material, b: &Material) -> Ordering {
        match self {
            SortKey::All => Ordering::Equal,
            SortKey::HighestRated => b
                .average_rating
                .sort_value()
                .total_cmp(&a.average_rating.sort_value()),
            SortKey::NewestUpload => b.created_at.cmp(&a.created_at),
            SortKey::MostComments => b.comments.len().cmp(&a.comments.len()),
            SortKey::MostDownloaded => b.downloads.cmp(&a.downloads),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for SortKey {
    fn from(label: &str) -> Self {
        SortKey::from_label(label)
    }
}

/// Which subject to keep
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectFilter {
    /// "All Subjects"
    #[default]
    Any,

    /// Exact subject match
    Only(String),
}

impl SubjectFilter {
    pub fn matches(&self, material: &Material) -> bool {
        match self {
            SubjectFilter::Any => true,
            SubjectFilter::Only(subject) => &material.subject == subject,
        }
    }
}

impl From<&str> for SubjectFilter {
    fn from(s: &str) -> Self {
        if s == ALL_SUBJECTS {
            SubjectFilter::Any
        } else {
            SubjectFilter::Only(s.to_string())
        }
    }
}

impl std::fmt::Display for SubjectFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectFilter::Any => f.write_str(ALL_SUBJECTS),
            SubjectFilter::Only(subject) => f.write_str(subject),
        }
    }
}

/// A reusable query: text search, then subject filter, then sort
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialQuery {
    /// Case-insensitive substring of title or description; empty matches all
    #[serde(default)]
    pub search: String,

    #[serde(default)]
    pub subject: SubjectFilter,

    #[serde(default)]
    pub sort: SortKey,
}

impl MaterialQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn subject(mut self, subject: impl Into<SubjectFilter>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Whether `material` passes both filters
    pub fn matches(&self, material: &Material) -> bool {
        self.matches_with(material, &self.search.to_lowercase())
    }

    /// Run the query. Ties keep their input order.
    pub fn apply<'a>(&self, materials: &'a [Material]) -> Vec<&'a Material> {
        let needle = self.search.to_lowercase();
        let mut results: Vec<&Material> = materials
            .iter()
            .filter(|m| self.matches_with(m, &needle))
            .collect();

        // sort_by is stable
        results.sort_by(|a, b| self.sort.compare(a, b));
        results
    }

    /// `needle` is the search term, already lower-cased
    fn matches_with(&self, material: &Material, needle: &str) -> bool {
        matches_search(material, needle) && self.subject.matches(material)
    }
}

fn matches_search(material: &Material, needle: &str) -> bool {
    needle.is_empty()
        || material.title.to_lowercase().contains(needle)
        || material.description.to_lowercase().contains(needle)
}

/// Filter and sort `materials` for display.
///
/// `subject` is a subject name or `"All Subjects"`; `sort` is one of the
/// exact labels in [`SortKey::OPTIONS`] such as `"Highest Rated"`. Any other
/// string, including near-misses like `"highest_rated"`, leaves the order
/// alone.
pub fn query<'a>(
    materials: &'a [Material],
    search: &str,
    subject: &str,
    sort: &str,
) -> Vec<&'a Material> {
    MaterialQuery::new()
        .search(search)
        .subject(subject)
        .sort(SortKey::from_label(sort))
        .apply(materials)
}

/// Bookmarked materials, in collection order
pub fn bookmarked<'a>(materials: &'a [Material], bookmarks: &BookmarkSet) -> Vec<&'a Material> {
    materials
        .iter()
        .filter(|m| bookmarks.is_bookmarked(&m.id))
        .collect()
}
