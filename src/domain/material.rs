//! Study materials and the records nested under them.
//!
//! A [`Material`] owns its comments and ratings; they are destroyed with it.
//! The average rating is a materialized aggregate that is recomputed every
//! time the rating set changes, never derived at read time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::Identity;

/// Subject filter value that matches every material
pub const ALL_SUBJECTS: &str = "All Subjects";

/// Known subjects offered when uploading (not a closed set)
pub const SUBJECTS: &[&str] = &[
    "Computer Science",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "History",
    "Literature",
    "Economics",
];

/// Category assigned when an upload does not name one
pub const DEFAULT_CATEGORY: &str = "General";

/// Lowest accepted rating score
pub const MIN_SCORE: u8 = 1;

/// Highest accepted rating score
pub const MAX_SCORE: u8 = 5;

/// Material identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(String);

impl MaterialId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, never-reused identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MaterialId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MaterialId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque file locator. The store never looks at file bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Original file name
    pub name: String,

    /// Where the file can be fetched from
    pub url: String,
}

impl FileRef {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Upload request: every material field except the store-assigned ones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaterial {
    pub title: String,
    pub subject: String,

    /// Falls back to [`DEFAULT_CATEGORY`]
    #[serde(default)]
    pub category: Option<String>,

    pub description: String,

    /// Required; an upload without a file is rejected
    pub file: Option<FileRef>,

    pub uploaded_by: Identity,
}

impl NewMaterial {
    pub fn new(
        title: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
        uploaded_by: Identity,
    ) -> Self {
        Self {
            title: title.into(),
            subject: subject.into(),
            category: None,
            description: description.into(),
            file: None,
            uploaded_by,
        }
    }

    /// Attach the uploaded file
    pub fn with_file(mut self, file: FileRef) -> Self {
        self.file = Some(file);
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A comment on a material. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub user: Identity,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(text: impl Into<String>, user: Identity) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            user,
            created_at: Utc::now(),
        }
    }
}

/// A `(user, score)` pair; at most one per user per material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: String,

    /// Always within `MIN_SCORE..=MAX_SCORE`
    pub rating: u8,
}

/// Mean of a material's ratings, or the explicit "no rating yet" state.
///
/// `Unrated` is distinct from every numeric score, so a material with no
/// ratings is never confused with one rated zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AverageRating {
    #[default]
    Unrated,

    /// Full-precision mean
    Score(f64),
}

impl AverageRating {
    /// Compute the mean of the given ratings
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        if ratings.is_empty() {
            return Self::Unrated;
        }

        let sum: u32 = ratings.iter().map(|r| u32::from(r.rating)).sum();
        Self::Score(f64::from(sum) / ratings.len() as f64)
    }

    /// The mean, if any rating exists
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Unrated => None,
            Self::Score(v) => Some(*v),
        }
    }

    /// Value used when ordering by rating (unrated sorts as 0)
    pub fn sort_value(&self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    pub fn is_rated(&self) -> bool {
        matches!(self, Self::Score(_))
    }
}

impl std::fmt::Display for AverageRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unrated => write!(f, "-"),
            Self::Score(v) => write!(f, "{:.1}", v),
        }
    }
}

/// A shared study resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Unique identifier, assigned at creation and never reused
    pub id: MaterialId,

    pub title: String,
    pub subject: String,
    pub category: String,
    pub description: String,

    /// Opaque file locator
    pub file_url: String,
    pub file_name: String,

    /// Uploader snapshot, not a live reference
    pub uploaded_by: Identity,

    /// Creation time, immutable
    pub created_at: DateTime<Utc>,

    /// Detail-view counter (never decreases)
    pub views: u64,

    /// Download counter (never decreases)
    pub downloads: u64,

    /// Newest first
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// One entry per rater
    #[serde(default)]
    pub ratings: Vec<Rating>,

    /// Mean of `ratings`, kept in step on every rating change
    #[serde(default)]
    pub average_rating: AverageRating,
}

impl Material {
    /// Build a fresh material from an already-validated upload request
    pub(crate) fn from_upload(input: NewMaterial, file: FileRef) -> Self {
        Self {
            id: MaterialId::generate(),
            title: input.title,
            subject: input.subject,
            category: input
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            description: input.description,
            file_url: file.url,
            file_name: file.name,
            uploaded_by: input.uploaded_by,
            created_at: Utc::now(),
            views: 0,
            downloads: 0,
            comments: Vec::new(),
            ratings: Vec::new(),
            average_rating: AverageRating::Unrated,
        }
    }

    /// Insert or replace `user_id`'s rating and refresh the aggregate.
    ///
    /// The caller is responsible for range-checking `score`.
    pub(crate) fn upsert_rating(&mut self, user_id: &str, score: u8) {
        match self.ratings.iter_mut().find(|r| r.user_id == user_id) {
            Some(existing) => existing.rating = score,
            None => self.ratings.push(Rating {
                user_id: user_id.to_string(),
                rating: score,
            }),
        }
        self.recompute_average();
    }

    pub(crate) fn recompute_average(&mut self) {
        self.average_rating = AverageRating::from_ratings(&self.ratings);
    }

    /// The score `user_id` gave, if any
    pub fn rating_of(&self, user_id: &str) -> Option<u8> {
        self.ratings
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| r.rating)
    }

    /// Whether `user_id` uploaded this material
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.uploaded_by.id == user_id
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Human-readable rating line, e.g. `4.5 (2 ratings)`
    pub fn rating_summary(&self) -> String {
        match self.average_rating {
            AverageRating::Unrated => "No ratings yet".to_string(),
            rated => {
                let n = self.ratings.len();
                let noun = if n == 1 { "rating" } else { "ratings" };
                format!("{} ({} {})", rated, n, noun)
            }
        }
    }

    /// The file locator as a [`FileRef`]
    pub fn file(&self) -> FileRef {
        FileRef::new(&self.file_name, &self.file_url)
    }
}
