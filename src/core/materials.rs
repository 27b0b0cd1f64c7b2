//! The canonical material collection and every mutation on it.
//!
//! The store is single-writer: all mutations take `&mut self`, validate
//! first and then apply in one step, so a reader never sees a half-applied
//! change and a rejected call leaves the collection untouched. Each
//! successful mutation bumps a revision counter that subscribers can watch.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, instrument};

use super::bookmarks::BookmarkSet;
use super::error::{StoreError, ValidationError};
use crate::domain::{Comment, FileRef, Identity, Material, MaterialId, NewMaterial, MAX_SCORE, MIN_SCORE};

/// Owner of all materials, newest first
pub struct MaterialsStore {
    materials: Vec<Material>,

    /// Cooperative delay standing in for a network round-trip
    latency: Duration,

    changes: watch::Sender<u64>,
}

impl Default for MaterialsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialsStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            materials: Vec::new(),
            latency: Duration::ZERO,
            changes,
        }
    }

    /// Seed the store with existing records, kept in the given order.
    ///
    /// Average ratings are recomputed from each record's ratings. A record
    /// whose id repeats an earlier one is dropped.
    pub fn with_materials(materials: Vec<Material>) -> Self {
        let mut store = Self::new();
        for mut material in materials {
            if store.position(&material.id).is_some() {
                debug!(material_id = %material.id, "Skipping duplicate seed material");
                continue;
            }
            material.recompute_average();
            store.materials.push(material);
        }
        store
    }

    /// Delay applied by `create`, `delete` and `add_comment`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// All materials in collection order (newest first)
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn get(&self, id: &MaterialId) -> Option<&Material> {
        self.materials.iter().find(|m| &m.id == id)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Subscribe to change notifications (the value is a revision counter)
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Number of successful mutations so far
    pub fn revision(&self) -> u64 {
        *self.changes.borrow()
    }

    /// Upload a new material; it becomes the first in the collection
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&mut self, input: NewMaterial) -> Result<Material, StoreError> {
        let file = validate_upload(&input)?;
        self.simulate_latency().await;

        let material = Material::from_upload(input, file);
        self.materials.insert(0, material.clone());
        self.notify();

        info!(material_id = %material.id, uploader = %material.uploaded_by.id, "Material uploaded");
        Ok(material)
    }

    /// Remove a material and drop it from `bookmarks`.
    ///
    /// The bookmark write happens first; if it fails the material stays.
    #[instrument(skip(self, bookmarks))]
    pub async fn delete(
        &mut self,
        id: &MaterialId,
        bookmarks: &mut BookmarkSet,
    ) -> Result<Material, StoreError> {
        self.require(id)?;
        self.simulate_latency().await;

        let pos = self.require(id)?;
        bookmarks.remove_if_present(id)?;
        let removed = self.materials.remove(pos);
        self.notify();

        info!(material_id = %id, "Material deleted");
        Ok(removed)
    }

    /// Add a comment to the front of a material's comment list
    #[instrument(skip(self, text, author), fields(user_id = %author.id))]
    pub async fn add_comment(
        &mut self,
        id: &MaterialId,
        text: &str,
        author: &Identity,
    ) -> Result<Comment, StoreError> {
        self.require(id)?;
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyComment.into());
        }
        self.simulate_latency().await;

        let pos = self.require(id)?;
        let comment = Comment::new(text, author.clone());
        self.materials[pos].comments.insert(0, comment.clone());
        self.notify();

        info!(material_id = %id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    /// Record `user_id`'s score, replacing any earlier one, and return the
    /// new average
    #[instrument(skip(self))]
    pub fn rate(
        &mut self,
        id: &MaterialId,
        score: i64,
        user_id: &str,
    ) -> Result<f64, StoreError> {
        let pos = self.require(id)?;
        let score = validate_score(score)?;

        let material = &mut self.materials[pos];
        material.upsert_rating(user_id, score);
        let average = material.average_rating.sort_value();
        self.notify();

        info!(material_id = %id, score, average, "Rating submitted");
        Ok(average)
    }

    /// Count one detail view. Returns the new total.
    ///
    /// Callers decide what counts as a visit; every call increments.
    pub fn increment_views(&mut self, id: &MaterialId) -> Result<u64, StoreError> {
        let pos = self.require(id)?;
        let material = &mut self.materials[pos];
        material.views += 1;
        let views = material.views;
        self.notify();

        debug!(material_id = %id, views, "View counted");
        Ok(views)
    }

    /// Count one download. Returns the new total.
    pub fn increment_downloads(&mut self, id: &MaterialId) -> Result<u64, StoreError> {
        let pos = self.require(id)?;
        let material = &mut self.materials[pos];
        material.downloads += 1;
        let downloads = material.downloads;
        self.notify();

        info!(material_id = %id, downloads, "Downloading");
        Ok(downloads)
    }

    /// Materials uploaded by `user_id`, in collection order
    pub fn by_uploader(&self, user_id: &str) -> Vec<&Material> {
        self.materials
            .iter()
            .filter(|m| m.is_owned_by(user_id))
            .collect()
    }

    fn position(&self, id: &MaterialId) -> Option<usize> {
        self.materials.iter().position(|m| &m.id == id)
    }

    fn require(&self, id: &MaterialId) -> Result<usize, StoreError> {
        self.position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn notify(&self) {
        self.changes.send_modify(|rev| *rev += 1);
    }
}

impl std::fmt::Debug for MaterialsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialsStore")
            .field("materials", &self.materials.len())
            .field("latency", &self.latency)
            .field("revision", &self.revision())
            .finish()
    }
}

/// Check an upload and pull out its file reference
fn validate_upload(input: &NewMaterial) -> Result<FileRef, ValidationError> {
    let required = [
        ("title", &input.title),
        ("subject", &input.subject),
        ("description", &input.description),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }

    match &input.file {
        Some(file) if !file.name.trim().is_empty() && !file.url.trim().is_empty() => {
            Ok(file.clone())
        }
        _ => Err(ValidationError::MissingFile),
    }
}

fn validate_score(score: i64) -> Result<u8, ValidationError> {
    if (i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)).contains(&score) {
        Ok(score as u8)
    } else {
        Err(ValidationError::RatingOutOfRange(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AverageRating;

    fn upload(title: &str) -> NewMaterial {
        NewMaterial::new(
            title,
            "Mathematics",
            "Worked examples",
            Identity::new("u1", "Ada"),
        )
        .with_file(FileRef::new("notes.pdf", "file:///notes.pdf"))
    }

    #[test]
    fn test_validate_upload_requires_fields() {
        let mut input = upload("Calculus");
        input.title = "   ".to_string();
        assert_eq!(
            validate_upload(&input),
            Err(ValidationError::MissingField("title"))
        );

        let mut input = upload("Calculus");
        input.description.clear();
        assert_eq!(
            validate_upload(&input),
            Err(ValidationError::MissingField("description"))
        );

        let mut input = upload("Calculus");
        input.file = None;
        assert_eq!(validate_upload(&input), Err(ValidationError::MissingFile));

        let mut input = upload("Calculus");
        input.file = Some(FileRef::new("", "#"));
        assert_eq!(validate_upload(&input), Err(ValidationError::MissingFile));
    }

    #[test]
    fn test_validate_score_bounds() {
        assert_eq!(validate_score(1), Ok(1));
        assert_eq!(validate_score(5), Ok(5));
        assert_eq!(validate_score(0), Err(ValidationError::RatingOutOfRange(0)));
        assert_eq!(validate_score(6), Err(ValidationError::RatingOutOfRange(6)));
        assert_eq!(
            validate_score(-3),
            Err(ValidationError::RatingOutOfRange(-3))
        );
    }

    #[tokio::test]
    async fn test_create_prepends() {
        let mut store = MaterialsStore::new();
        let first = store.create(upload("First")).await.unwrap();
        let second = store.create(upload("Second")).await.unwrap();

        assert_eq!(store.materials()[0].id, second.id);
        assert_eq!(store.materials()[1].id, first.id);
        assert_eq!(store.revision(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_without_writing() {
        let mut store = MaterialsStore::new();
        let mut input = upload("No file");
        input.file = None;

        let err = store.create(input).await.unwrap_err();
        assert!(err.is_validation());
        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_with_materials_recomputes_and_dedupes() {
        let mut a = Material::from_upload(upload("A"), FileRef::new("a.pdf", "#"));
        a.upsert_rating("x", 2);
        a.average_rating = AverageRating::Score(5.0); // stale on purpose
        let mut dup = a.clone();
        dup.title = "Duplicate".to_string();

        let store = MaterialsStore::with_materials(vec![a, dup]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.materials()[0].title, "A");
        assert_eq!(store.materials()[0].average_rating, AverageRating::Score(2.0));
    }

    #[test]
    fn test_rate_rejects_before_lookup_side_effects() {
        let mut store = MaterialsStore::with_materials(crate::domain::sample_catalog());
        let id = MaterialId::new("2");
        let before = store.get(&id).unwrap().clone();

        assert!(store.rate(&id, 9, "u9").unwrap_err().is_validation());
        assert_eq!(store.get(&id).unwrap(), &before);
        assert_eq!(store.revision(), 0);
    }
}
