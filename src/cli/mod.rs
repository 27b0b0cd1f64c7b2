//! Command-line interface for studyhub.
//!
//! Provides commands for browsing and searching the catalog, viewing,
//! rating and commenting on materials, uploading, and managing bookmarks.
//!
//! Materials live for the lifetime of one invocation (each run starts from
//! the sample catalog); bookmarks persist between runs.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::core::{bookmarked, BookmarkSet, MaterialQuery, MaterialsStore, SortKey, SubjectFilter};
use crate::domain::{sample_catalog, FileRef, Identity, Material, MaterialId, NewMaterial, ALL_SUBJECTS, SUBJECTS};
use crate::storage::{FileKeyValueStore, KeyValueStore};

/// studyhub - Peer-shared study material catalog
#[derive(Parser, Debug)]
#[command(name = "studyhub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search, filter and sort the catalog
    Browse {
        /// Text to look for in titles and descriptions
        #[arg(short, long, default_value = "")]
        search: String,

        /// Subject to show
        #[arg(long, default_value = ALL_SUBJECTS)]
        subject: String,

        /// Sort order ("Highest Rated", "Newest Upload", "Most Comments", "Most Downloaded")
        #[arg(long, default_value = "All")]
        sort: String,

        /// Maximum number of materials to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show details of a material (counts as a view)
    Show {
        /// Material ID
        material_id: String,
    },

    /// Download a material (counts as a download)
    Download {
        /// Material ID
        material_id: String,
    },

    /// Rate a material from 1 to 5
    Rate {
        /// Material ID
        material_id: String,

        /// Score (1-5)
        score: i64,
    },

    /// Comment on a material
    Comment {
        /// Material ID
        material_id: String,

        /// Comment text
        text: String,
    },

    /// Upload a new material
    Upload {
        #[arg(long)]
        title: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        description: String,

        /// File to share (only its name and location are recorded)
        #[arg(long)]
        file: PathBuf,

        /// Category (defaults to "General")
        #[arg(long)]
        category: Option<String>,
    },

    /// Delete a material you uploaded
    Delete {
        /// Material ID
        material_id: String,
    },

    /// List materials you uploaded
    Mine,

    /// Toggle a bookmark
    Bookmark {
        /// Material ID
        material_id: String,
    },

    /// List bookmarked materials
    Bookmarks,

    /// List known subjects and sort options
    Subjects,

    /// Show resolved configuration (debug)
    Config,
}

/// Stores and identity for one CLI invocation
pub struct Session {
    pub materials: MaterialsStore,
    pub bookmarks: BookmarkSet,
    pub identity: Identity,
}

impl Session {
    /// Build a session from configuration
    pub fn open(cfg: &ResolvedConfig) -> Self {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&cfg.storage_dir));

        Self {
            materials: MaterialsStore::with_materials(sample_catalog())
                .with_latency(cfg.store.latency()),
            bookmarks: BookmarkSet::load(storage, cfg.bookmarks_key.clone()),
            identity: cfg.identity.clone(),
        }
    }

    fn find(&self, material_id: &str) -> Result<&Material> {
        self.materials
            .get(&MaterialId::new(material_id))
            .ok_or_else(|| anyhow::anyhow!("Material not found: {}", material_id))
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::config()?;

        if matches!(self.command, Commands::Config) {
            return show_config(cfg);
        }

        let mut session = Session::open(cfg);

        match self.command {
            Commands::Browse {
                search,
                subject,
                sort,
                limit,
            } => browse(&session, &search, &subject, &sort, limit),
            Commands::Show { material_id } => show_material(&mut session, &material_id),
            Commands::Download { material_id } => download(&mut session, &material_id),
            Commands::Rate { material_id, score } => rate(&mut session, &material_id, score),
            Commands::Comment { material_id, text } => {
                comment(&mut session, &material_id, &text).await
            }
            Commands::Upload {
                title,
                subject,
                description,
                file,
                category,
            } => upload(&mut session, title, subject, description, file, category).await,
            Commands::Delete { material_id } => delete(&mut session, &material_id).await,
            Commands::Mine => list_mine(&session),
            Commands::Bookmark { material_id } => toggle_bookmark(&mut session, &material_id),
            Commands::Bookmarks => list_bookmarks(&session),
            Commands::Subjects => list_subjects(),
            Commands::Config => show_config(cfg),
        }
    }
}

/// Print materials as a table
fn print_table<'a>(materials: impl IntoIterator<Item = &'a Material>, bookmarks: &BookmarkSet) {
    println!(
        "{:<34} {:<40} {:<18} {:>6} {:>6}",
        "ID", "TITLE", "SUBJECT", "RATING", "DLS"
    );
    println!("{}", "-".repeat(108));

    for material in materials {
        let title = truncate(&material.title, 37);
        let marker = if bookmarks.is_bookmarked(&material.id) { "*" } else { " " };
        println!(
            "{:<34} {:<40} {:<18} {:>6} {:>6}",
            format!("{}{}", marker, material.id),
            title,
            truncate(&material.subject, 18),
            material.average_rating.to_string(),
            material.downloads
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

/// Search, filter and sort the catalog
fn browse(session: &Session, search: &str, subject: &str, sort: &str, limit: usize) -> Result<()> {
    let query = MaterialQuery::new()
        .search(search)
        .subject(SubjectFilter::from(subject))
        .sort(parse_sort(sort));
    let results = query.apply(session.materials.materials());

    if results.is_empty() {
        println!("No materials match.");
        return Ok(());
    }

    println!(
        "Subject: {} | Sort: {} | {} result(s)\n",
        query.subject,
        query.sort,
        results.len()
    );
    print_table(results.into_iter().take(limit), &session.bookmarks);

    Ok(())
}

/// Read a `--sort` value, accepting labels as well as kebab- or snake-case
/// names (`newest-upload`, `most_comments`). Unknown input means `All`.
fn parse_sort(s: &str) -> SortKey {
    let wanted = normalize_sort(s);
    SortKey::OPTIONS
        .into_iter()
        .find(|key| normalize_sort(key.label()) == wanted)
        .unwrap_or_default()
}

fn normalize_sort(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Show the details of a material
fn show_material(session: &mut Session, material_id: &str) -> Result<()> {
    let id = MaterialId::new(material_id);
    session
        .materials
        .increment_views(&id)
        .with_context(|| format!("Cannot open material {}", material_id))?;

    let material = session.find(material_id)?;
    let bookmarked = session.bookmarks.is_bookmarked(&material.id);

    println!("════════════════════════════════════════════════════════════");
    println!("  {}", material.title);
    println!("  ID: {}", material.id);
    println!("  Subject: {} / {}", material.subject, material.category);
    println!("  Uploaded by: {} on {}", material.uploaded_by.name, material.created_at.format("%Y-%m-%d"));
    println!("  File: {} ({})", material.file_name, material.file_url);
    println!("  Views: {}  Downloads: {}", material.views, material.downloads);
    println!("  Rating: {}", material.rating_summary());
    if let Some(score) = material.rating_of(&session.identity.id) {
        println!("  Your rating: {}", score);
    }
    if bookmarked {
        println!("  Bookmarked");
    }
    if material.is_owned_by(&session.identity.id) {
        println!("  You uploaded this material");
    }
    println!("════════════════════════════════════════════════════════════");
    println!("\n{}\n", material.description);

    if material.comments.is_empty() {
        println!("No comments yet.");
    } else {
        println!("Comments ({}):", material.comment_count());
        for comment in &material.comments {
            println!(
                "  [{}] {}: {}",
                comment.created_at.format("%Y-%m-%d %H:%M"),
                comment.user.name,
                comment.text
            );
        }
    }

    Ok(())
}

/// Count a download and print the file location
fn download(session: &mut Session, material_id: &str) -> Result<()> {
    let downloads = session
        .materials
        .increment_downloads(&MaterialId::new(material_id))?;
    let file = session.find(material_id)?.file();

    println!("{} -> {}", file.name, file.url);
    eprintln!("[{} downloads]", downloads);

    Ok(())
}

/// Rate a material as the configured user
fn rate(session: &mut Session, material_id: &str, score: i64) -> Result<()> {
    let user_id = session.identity.id.clone();
    session
        .materials
        .rate(&MaterialId::new(material_id), score, &user_id)?;

    let material = session.find(material_id)?;
    println!("Rated {} -> {}", material.title, material.rating_summary());

    Ok(())
}

/// Comment on a material as the configured user
async fn comment(session: &mut Session, material_id: &str, text: &str) -> Result<()> {
    let identity = session.identity.clone();
    let comment = session
        .materials
        .add_comment(&MaterialId::new(material_id), text, &identity)
        .await?;

    println!("Comment {} added by {}", comment.id, comment.user.name);

    Ok(())
}

/// Upload a new material as the configured user
async fn upload(
    session: &mut Session,
    title: String,
    subject: String,
    description: String,
    file: PathBuf,
    category: Option<String>,
) -> Result<()> {
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_ref = FileRef::new(file_name, format!("file://{}", file.display()));

    let mut input = NewMaterial::new(title, subject, description, session.identity.clone())
        .with_file(file_ref);
    input.category = category;

    let material = session.materials.create(input).await?;

    eprintln!("\n✅ Material uploaded");
    eprintln!("   ID: {}", material.id);
    eprintln!("   Title: {}", material.title);
    eprintln!("   Category: {}", material.category);

    Ok(())
}

/// Delete a material owned by the configured user
async fn delete(session: &mut Session, material_id: &str) -> Result<()> {
    let material = session.find(material_id)?;
    if !material.is_owned_by(&session.identity.id) {
        anyhow::bail!(
            "Material {} belongs to {}; only the uploader can delete it",
            material_id,
            material.uploaded_by.name
        );
    }

    let Session {
        materials,
        bookmarks,
        ..
    } = session;
    let removed = materials
        .delete(&MaterialId::new(material_id), bookmarks)
        .await?;

    println!("Deleted: {}", removed.title);

    Ok(())
}

/// List materials uploaded by the configured user
fn list_mine(session: &Session) -> Result<()> {
    let mine = session.materials.by_uploader(&session.identity.id);

    if mine.is_empty() {
        println!("You have not uploaded any materials. Use 'studyhub upload' to share one.");
        return Ok(());
    }

    let total = mine.len();
    print_table(mine, &session.bookmarks);
    println!("\nTotal: {} materials", total);

    Ok(())
}

/// Toggle a bookmark
fn toggle_bookmark(session: &mut Session, material_id: &str) -> Result<()> {
    let id = session.find(material_id)?.id.clone();
    let bookmarked = session
        .bookmarks
        .toggle(&id)
        .context("Failed to save bookmarks")?;

    if bookmarked {
        println!("Bookmarked {}", id);
    } else {
        println!("Removed bookmark {}", id);
    }

    Ok(())
}

/// List bookmarked materials
fn list_bookmarks(session: &Session) -> Result<()> {
    let saved = bookmarked(session.materials.materials(), &session.bookmarks);

    if saved.is_empty() {
        println!("No bookmarks yet. Use 'studyhub bookmark <id>' to save a material.");
        return Ok(());
    }

    let missing = session.bookmarks.len() - saved.len();
    print_table(saved, &session.bookmarks);

    if missing > 0 {
        eprintln!("\n({} bookmarked material(s) are no longer in the catalog)", missing);
    }

    Ok(())
}

/// List known subjects and sort options
fn list_subjects() -> Result<()> {
    println!("Subjects:");
    println!("  {}", ALL_SUBJECTS);
    for subject in SUBJECTS {
        println!("  {}", subject);
    }

    println!("\nSort options:");
    for key in SortKey::OPTIONS {
        println!("  {}", key);
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("════════════════════════════════════════════════════════════");
    println!("  StudyHub Configuration");
    println!("════════════════════════════════════════════════════════════");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:      {}", cfg.home.display());
    println!("  Storage:   {}", cfg.storage_dir.display());
    println!("  Bookmarks: {}", FileKeyValueStore::new(&cfg.storage_dir).value_path(&cfg.bookmarks_key).display());
    println!();
    println!("Store:");
    println!("  Simulated latency: {}ms", cfg.store.simulated_latency_ms);
    println!();
    println!("Identity: {}", cfg.identity);

    Ok(())
}
