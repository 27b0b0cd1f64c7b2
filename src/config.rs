//! Configuration for studyhub.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (STUDYHUB_HOME, STUDYHUB_USER_ID, STUDYHUB_USER_NAME)
//! 2. Config file (.studyhub/config.yaml)
//! 3. Defaults (~/.studyhub)
//!
//! Config file discovery:
//! - Searches current directory and parents for .studyhub/config.yaml
//! - Paths in config file are relative to the .studyhub/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::DEFAULT_BOOKMARKS_KEY;
use crate::domain::Identity;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const ENV_HOME: &str = "STUDYHUB_HOME";
const ENV_USER_ID: &str = "STUDYHUB_USER_ID";
const ENV_USER_NAME: &str = "STUDYHUB_USER_NAME";

const DEFAULT_USER_ID: &str = "local";
const DEFAULT_USER_NAME: &str = "Local User";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub identity: Option<IdentityConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Key-value store directory (relative to .studyhub/)
    pub dir: Option<String>,
    /// Key the bookmark set is stored under
    pub bookmarks_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub simulated_latency_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to studyhub home
    pub home: PathBuf,
    /// Key-value storage directory
    pub storage_dir: PathBuf,
    /// Storage key for bookmarks
    pub bookmarks_key: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Store behaviour
    pub store: StoreSettings,
    /// Caller identity used by the CLI
    pub identity: Identity,
}

#[derive(Debug, Clone, Default)]
pub struct StoreSettings {
    /// Delay applied to create/delete/comment (0 = none)
    pub simulated_latency_ms: u64,
}

impl StoreSettings {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".studyhub").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge defaults, an optional parsed config file and environment lookups
fn resolve(
    default_home: PathBuf,
    config_file: Option<(PathBuf, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let home = env(ENV_HOME)
        .map(PathBuf::from)
        .unwrap_or(default_home);

    let (config_path, file) = match config_file {
        Some((path, file)) => (Some(path), Some(file)),
        None => (None, None),
    };

    // Relative paths in the file are relative to .studyhub/
    let base_dir = config_path
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(Path::new("."));

    let storage_dir = file
        .as_ref()
        .and_then(|f| f.storage.dir.as_deref())
        .map(|dir| resolve_path(base_dir, dir))
        .unwrap_or_else(|| home.join("storage"));

    let bookmarks_key = file
        .as_ref()
        .and_then(|f| f.storage.bookmarks_key.clone())
        .unwrap_or_else(|| DEFAULT_BOOKMARKS_KEY.to_string());

    let store = StoreSettings {
        simulated_latency_ms: file
            .as_ref()
            .and_then(|f| f.store.as_ref())
            .and_then(|s| s.simulated_latency_ms)
            .unwrap_or(0),
    };

    let file_identity = file.as_ref().and_then(|f| f.identity.as_ref());
    let identity = Identity::new(
        env(ENV_USER_ID)
            .or_else(|| file_identity.and_then(|i| i.id.clone()))
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
        env(ENV_USER_NAME)
            .or_else(|| file_identity.and_then(|i| i.name.clone()))
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
    );

    ResolvedConfig {
        home,
        storage_dir,
        bookmarks_key,
        config_file: config_path,
        store,
        identity,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".studyhub");

    let config_file = match find_config_file() {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            Some((path, parsed))
        }
        None => None,
    };

    Ok(resolve(default_home, config_file, |key| std::env::var(key).ok()))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
