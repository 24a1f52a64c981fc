//! Configuration loading and management.
//!
//! Resolution order (later wins):
//! 1. Built-in defaults
//! 2. YAML file: `--config`, else `./legacy-import.yaml`, else
//!    `<config dir>/legacy-importer/config.yaml`
//! 3. Environment variables (`LEGACY_IMPORT_*`)
//! 4. Command-line flags (applied by the binary)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "legacy-import.yaml";

/// Importer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub destination: DestinationConfig,

    #[serde(default)]
    pub import: ImportConfig,
}

/// Legacy database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the legacy SQLite dump.
    #[serde(default = "default_source_path")]
    pub path: PathBuf,

    /// Key for encrypted dumps. Only honoured by SQLCipher builds.
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_source_path(),
            password: None,
        }
    }
}

fn default_source_path() -> PathBuf {
    PathBuf::from("legacy.db")
}

/// Site database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Path to the site SQLite database.
    #[serde(default = "default_destination_path")]
    pub path: PathBuf,

    /// Prefix prepended to every destination table name.
    #[serde(default)]
    pub table_prefix: String,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            path: default_destination_path(),
            table_prefix: String::new(),
        }
    }
}

fn default_destination_path() -> PathBuf {
    PathBuf::from("site.db")
}

/// What to do with a legacy user that has no `tbl_user` counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCrossReference {
    /// Log it and import the user with empty enrichment fields.
    #[default]
    Import,
    /// Log it and leave the user out.
    Skip,
}

/// Pipeline behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Rows fetched from the source per page.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Run the badge queue copy after user badges.
    #[serde(default)]
    pub badge_queue: bool,

    #[serde(default)]
    pub missing_cross_reference: MissingCrossReference,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            badge_queue: false,
            missing_cross_reference: MissingCrossReference::default(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolve the configuration: explicit file, project file, user file,
    /// then defaults, with environment overrides applied last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::discover() {
                Some(path) => {
                    debug!(path = %path.display(), "Using discovered config file");
                    Self::load(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Find the first existing config file among the default locations.
    fn discover() -> Option<PathBuf> {
        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        if project.is_file() {
            return Some(project);
        }
        dirs::config_dir()
            .map(|dir| dir.join("legacy-importer").join("config.yaml"))
            .filter(|path| path.is_file())
    }

    /// Apply `LEGACY_IMPORT_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("LEGACY_IMPORT_SOURCE") {
            self.source.path = PathBuf::from(path);
        }
        if let Some(password) = lookup("LEGACY_IMPORT_PASSWORD") {
            self.source.password = Some(password);
        }
        if let Some(path) = lookup("LEGACY_IMPORT_DEST") {
            self.destination.path = PathBuf::from(path);
        }
        if let Some(size) = lookup("LEGACY_IMPORT_BATCH_SIZE") {
            match size.parse::<usize>() {
                Ok(size) if size > 0 => self.import.batch_size = size,
                _ => tracing::warn!(value = %size, "Ignoring invalid LEGACY_IMPORT_BATCH_SIZE"),
            }
        }
    }
}
