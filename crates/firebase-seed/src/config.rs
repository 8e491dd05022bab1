//! Configuration types for seeding.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Directory holding the bundled source files in the source checkout.
pub const BUNDLED_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

/// Name of the data directory looked up beside the executable.
pub const DATA_DIR_NAME: &str = "data";

/// Credential file looked up inside the data directory when none is given.
pub const DEFAULT_CREDENTIALS_FILE: &str = "serviceAccountKey.json";

/// Default source directory: `data/` beside the running executable when
/// present, otherwise the crate's bundled `data/` directory.
pub fn default_data_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DATA_DIR_NAME)))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from(BUNDLED_DATA_DIR))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid manifest {}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Manifest entry {0} has an empty collection name")]
    EmptyCollection(usize),
    #[error("Manifest entry {0} has an empty file name")]
    EmptyFile(usize),
}

/// One import step: a target collection and the file that feeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub collection: String,
    pub file: String,
}

impl ManifestEntry {
    pub fn new(collection: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            file: file.into(),
        }
    }
}

/// Ordered list of import steps. Entries run strictly in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(pub Vec<ManifestEntry>);

impl Default for Manifest {
    fn default() -> Self {
        Self(vec![
            ManifestEntry::new("products", "products.json"),
            ManifestEntry::new("banners", "banners.json"),
            ManifestEntry::new("contact", "contact.json"),
        ])
    }
}

impl Manifest {
    /// Loads a manifest from a JSON array of `{"collection", "file"}` objects.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest = serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, entry) in self.0.iter().enumerate() {
            if entry.collection.trim().is_empty() {
                return Err(ConfigError::EmptyCollection(i));
            }
            if entry.file.trim().is_empty() {
                return Err(ConfigError::EmptyFile(i));
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Configuration for a seeding run.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Directory the manifest's file names are resolved against.
    pub data_dir: PathBuf,

    /// Service-account credential file.
    pub credentials_path: PathBuf,

    /// Target project. Falls back to the credential's `project_id`.
    pub project_id: Option<String>,

    /// `host:port` of a local Firestore emulator.
    pub emulator_host: Option<String>,

    /// Seed into an in-memory store instead of Firestore.
    pub dry_run: bool,

    pub manifest: Manifest,
}

impl Default for SeedConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            credentials_path: data_dir.join(DEFAULT_CREDENTIALS_FILE),
            data_dir,
            project_id: None,
            emulator_host: None,
            dry_run: false,
            manifest: Manifest::default(),
        }
    }
}

impl SeedConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = var("SEED_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let credentials_path = var("GOOGLE_APPLICATION_CREDENTIALS")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DEFAULT_CREDENTIALS_FILE));

        let manifest = match var("SEED_MANIFEST") {
            Some(path) => Manifest::load(path)?,
            None => Manifest::default(),
        };

        let dry_run = var("SEED_DRY_RUN")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            data_dir,
            credentials_path,
            project_id: var("FIRESTORE_PROJECT_ID"),
            emulator_host: var("FIRESTORE_EMULATOR_HOST"),
            dry_run,
            manifest,
        })
    }
}
