//! FILENAME: app/cli/src/config.rs
//! PURPOSE: Explicit configuration object for export and query runs.
//! CONTEXT: Loaded from a JSON file; every field has a default and CLI
//! flags override individual fields after loading.

use std::path::{Path, PathBuf};

use cube_engine::Locale;
use persistence::MergePolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "cube.json";

/// Snapshot file name written by the warehouse export.
pub const DEFAULT_SNAPSHOT_FILE: &str = "vw_cubo_proyectos.csv";

pub const DEFAULT_COMMIT_PREFIX: &str = "Auto export cubo OLAP";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("delimiter '{0}' must be a single ASCII character")]
    InvalidDelimiter(char),
}

/// Where the fact source reads its extract from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: Option<PathBuf>,
    pub delimiter: char,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            path: None,
            delimiter: ',',
        }
    }
}

impl SourceConfig {
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ConfigError::InvalidDelimiter(self.delimiter))
        }
    }
}

/// Version-control publishing of a freshly written snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub enabled: bool,
    /// Repository working tree; defaults to the snapshot's directory.
    pub repo_path: Option<PathBuf>,
    pub remote: String,
    /// Branch to push; the current upstream when absent.
    pub branch: Option<String>,
    pub message_prefix: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            enabled: false,
            repo_path: None,
            remote: "origin".to_string(),
            branch: None,
            message_prefix: DEFAULT_COMMIT_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    pub snapshot_path: PathBuf,
    pub source: SourceConfig,
    pub merge_policy: MergePolicy,
    pub locale: Locale,
    pub publish: PublishConfig,
    pub log_path: Option<PathBuf>,
}

impl Default for CubeConfig {
    fn default() -> Self {
        CubeConfig {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            source: SourceConfig::default(),
            merge_policy: MergePolicy::default(),
            locale: Locale::default(),
            publish: PublishConfig::default(),
            log_path: None,
        }
    }
}

impl CubeConfig {
    pub fn load(path: &Path) -> Result<CubeConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<CubeConfig, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Loads `path` when given, else `cube.json` from the working directory
    /// when present, else the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<CubeConfig, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(CubeConfig::default())
                }
            }
        }
    }
}
