//! Store configuration: an explicit value, not a process-wide singleton.
//!
//! The orchestrator takes a [`StoreConfig`] at construction time. The TOML
//! shape is a single key:
//!
//! ```toml
//! db_path = "/data/stock_kbar.db"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Location of the single-file kbar store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Absolute or working-directory-relative path to the SQLite store file.
    pub db_path: PathBuf,
}

impl StoreConfig {
    /// Configuration pointing at the given store file.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_toml_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The store path as the string Diesel expects.
    pub fn database_url(&self) -> String {
        self.db_path.to_string_lossy().to_string()
    }

    /// Fail fast when the configured store is not reachable.
    ///
    /// The store must already exist as a regular file; this layer never
    /// creates it implicitly (provisioning goes through `db::migrate`).
    pub fn ensure_reachable(&self) -> Result<(), Error> {
        let unavailable = |reason: &str| Error::StoreUnavailable {
            path: self.db_path.clone(),
            reason: reason.to_string(),
        };
        match std::fs::metadata(&self.db_path) {
            Err(_) => Err(unavailable("file does not exist")),
            Ok(meta) if !meta.is_file() => Err(unavailable("path is not a regular file")),
            Ok(_) => Ok(()),
        }
    }
}
