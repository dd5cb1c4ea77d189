//! Configuration for gridstore
//!
//! Centralized configuration with sensible defaults.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a gridstore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Coordination Configuration
    // -------------------------------------------------------------------------
    /// Maximum time to wait for the process-wide lock before giving up
    pub lock_timeout: Duration,

    // -------------------------------------------------------------------------
    // Compaction Configuration
    // -------------------------------------------------------------------------
    /// Soft-deleted rows modified more recently than this survive compaction
    pub retention: Duration,

    // -------------------------------------------------------------------------
    // ID Configuration
    // -------------------------------------------------------------------------
    /// Length of the random suffix appended to every generated ID
    pub id_suffix_len: usize,

    /// Per-collection ID prefix overrides (collection name → prefix)
    pub id_prefixes: HashMap<String, String>,

    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// Snapshot file used by the CLI to persist the in-memory workbook
    pub snapshot_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(30),
            retention: Duration::from_secs(24 * 60 * 60), // 24 h
            id_suffix_len: 12,
            id_prefixes: HashMap::new(),
            snapshot_path: PathBuf::from("./gridstore.snap"),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// ID prefix for a collection.
    ///
    /// An explicit override wins. Otherwise the first three alphanumeric
    /// characters of the collection name, upper-cased, followed by `_`
    /// ("Customers" → "CUS_"). Names without any alphanumeric character
    /// fall back to "ROW_".
    pub fn id_prefix_for(&self, collection: &str) -> String {
        if let Some(prefix) = self.id_prefixes.get(collection) {
            return prefix.clone();
        }

        let stem: String = collection
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(3)
            .collect::<String>()
            .to_ascii_uppercase();

        if stem.is_empty() {
            "ROW_".to_string()
        } else {
            format!("{}_", stem)
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the lock acquisition timeout
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.lock_timeout = timeout;
        self
    }

    /// Set the compaction retention window
    pub fn retention(mut self, retention: Duration) -> Self {
        self.config.retention = retention;
        self
    }

    /// Set the length of the random ID suffix
    pub fn id_suffix_len(mut self, len: usize) -> Self {
        self.config.id_suffix_len = len;
        self
    }

    /// Register an ID prefix for one collection
    pub fn id_prefix(mut self, collection: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.config
            .id_prefixes
            .insert(collection.into(), prefix.into());
        self
    }

    /// Set the snapshot file path
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_path = path.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
