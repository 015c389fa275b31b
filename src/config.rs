//! Runtime configuration: where the storage slot lives.

use std::path::PathBuf;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::store::{FileStorage, TaskStore};

/// Directory used under `$HOME` when no directory is given.
pub const DEFAULT_DIR_NAME: &str = ".goals";

/// Resolved storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub slot: String,
}

impl Config {
    /// Resolve the data directory: explicit `dir` (flag or `GOALS_DIR`), else `$HOME/.goals`.
    pub fn resolve(dir: Option<PathBuf>, slot: String, home: Option<PathBuf>) -> Self {
        let data_dir = dir.unwrap_or_else(|| {
            home.unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_DIR_NAME)
        });
        debug!(data_dir = %data_dir.display(), slot = slot.as_str(), "resolved config");
        Config { data_dir, slot }
    }

    /// Resolve using the process `HOME`.
    pub fn from_env(dir: Option<PathBuf>, slot: String) -> Self {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::resolve(dir, slot, home)
    }

    /// File that backs the configured slot.
    pub fn slot_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.slot))
    }

    /// Open file storage in the data directory and load the task store.
    ///
    /// Only an invalid slot name is an error. An unusable data directory is
    /// logged and the store runs on its in-memory collection.
    pub fn open_store(&self) -> anyhow::Result<TaskStore> {
        FileStorage::unopened(&self.data_dir)
            .slot_path(&self.slot)
            .context("invalid --slot value")?;
        let storage = match FileStorage::open(&self.data_dir) {
            Ok(storage) => storage,
            Err(e) => {
                warn!(error = ?e, "data directory unavailable, changes will not be saved");
                FileStorage::unopened(&self.data_dir)
            }
        };
        let store = TaskStore::load(Box::new(storage), &self.slot);
        info!(slot = %self.slot_path().display(), tasks = store.tasks().len(), "store ready");
        Ok(store)
    }
}
