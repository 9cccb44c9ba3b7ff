//! Storage layer for taskd
//!
//! Every collection lives in its own JSON document inside the data directory.
//!
//! # Directory Structure
//!
//! ```text
//! data/                     # storage.data_dir
//!   tasks.json              # Active tasks, sorted by id
//!   deleted_tasks.json      # Deleted tasks with their deletion timestamp
//!   id_counter.json         # { "last_id": n }
//!   .taskd.lock             # Advisory lock serializing writers
//! ```
//!
//! Reads fail soft: a missing or unparsable document loads as its default
//! (an empty collection). The next save then replaces whatever was on disk,
//! so a corrupt file is effectively discarded. Writes fail hard.

use std::fmt;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};

use crate::config::StorageConfig;
use crate::error::Result;
use crate::lock;

/// Name of the lock file inside the data directory
pub const LOCK_FILE: &str = ".taskd.lock";

/// A durable home for one document (a collection or the id counter)
pub trait Store<D>: Send + Sync {
    /// Read the document; absent or corrupt content yields `D::default()`
    fn load(&self) -> D;

    /// Replace the stored document
    fn save(&self, data: &D) -> Result<()>;
}

/// How a file-backed store replaces its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Temp file + rename
    Atomic,
    /// Truncate and rewrite in place
    Direct,
}

impl WriteMode {
    pub fn from_atomic(atomic: bool) -> Self {
        if atomic {
            WriteMode::Atomic
        } else {
            WriteMode::Direct
        }
    }
}

/// Store backed by a pretty-printed JSON file
pub struct JsonFileStore<D> {
    path: PathBuf,
    mode: WriteMode,
    _doc: PhantomData<fn() -> D>,
}

impl<D> JsonFileStore<D> {
    pub fn new(path: impl Into<PathBuf>, mode: WriteMode) -> Self {
        Self {
            path: path.into(),
            mode,
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<D> fmt::Debug for JsonFileStore<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<D> Store<D> for JsonFileStore<D>
where
    D: Serialize + DeserializeOwned + Default,
{
    fn load(&self) -> D {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "store file missing, starting empty");
                return D::default();
            }
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "cannot read store file, treating as empty");
                return D::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(data) => {
                tracing::debug!(path = %self.path.display(), bytes = content.len(), "store loaded");
                data
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "store file is not valid JSON, treating as empty; next save overwrites it"
                );
                D::default()
            }
        }
    }

    fn save(&self, data: &D) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        let written = match self.mode {
            WriteMode::Atomic => lock::write_atomic(&self.path, json.as_bytes()),
            WriteMode::Direct => lock::write_direct(&self.path, json.as_bytes()),
        };
        if let Err(err) = &written {
            tracing::error!(path = %self.path.display(), error = %err, "failed to write store file");
        } else {
            tracing::debug!(path = %self.path.display(), bytes = json.len(), "store saved");
        }
        written
    }
}

/// In-memory store, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore<D> {
    data: Mutex<D>,
}

impl<D> MemoryStore<D> {
    pub fn new(data: D) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }

    fn guard(&self) -> MutexGuard<'_, D> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<D> Store<D> for MemoryStore<D>
where
    D: Clone + Send,
{
    fn load(&self) -> D {
        self.guard().clone()
    }

    fn save(&self, data: &D) -> Result<()> {
        *self.guard() = data.clone();
        Ok(())
    }
}

/// Layout of the data directory
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
    tasks_file: String,
    deleted_file: String,
    counter_file: String,
    mode: WriteMode,
}

impl Storage {
    pub fn new(data_dir: impl Into<PathBuf>, config: &StorageConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            tasks_file: config.tasks_file.clone(),
            deleted_file: config.deleted_file.clone(),
            counter_file: config.counter_file.clone(),
            mode: WriteMode::from_atomic(config.atomic_writes),
        }
    }

    /// Layout described entirely by the storage configuration
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.data_dir.clone(), config)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn write_mode(&self) -> WriteMode {
        self.mode
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.data_dir.join(&self.tasks_file)
    }

    pub fn deleted_file(&self) -> PathBuf {
        self.data_dir.join(&self.deleted_file)
    }

    pub fn counter_file(&self) -> PathBuf {
        self.data_dir.join(&self.counter_file)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.data_dir.join(LOCK_FILE)
    }

    pub fn is_initialized(&self) -> bool {
        self.tasks_file().exists() && self.deleted_file().exists()
    }

    /// Create the data directory and empty collections that are missing
    ///
    /// Existing files are left untouched. Returns the files created.
    pub fn init(&self) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.data_dir)?;

        let mut created = Vec::new();
        for path in [self.tasks_file(), self.deleted_file()] {
            if !path.exists() {
                let empty: Vec<serde_json::Value> = Vec::new();
                JsonFileStore::new(&path, self.mode).save(&empty)?;
                created.push(path);
            }
        }
        Ok(created)
    }
}
