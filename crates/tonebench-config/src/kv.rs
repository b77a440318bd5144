//! Key-value persistence surface for the preset store.
//!
//! A [`KeyValueStore`] maps string keys to opaque text blobs. Reads never fail: a key
//! that is missing or cannot be read yields `None`. Writes are synchronous and either
//! fully replace the value or return an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ConfigError;
use crate::paths::ensure_dir;

/// Opaque text storage addressed by key.
pub trait KeyValueStore {
    /// Returns the text stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Option<String>;

    /// Replaces the text stored under `key`.
    fn set(&mut self, key: &str, text: &str) -> Result<(), ConfigError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, text: &str) -> Result<(), ConfigError> {
        (**self).set(key, text)
    }
}

/// In-memory store for tests and sessions that should not touch disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one entry.
    pub fn with_entry(key: impl Into<String>, text: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), text.into());
        Self { entries }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, text: &str) -> Result<(), ConfigError> {
        self.entries.insert(key.to_string(), text.to_string());
        Ok(())
    }
}

/// One file per key: `<dir>/<key>.json`.
///
/// Writes go to a sibling temporary file that is then renamed over the target, so a
/// reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9_.-]` become `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "unreadable store file, treating as empty"
                );
                None
            }
        }
    }

    fn set(&mut self, key: &str, text: &str) -> Result<(), ConfigError> {
        ensure_dir(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, text).map_err(|e| ConfigError::write_file(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| ConfigError::write_file(&path, e))?;
        Ok(())
    }
}
