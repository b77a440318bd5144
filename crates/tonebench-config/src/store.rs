//! Preset CRUD over a [`KeyValueStore`].
//!
//! All presets live under one key as a JSON array, in insertion order. Every mutating
//! call reads the array, changes it, and writes the whole array back before returning.
//!
//! Reads are forgiving. Missing data, text that is not JSON, or JSON that is not an
//! array all read as an empty list; individual records that fail to decode, repeat
//! an earlier id, or carry a blank name are skipped. Writes fail only when the backend does.
//!
//! # Example
//!
//! ```rust
//! use tonebench_config::{MemoryStore, PresetStore};
//! use tonebench_core::{ParamKind, ParameterModel};
//!
//! let mut presets = PresetStore::new(MemoryStore::new());
//! let crunch = ParameterModel::default().with(ParamKind::Distortion, 0.4);
//!
//! let id = presets.create("  Crunch ", crunch)?.expect("non-blank name");
//! assert_eq!(presets.find(&id).map(|p| p.name), Some("Crunch".to_string()));
//!
//! assert!(presets.create("   ", crunch)?.is_none());
//! assert_eq!(presets.list().len(), 1);
//! # Ok::<(), tonebench_config::ConfigError>(())
//! ```

use serde_json::Value;
use tonebench_core::ParameterModel;

use crate::ConfigError;
use crate::kv::KeyValueStore;
use crate::preset::{Preset, PresetId, now_millis};

/// Storage key for the preset array.
pub const PRESETS_KEY: &str = "tonebench_presets_v1";

/// Persistent preset collection with generated identifiers.
#[derive(Debug)]
pub struct PresetStore<S: KeyValueStore> {
    store: S,
    key: String,
    last_millis: u64,
}

impl<S: KeyValueStore> PresetStore<S> {
    /// Creates a store under [`PRESETS_KEY`].
    pub fn new(store: S) -> Self {
        Self::with_key(store, PRESETS_KEY)
    }

    /// Creates a store under a custom key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            last_millis: 0,
        }
    }

    /// Storage key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing store.
    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Consumes the preset store and returns the backing store.
    pub fn into_backend(self) -> S {
        self.store
    }

    /// All presets in stored order.
    pub fn list(&self) -> Vec<Preset> {
        let Some(text) = self.store.get(&self.key) else {
            return Vec::new();
        };
        decode_presets(&text)
    }

    /// Returns a copy of the preset with `id`.
    pub fn find(&self, id: &PresetId) -> Option<Preset> {
        self.list().into_iter().find(|p| &p.id == id)
    }

    /// Appends a new preset. `Ok(None)` if `name` is blank.
    pub fn create(
        &mut self,
        name: &str,
        settings: ParameterModel,
    ) -> Result<Option<PresetId>, ConfigError> {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("ignoring preset save with blank name");
            return Ok(None);
        }

        let mut presets = self.list();
        let id = self.generate_id(&presets);
        presets.push(Preset {
            id: id.clone(),
            name: name.to_string(),
            settings: settings.clamped(),
            saved_at: self.last_millis,
        });
        self.persist(&presets)?;
        tracing::info!(%id, name, "preset created");
        Ok(Some(id))
    }

    /// Replaces the settings of `id`, keeping its name and position.
    pub fn update(
        &mut self,
        id: &PresetId,
        settings: ParameterModel,
    ) -> Result<bool, ConfigError> {
        let mut presets = self.list();
        let stamp = self.stamp();
        let Some(preset) = presets.iter_mut().find(|p| &p.id == id) else {
            return Ok(false);
        };
        preset.settings = settings.clamped();
        preset.saved_at = stamp;
        self.persist(&presets)?;
        tracing::info!(%id, "preset updated");
        Ok(true)
    }

    /// Renames `id`. No-op for an unknown id or a blank name.
    pub fn rename(&mut self, id: &PresetId, name: &str) -> Result<bool, ConfigError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        let mut presets = self.list();
        let stamp = self.stamp();
        let Some(preset) = presets.iter_mut().find(|p| &p.id == id) else {
            return Ok(false);
        };
        preset.name = name.to_string();
        preset.saved_at = stamp;
        self.persist(&presets)?;
        tracing::info!(%id, name, "preset renamed");
        Ok(true)
    }

    /// Removes the one record with `id`, leaving the rest in order.
    pub fn delete(&mut self, id: &PresetId) -> Result<bool, ConfigError> {
        let mut presets = self.list();
        let Some(index) = presets.iter().position(|p| &p.id == id) else {
            return Ok(false);
        };
        presets.remove(index);
        self.persist(&presets)?;
        tracing::info!(%id, "preset deleted");
        Ok(true)
    }

    fn persist(&mut self, presets: &[Preset]) -> Result<(), ConfigError> {
        let text = serde_json::to_string(presets)?;
        self.store.set(&self.key, &text)
    }

    /// Current time in milliseconds, never below the last value returned.
    fn stamp(&mut self) -> u64 {
        self.last_millis = now_millis().max(self.last_millis);
        self.last_millis
    }

    /// `"{millis}_{16 hex}"`, unique against `existing`.
    fn generate_id(&mut self, existing: &[Preset]) -> PresetId {
        self.stamp();
        loop {
            let id = PresetId::new(format!(
                "{}_{:016x}",
                self.last_millis,
                rand::random::<u64>()
            ));
            if existing.iter().all(|p| p.id != id) {
                return id;
            }
            tracing::debug!(%id, "preset id collision, regenerating");
        }
    }
}

/// Decodes the stored blob, dropping whatever cannot be read.
fn decode_presets(text: &str) -> Vec<Preset> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "preset data is not valid JSON, treating as empty");
            return Vec::new();
        }
    };
    let Value::Array(items) = value else {
        tracing::warn!("preset data is not an array, treating as empty");
        return Vec::new();
    };

    let mut presets: Vec<Preset> = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Preset>(item) {
            Ok(preset) if presets.iter().any(|p| p.id == preset.id) => {
                tracing::warn!(index, id = %preset.id, "duplicate preset id, skipping");
            }
            Ok(preset) if preset.name.trim().is_empty() => {
                tracing::warn!(index, id = %preset.id, "preset has a blank name, skipping");
            }
            Ok(preset) => presets.push(preset),
            Err(e) => tracing::warn!(index, error = %e, "skipping malformed preset record"),
        }
    }
    presets
}
