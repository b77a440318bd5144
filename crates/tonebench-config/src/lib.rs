//! Preset persistence and settings for tonebench.
//!
//! # Features
//!
//! - **Preset Store**: CRUD over named [`ParameterModel`](tonebench_core::ParameterModel)
//!   snapshots with generated, stable identifiers
//! - **Key-Value Stores**: the persistence surface behind the preset store, in memory or
//!   one JSON file per key
//! - **Settings**: TOML configuration for analysis, recording, presets, and timing
//! - **Paths**: Platform-specific config, data, and recordings directories
//!
//! # Example
//!
//! ```rust,no_run
//! use tonebench_config::{FileStore, PresetStore, Settings, paths};
//! use tonebench_core::ParameterModel;
//!
//! let settings = Settings::load_or_default(paths::settings_path())?;
//! let mut presets = PresetStore::new(FileStore::new(settings.preset_store_dir()));
//!
//! if let Some(id) = presets.create("Clean", ParameterModel::default())? {
//!     println!("saved preset {id}");
//! }
//! for preset in presets.list() {
//!     println!("{}  {}", preset.id, preset.name);
//! }
//! # Ok::<(), tonebench_config::ConfigError>(())
//! ```

mod error;
mod preset;

/// Key-value persistence backends.
pub mod kv;

/// Platform-specific paths for settings, presets, and recordings.
pub mod paths;

/// Application settings.
pub mod settings;

/// Preset CRUD.
pub mod store;

pub use error::ConfigError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use preset::{Preset, PresetId};
pub use settings::{
    AnalysisSettings, EngineSettings, PresetSettings, RecordingSettings, SettlePolicyKind,
    Settings,
};
pub use store::{PRESETS_KEY, PresetStore};
