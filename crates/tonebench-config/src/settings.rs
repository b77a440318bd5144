//! Application settings (TOML).
//!
//! Every section and field is optional; anything missing takes its default.
//!
//! # TOML Format
//!
//! ```toml
//! [analysis]
//! fft_size = 1024
//! smoothing = 0.9
//! min_db = -100.0
//! max_db = -30.0
//!
//! [recording]
//! settle_ms = 200
//! policy = "fixed"          # or "flush-ack"
//! flush_timeout_ms = 2000
//! output_dir = "/home/me/Music/tonebench"
//!
//! [presets]
//! store_dir = "/home/me/.local/share/tonebench"
//!
//! [engine]
//! sample_rate = 48000
//! tick_hz = 60
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::paths;

/// Top-level settings file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Spectrum analysis.
    pub analysis: AnalysisSettings,
    /// Recording and export.
    pub recording: RecordingSettings,
    /// Preset persistence.
    pub presets: PresetSettings,
    /// Offline engine timing.
    pub engine: EngineSettings,
}

/// `[analysis]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// FFT size in samples (power of two).
    pub fft_size: usize,
    /// Exponential smoothing constant across polls, `[0, 1)`.
    pub smoothing: f32,
    /// dB mapped to bin value 0.
    pub min_db: f32,
    /// dB mapped to bin value 1.
    pub max_db: f32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            smoothing: 0.9,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

/// How the recorder decides a stopped capture is safe to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettlePolicyKind {
    /// Wait a fixed delay after stop.
    #[default]
    Fixed,
    /// Wait for the engine's flush acknowledgment, bounded by a timeout.
    FlushAck,
}

/// `[recording]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingSettings {
    /// Delay between stop and ready, in milliseconds.
    pub settle_ms: u64,
    /// Settle policy.
    pub policy: SettlePolicyKind,
    /// Upper bound on waiting for a flush acknowledgment, in milliseconds.
    pub flush_timeout_ms: u64,
    /// Export directory. Defaults to [`paths::user_recordings_dir`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            settle_ms: 200,
            policy: SettlePolicyKind::Fixed,
            flush_timeout_ms: 2000,
            output_dir: None,
        }
    }
}

/// `[presets]` section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetSettings {
    /// Directory of the preset file store. Defaults to [`paths::user_data_dir`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
}

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Sample rate for offline rendering and capture.
    pub sample_rate: u32,
    /// Control-loop frequency in Hz.
    pub tick_hz: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            tick_hz: 60,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load settings from `path`, or defaults if the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse settings from a TOML string. Out-of-range values are normalized.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(toml_str)?;
        Ok(settings.normalized())
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the settings to a TOML file, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            paths::ensure_dir(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Effective export directory.
    pub fn recordings_dir(&self) -> PathBuf {
        self.recording
            .output_dir
            .clone()
            .unwrap_or_else(paths::user_recordings_dir)
    }

    /// Effective preset store directory.
    pub fn preset_store_dir(&self) -> PathBuf {
        self.presets
            .store_dir
            .clone()
            .unwrap_or_else(paths::user_data_dir)
    }

    /// Returns a copy with every value pulled into a usable range.
    ///
    /// - `fft_size` rounded up to a power of two in `[32, 32768]`
    /// - `smoothing` clamped to `[0, 0.999]`
    /// - `min_db >= max_db` resets both to defaults
    /// - `sample_rate` at least 8000, `tick_hz` in `[1, 1000]`
    pub fn normalized(mut self) -> Self {
        let a = &mut self.analysis;
        let fft_size = a.fft_size.clamp(32, 32768).next_power_of_two();
        if fft_size != a.fft_size {
            tracing::warn!(from = a.fft_size, to = fft_size, "adjusted analysis.fft_size");
            a.fft_size = fft_size;
        }
        a.smoothing = if a.smoothing.is_nan() {
            AnalysisSettings::default().smoothing
        } else {
            a.smoothing.clamp(0.0, 0.999)
        };
        if !(a.min_db < a.max_db) {
            tracing::warn!(min_db = a.min_db, max_db = a.max_db, "invalid dB range, using defaults");
            let d = AnalysisSettings::default();
            a.min_db = d.min_db;
            a.max_db = d.max_db;
        }

        let e = &mut self.engine;
        e.sample_rate = e.sample_rate.max(8000);
        e.tick_hz = e.tick_hz.clamp(1, 1000);
        self
    }
}
