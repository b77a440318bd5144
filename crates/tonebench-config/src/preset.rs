//! Preset record and identifier.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tonebench_core::ParameterModel;

/// Opaque, unique preset identifier.
///
/// Generated by the store as `"{millis}_{16 hex digits}"`. Callers treat it as an
/// opaque string; only equality is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetId(String);

impl PresetId {
    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PresetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PresetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A named parameter snapshot.
///
/// # JSON Format
///
/// ```json
/// {
///   "id": "1718000000000_9f3c2a7b01d4e655",
///   "name": "Warm crunch",
///   "settings": {
///     "cutoff_hz": 4200.0,
///     "distortion_amount": 0.35,
///     "compressor_threshold_db": -24.0,
///     "compressor_ratio": 6.0,
///     "reverb_mix": 0.2,
///     "master_volume": 0.8
///   },
///   "saved_at": 1718000000000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Immutable identity.
    pub id: PresetId,

    /// Display name, trimmed and non-empty.
    pub name: String,

    /// Parameter snapshot. Clamped on deserialization.
    pub settings: ParameterModel,

    /// Last save time in milliseconds since the UNIX epoch.
    #[serde(default)]
    pub saved_at: u64,
}

impl Preset {
    /// Short one-line description for listings.
    pub fn summary(&self) -> String {
        let s = &self.settings;
        format!(
            "cutoff {:.0} Hz, dist {:.2}, thresh {:.0} dB, ratio {:.1}, reverb {:.2}, master {:.2}",
            s.cutoff_hz(),
            s.distortion_amount(),
            s.compressor_threshold_db(),
            s.compressor_ratio(),
            s.reverb_mix(),
            s.master_volume(),
        )
    }
}

/// Milliseconds since the UNIX epoch, 0 if the clock is before it.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
