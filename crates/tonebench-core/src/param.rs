//! The parameter model: six range-checked controls driving the effect chain.
//!
//! [`ParameterModel`] is a plain `Copy` value. The UI collaborator mutates its own
//! working copy every frame, the signal chain reads it, and the preset store keeps
//! snapshots of it. Because it is a value, loading a preset always produces a copy;
//! there is no way to alias a stored snapshot.
//!
//! Every field is clamped on the way in. Setters, the constructor, [`ParameterModel::set`],
//! and deserialization all route through [`ParamDescriptor::clamp`], so a model that
//! exists is a model that is in range.
//!
//! # Example
//!
//! ```rust
//! use tonebench_core::{ParamKind, ParameterModel};
//!
//! let mut model = ParameterModel::default();
//! model.set(ParamKind::Cutoff, 5.0);       // below the 80 Hz floor
//! assert_eq!(model.cutoff_hz(), 80.0);
//!
//! model.set_reverb_mix(0.35);
//! assert_eq!(model.get(ParamKind::ReverbMix), 0.35);
//! ```

use core::fmt;
use core::str::FromStr;

use crate::param_info::{ParamDescriptor, ParamUnit};

const CUTOFF: ParamDescriptor =
    ParamDescriptor::new("LPF Cutoff", "Cutoff", ParamUnit::Hertz, 80.0, 20000.0, 20000.0)
        .with_string_id("cutoff_hz");

const DISTORTION: ParamDescriptor =
    ParamDescriptor::new("Distortion", "Dist", ParamUnit::Amount, 0.0, 1.0, 0.0)
        .with_string_id("distortion");

const THRESHOLD: ParamDescriptor =
    ParamDescriptor::new("Comp Threshold", "Thresh", ParamUnit::Decibels, -80.0, 0.0, -24.0)
        .with_string_id("comp_threshold");

const RATIO: ParamDescriptor =
    ParamDescriptor::new("Comp Ratio", "Ratio", ParamUnit::Ratio, 1.0, 20.0, 6.0)
        .with_string_id("comp_ratio");

const REVERB_MIX: ParamDescriptor =
    ParamDescriptor::new("Reverb Mix", "Reverb", ParamUnit::Amount, 0.0, 1.0, 0.0)
        .with_string_id("reverb_mix");

const MASTER: ParamDescriptor =
    ParamDescriptor::new("Master Volume", "Master", ParamUnit::Amount, 0.0, 1.0, 0.8)
        .with_string_id("master_volume");

/// Identifies one of the six tunable controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Low-pass filter cutoff in Hz.
    Cutoff,
    /// Distortion amount, 0–1.
    Distortion,
    /// Compressor threshold in dB.
    Threshold,
    /// Compressor ratio (n:1).
    Ratio,
    /// Reverb dry/wet, 0–1.
    ReverbMix,
    /// Master output gain, 0–1.
    MasterVolume,
}

impl ParamKind {
    /// All controls in display order.
    pub const ALL: [ParamKind; 6] = [
        ParamKind::Cutoff,
        ParamKind::Distortion,
        ParamKind::Threshold,
        ParamKind::Ratio,
        ParamKind::ReverbMix,
        ParamKind::MasterVolume,
    ];

    /// Returns the descriptor (range, default, unit) for this control.
    pub const fn descriptor(self) -> &'static ParamDescriptor {
        match self {
            ParamKind::Cutoff => &CUTOFF,
            ParamKind::Distortion => &DISTORTION,
            ParamKind::Threshold => &THRESHOLD,
            ParamKind::Ratio => &RATIO,
            ParamKind::ReverbMix => &REVERB_MIX,
            ParamKind::MasterVolume => &MASTER,
        }
    }

    /// Stable string ID, e.g. `"comp_ratio"`.
    pub const fn as_str(self) -> &'static str {
        self.descriptor().string_id
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a control name does not match any [`ParamKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parameter '{0}'")]
pub struct UnknownParam(pub String);

impl FromStr for ParamKind {
    type Err = UnknownParam;

    /// Matches the string ID or the short name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ParamKind::ALL
            .into_iter()
            .find(|kind| {
                let desc = kind.descriptor();
                desc.string_id.eq_ignore_ascii_case(s) || desc.short_name.eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| UnknownParam(s.to_string()))
    }
}

/// The canonical, always-in-range set of tunable controls.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawParameters"))]
pub struct ParameterModel {
    cutoff_hz: f32,
    distortion_amount: f32,
    compressor_threshold_db: f32,
    compressor_ratio: f32,
    reverb_mix: f32,
    master_volume: f32,
}

impl Default for ParameterModel {
    fn default() -> Self {
        Self {
            cutoff_hz: CUTOFF.default,
            distortion_amount: DISTORTION.default,
            compressor_threshold_db: THRESHOLD.default,
            compressor_ratio: RATIO.default,
            reverb_mix: REVERB_MIX.default,
            master_volume: MASTER.default,
        }
    }
}

impl ParameterModel {
    /// Creates a model, clamping every argument to its domain.
    pub fn new(
        cutoff_hz: f32,
        distortion_amount: f32,
        compressor_threshold_db: f32,
        compressor_ratio: f32,
        reverb_mix: f32,
        master_volume: f32,
    ) -> Self {
        Self {
            cutoff_hz: CUTOFF.clamp(cutoff_hz),
            distortion_amount: DISTORTION.clamp(distortion_amount),
            compressor_threshold_db: THRESHOLD.clamp(compressor_threshold_db),
            compressor_ratio: RATIO.clamp(compressor_ratio),
            reverb_mix: REVERB_MIX.clamp(reverb_mix),
            master_volume: MASTER.clamp(master_volume),
        }
    }

    /// Low-pass cutoff in Hz, `[80, 20000]`.
    #[inline]
    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    /// Distortion amount, `[0, 1]`.
    #[inline]
    pub fn distortion_amount(&self) -> f32 {
        self.distortion_amount
    }

    /// Compressor threshold in dB, `[-80, 0]`.
    #[inline]
    pub fn compressor_threshold_db(&self) -> f32 {
        self.compressor_threshold_db
    }

    /// Compressor ratio, `[1, 20]`.
    #[inline]
    pub fn compressor_ratio(&self) -> f32 {
        self.compressor_ratio
    }

    /// Reverb dry/wet, `[0, 1]`.
    #[inline]
    pub fn reverb_mix(&self) -> f32 {
        self.reverb_mix
    }

    /// Master output gain, `[0, 1]`.
    #[inline]
    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Sets the cutoff (clamped).
    pub fn set_cutoff_hz(&mut self, value: f32) {
        self.cutoff_hz = CUTOFF.clamp(value);
    }

    /// Sets the distortion amount (clamped).
    pub fn set_distortion_amount(&mut self, value: f32) {
        self.distortion_amount = DISTORTION.clamp(value);
    }

    /// Sets the compressor threshold (clamped).
    pub fn set_compressor_threshold_db(&mut self, value: f32) {
        self.compressor_threshold_db = THRESHOLD.clamp(value);
    }

    /// Sets the compressor ratio (clamped).
    pub fn set_compressor_ratio(&mut self, value: f32) {
        self.compressor_ratio = RATIO.clamp(value);
    }

    /// Sets the reverb dry/wet (clamped).
    pub fn set_reverb_mix(&mut self, value: f32) {
        self.reverb_mix = REVERB_MIX.clamp(value);
    }

    /// Sets the master volume (clamped).
    pub fn set_master_volume(&mut self, value: f32) {
        self.master_volume = MASTER.clamp(value);
    }

    /// Reads a control by kind.
    pub fn get(&self, kind: ParamKind) -> f32 {
        match kind {
            ParamKind::Cutoff => self.cutoff_hz,
            ParamKind::Distortion => self.distortion_amount,
            ParamKind::Threshold => self.compressor_threshold_db,
            ParamKind::Ratio => self.compressor_ratio,
            ParamKind::ReverbMix => self.reverb_mix,
            ParamKind::MasterVolume => self.master_volume,
        }
    }

    /// Writes a control by kind (clamped).
    pub fn set(&mut self, kind: ParamKind, value: f32) {
        match kind {
            ParamKind::Cutoff => self.set_cutoff_hz(value),
            ParamKind::Distortion => self.set_distortion_amount(value),
            ParamKind::Threshold => self.set_compressor_threshold_db(value),
            ParamKind::Ratio => self.set_compressor_ratio(value),
            ParamKind::ReverbMix => self.set_reverb_mix(value),
            ParamKind::MasterVolume => self.set_master_volume(value),
        }
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, kind: ParamKind, value: f32) -> Self {
        self.set(kind, value);
        self
    }

    /// Returns a copy with every field passed through its descriptor again.
    ///
    /// A no-op for any model built through the public API. The signal chain calls it
    /// at its boundary so nothing out of range can reach an engine.
    pub fn clamped(&self) -> Self {
        Self::new(
            self.cutoff_hz,
            self.distortion_amount,
            self.compressor_threshold_db,
            self.compressor_ratio,
            self.reverb_mix,
            self.master_volume,
        )
    }

    /// Iterates `(kind, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamKind, f32)> + '_ {
        ParamKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

/// Wire shape for deserialization. Missing fields take their defaults; every field is
/// clamped by [`ParameterModel::new`] on conversion.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default)]
struct RawParameters {
    cutoff_hz: f32,
    distortion_amount: f32,
    compressor_threshold_db: f32,
    compressor_ratio: f32,
    reverb_mix: f32,
    master_volume: f32,
}

#[cfg(feature = "serde")]
impl Default for RawParameters {
    fn default() -> Self {
        let d = ParameterModel::default();
        Self {
            cutoff_hz: d.cutoff_hz,
            distortion_amount: d.distortion_amount,
            compressor_threshold_db: d.compressor_threshold_db,
            compressor_ratio: d.compressor_ratio,
            reverb_mix: d.reverb_mix,
            master_volume: d.master_volume,
        }
    }
}

#[cfg(feature = "serde")]
impl From<RawParameters> for ParameterModel {
    fn from(raw: RawParameters) -> Self {
        ParameterModel::new(
            raw.cutoff_hz,
            raw.distortion_amount,
            raw.compressor_threshold_db,
            raw.compressor_ratio,
            raw.reverb_mix,
            raw.master_volume,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_descriptors() {
        let model = ParameterModel::default();
        for (kind, value) in model.iter() {
            assert_eq!(value, kind.descriptor().default, "{kind}");
        }
        assert_eq!(model.cutoff_hz(), 20000.0);
        assert_eq!(model.compressor_threshold_db(), -24.0);
        assert_eq!(model.compressor_ratio(), 6.0);
        assert_eq!(model.master_volume(), 0.8);
    }

    #[test]
    fn descriptor_table_is_complete() {
        for kind in ParamKind::ALL {
            let desc = kind.descriptor();
            assert!(!desc.string_id.is_empty(), "{}", desc.name);
            assert!(desc.short_name.len() <= 8, "{}", desc.short_name);
            assert!(desc.min < desc.max && desc.contains(desc.default), "{kind}");
            assert!(desc.format_value(desc.default).ends_with(desc.unit.suffix()));
        }
        assert_eq!(CUTOFF.format_value(4200.0), "4200 Hz");
        assert_eq!(RATIO.format_value(6.0), "6.0:1");
    }

    #[test]
    fn constructor_clamps_every_field() {
        let model = ParameterModel::new(1.0, 2.0, 10.0, 0.0, -1.0, 5.0);
        assert_eq!(model.cutoff_hz(), 80.0);
        assert_eq!(model.distortion_amount(), 1.0);
        assert_eq!(model.compressor_threshold_db(), 0.0);
        assert_eq!(model.compressor_ratio(), 1.0);
        assert_eq!(model.reverb_mix(), 0.0);
        assert_eq!(model.master_volume(), 1.0);
    }

    #[test]
    fn setters_clamp() {
        let mut model = ParameterModel::default();
        model.set_compressor_threshold_db(-200.0);
        model.set_compressor_ratio(100.0);
        assert_eq!(model.compressor_threshold_db(), -80.0);
        assert_eq!(model.compressor_ratio(), 20.0);
    }

    #[test]
    fn nan_input_falls_back_to_default() {
        let mut model = ParameterModel::default().with(ParamKind::ReverbMix, 0.6);
        model.set_reverb_mix(f32::NAN);
        assert_eq!(model.reverb_mix(), 0.0);
    }

    #[test]
    fn parse_kind_from_id_or_short_name() {
        assert_eq!("cutoff_hz".parse::<ParamKind>(), Ok(ParamKind::Cutoff));
        assert_eq!("Thresh".parse::<ParamKind>(), Ok(ParamKind::Threshold));
        assert_eq!(" MASTER ".parse::<ParamKind>(), Ok(ParamKind::MasterVolume));
        assert!("resonance".parse::<ParamKind>().is_err());
    }

    #[test]
    fn copies_are_independent() {
        let stored = ParameterModel::default().with(ParamKind::Distortion, 0.4);
        let mut live = stored;
        live.set_distortion_amount(0.9);
        assert_eq!(stored.distortion_amount(), 0.4);
        assert_eq!(live.distortion_amount(), 0.9);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_clamps_and_fills_defaults() {
        let json = r#"{ "cutoff_hz": 5.0, "compressor_ratio": 99.0 }"#;
        let model: ParameterModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.cutoff_hz(), 80.0);
        assert_eq!(model.compressor_ratio(), 20.0);
        assert_eq!(model.master_volume(), 0.8);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialize_uses_field_names() {
        let json = serde_json::to_string(&ParameterModel::default()).unwrap();
        assert!(json.contains("\"cutoff_hz\":20000"), "got: {json}");
        assert!(json.contains("\"master_volume\":0.8"), "got: {json}");
    }
}
