//! Capability traits for the external audio engine.
//!
//! tonebench does not render audio itself. Sample processing belongs to an external
//! real-time engine running on its own thread and clock. The core talks to it through
//! three narrow capabilities, and each component receives only the one it needs:
//!
//! ```text
//! ┌────────────────────┐   set_param / connect    ┌──────────────────┐
//! │   SignalChain      │ ───────────────────────▶ │   AudioEngine    │
//! └────────────────────┘                          └──────────────────┘
//! ┌────────────────────┐   read_spectrum/level    ┌──────────────────┐
//! │   AnalysisTaps     │ ◀─────────────────────── │  AnalysisEngine  │
//! └────────────────────┘                          └──────────────────┘
//! ┌────────────────────┐   begin/end capture      ┌──────────────────┐
//! │ RecordingController│ ───────────────────────▶ │  RecorderEngine  │
//! └────────────────────┘        export            └──────────────────┘
//! ```
//!
//! Parameter writes are assumed safe to issue from the control thread at any time.
//! Buffer pulls reflect a recent, not necessarily the latest, engine state.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::capture::CaptureBuffer;

/// Handle to an effect node instantiated by an [`AudioEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Effect node types the chain instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Resonant low-pass filter.
    LowPass,
    /// Waveshaping distortion with its own dry/wet.
    Distortion,
    /// Static gain stage.
    Gain,
    /// Dynamics compressor.
    Compressor,
    /// Convolution-style reverb with dry/wet.
    Reverb,
}

impl NodeKind {
    /// Lowercase name used in logs and CLI output.
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::LowPass => "lowpass",
            NodeKind::Distortion => "distortion",
            NodeKind::Gain => "gain",
            NodeKind::Compressor => "compressor",
            NodeKind::Reverb => "reverb",
        }
    }
}

/// Per-node parameter addressed by [`AudioEngine::set_param`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeParam {
    /// Filter cutoff in Hz.
    Frequency,
    /// Dry/wet blend, 0 = dry, 1 = wet.
    DryWet,
    /// Waveshaper drive amount.
    Drive,
    /// Linear gain multiplier.
    Gain,
    /// Compressor threshold in dB.
    Threshold,
    /// Compressor ratio.
    Ratio,
    /// Compressor attack in seconds.
    Attack,
    /// Compressor release in seconds.
    Release,
    /// Reverb tail length in seconds.
    DecaySeconds,
    /// Reverb decay curve rate.
    DecayRate,
    /// Reverb send level.
    SendLevel,
}

impl NodeParam {
    /// Number of variants, for engines that store parameters in fixed tables.
    pub const COUNT: usize = 11;

    /// Every parameter in index order.
    pub const ALL: [NodeParam; Self::COUNT] = [
        NodeParam::Frequency,
        NodeParam::DryWet,
        NodeParam::Drive,
        NodeParam::Gain,
        NodeParam::Threshold,
        NodeParam::Ratio,
        NodeParam::Attack,
        NodeParam::Release,
        NodeParam::DecaySeconds,
        NodeParam::DecayRate,
        NodeParam::SendLevel,
    ];

    /// Dense index in `0..COUNT`.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name used in logs and CLI output.
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeParam::Frequency => "frequency",
            NodeParam::DryWet => "dry_wet",
            NodeParam::Drive => "drive",
            NodeParam::Gain => "gain",
            NodeParam::Threshold => "threshold",
            NodeParam::Ratio => "ratio",
            NodeParam::Attack => "attack",
            NodeParam::Release => "release",
            NodeParam::DecaySeconds => "decay_s",
            NodeParam::DecayRate => "decay_rate",
            NodeParam::SendLevel => "send",
        }
    }
}

/// Oversampling curve identifier for the waveshaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaveshapeCurve {
    /// No oversampling.
    None,
    /// 2x oversampling.
    #[default]
    Oversample2x,
    /// 4x oversampling.
    Oversample4x,
}

impl WaveshapeCurve {
    /// Engine-facing identifier (`"none"`, `"2x"`, `"4x"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            WaveshapeCurve::None => "none",
            WaveshapeCurve::Oversample2x => "2x",
            WaveshapeCurve::Oversample4x => "4x",
        }
    }
}

/// One side of a connection in the engine graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// The loaded sound source.
    Source,
    /// An effect node.
    Node(NodeId),
    /// The master output bus (after master gain).
    Master,
}

/// Where an observer is attached to the signal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapPoint {
    /// Before the first effect stage.
    PreChain,
    /// After the master output gain.
    PostChain,
}

impl TapPoint {
    /// Both tap points, pre first.
    pub const ALL: [TapPoint; 2] = [TapPoint::PreChain, TapPoint::PostChain];

    /// Dense index, `PreChain = 0`.
    pub const fn index(self) -> usize {
        match self {
            TapPoint::PreChain => 0,
            TapPoint::PostChain => 1,
        }
    }
}

/// Errors reported by engine implementations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine has not been activated by an explicit user action.
    #[error("audio engine has not been activated")]
    NotActivated,

    /// The node handle does not belong to this engine.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The engine refused to create or connect a node.
    #[error("graph operation rejected: {0}")]
    Graph(String),

    /// Capture could not be started or stopped.
    #[error("capture failed: {0}")]
    Capture(String),

    /// Writing an exported artifact failed.
    #[error("failed to export '{destination}': {source}")]
    Export {
        /// Requested artifact name.
        destination: String,
        /// Underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl EngineError {
    /// Create an export error.
    pub fn export(
        destination: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        EngineError::Export {
            destination: destination.into(),
            source: source.into(),
        }
    }
}

/// Graph construction, per-node parameters, and transport.
///
/// Implementations must tolerate [`set_param`](Self::set_param) being called every
/// frame with unchanged values.
pub trait AudioEngine {
    /// Explicit activation (the permission gate). Must be triggered by a user action
    /// before the engine may touch audio hardware.
    fn activate(&mut self) -> Result<(), EngineError>;

    /// Whether [`activate`](Self::activate) has succeeded.
    fn is_activated(&self) -> bool;

    /// Loads a named source for playback.
    fn load_source(&mut self, name: &str) -> Result<(), EngineError>;

    /// Starts playback of the loaded source.
    fn play(&mut self) -> Result<(), EngineError>;

    /// Stops playback. Never fails.
    fn stop(&mut self);

    /// Whether the source is playing.
    fn is_playing(&self) -> bool;

    /// Instantiates an effect node.
    fn create_node(&mut self, kind: NodeKind) -> Result<NodeId, EngineError>;

    /// Connects two endpoints.
    fn connect(&mut self, from: Endpoint, to: Endpoint) -> Result<(), EngineError>;

    /// Removes every connection touching `node`.
    fn disconnect(&mut self, node: NodeId);

    /// Writes a node parameter. Unknown nodes are ignored.
    fn set_param(&mut self, node: NodeId, param: NodeParam, value: f32);

    /// Selects the waveshaping curve of a distortion node.
    fn set_curve(&mut self, node: NodeId, curve: WaveshapeCurve);

    /// Sets the master output gain.
    fn set_master_gain(&mut self, gain: f32);
}

/// Read-only spectrum and level observation at a tap point.
pub trait AnalysisEngine {
    /// Number of spectrum bins every frame carries.
    fn bin_count(&self) -> usize;

    /// Copies the most recent normalized spectrum (`[0, 1]` per bin) into `bins`.
    ///
    /// Copies `min(bins.len(), bin_count())` values; the rest of `bins` is untouched.
    fn read_spectrum(&self, tap: TapPoint, bins: &mut [f32]);

    /// Most recent envelope level (non-negative).
    fn read_level(&self, tap: TapPoint) -> f32;
}

/// Capture of a tap point into a shared buffer, plus file export.
pub trait RecorderEngine {
    /// Explicit activation, granted by the same user action as
    /// [`AudioEngine::activate`].
    fn activate(&mut self) -> Result<(), EngineError>;

    /// Whether the engine has been activated. Capture is refused otherwise.
    fn is_activated(&self) -> bool;

    /// Begins appending samples from `tap` into `target`.
    ///
    /// Any capture already in progress is abandoned.
    fn begin_capture(&mut self, tap: TapPoint, target: Arc<CaptureBuffer>)
    -> Result<(), EngineError>;

    /// Stops appending. The engine may still flush buffered samples into the target
    /// after this returns; it calls [`CaptureBuffer::mark_flushed`] when done.
    fn end_capture(&mut self) -> Result<(), EngineError>;

    /// Writes `buffer` to the artifact named `destination`. Returns its location.
    fn export(&mut self, buffer: &CaptureBuffer, destination: &str)
    -> Result<PathBuf, EngineError>;
}
