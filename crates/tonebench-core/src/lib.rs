//! tonebench core: parameter model, engine capabilities, and signal-chain control.
//!
//! This crate holds the pieces every other tonebench crate builds on. It renders no
//! audio; sample processing belongs to an external engine reached through the traits
//! in [`engine`].
//!
//! # Parameters
//!
//! - [`ParameterModel`] - The six tunable controls, clamped on every write
//! - [`ParamKind`] - Names a control; parses from `"comp_ratio"`, `"Ratio"`, etc.
//! - [`ParamDescriptor`] - Range, default, unit, and display metadata
//!
//! # Engine Capabilities
//!
//! - [`AudioEngine`] - Graph construction, node parameters, transport
//! - [`AnalysisEngine`] - Spectrum and level reads at a [`TapPoint`]
//! - [`RecorderEngine`] - Capture into a [`CaptureBuffer`] and export
//!
//! # Signal Chain
//!
//! [`SignalChain`] owns an [`AudioEngine`] and a fixed five-stage topology. Call
//! [`SignalChain::apply`] once per frame with the current model.
//!
//! ```rust
//! use tonebench_core::{ChainConstants, OfflineEngine, ParamKind, ParameterModel, SignalChain};
//!
//! let mut chain = SignalChain::new(OfflineEngine::new(48000), ChainConstants::default())?;
//!
//! let model = ParameterModel::default().with(ParamKind::MasterVolume, 0.5);
//! chain.apply(&model);
//! assert_eq!(chain.engine().master_gain(), 0.5);
//! # Ok::<(), tonebench_core::EngineError>(())
//! ```
//!
//! # Features
//!
//! - `serde` (default) - `Serialize`/`Deserialize` for [`ParameterModel`]
//! - `tracing` - debug events when the chain is wired

pub mod capture;
pub mod chain;
pub mod engine;
pub mod offline;
pub mod param;
pub mod param_info;

pub use capture::CaptureBuffer;
pub use chain::{
    ChainConstants, ChainNodes, DISTORTION_EPSILON, DistortionSetting, NEUTRAL_DRIVE,
    SignalChain, Stage, distortion_setting,
};
pub use engine::{
    AnalysisEngine, AudioEngine, Endpoint, EngineError, NodeId, NodeKind, NodeParam,
    RecorderEngine, TapPoint, WaveshapeCurve,
};
pub use offline::{EngineSnapshot, OfflineEngine, ParamWrite};
pub use param::{ParamKind, ParameterModel, UnknownParam};
pub use param_info::{ParamDescriptor, ParamUnit};
