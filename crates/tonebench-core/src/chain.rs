//! Signal-chain controller: maps a [`ParameterModel`] onto a fixed effect graph.
//!
//! The topology is built once and never changes:
//!
//! ```text
//! source ─▶ low-pass ─▶ distortion ─▶ make-up gain ─▶ compressor ─▶ reverb ─▶ master
//!                                                                  (send/return)
//! ```
//!
//! Only per-node parameters change at runtime. [`SignalChain::apply`] writes the whole
//! model every time it is called. It does not diff, so calling it every frame with an
//! unchanged model is the expected usage.
//!
//! # Distortion dead zone
//!
//! Below [`DISTORTION_EPSILON`] the waveshaper is fully bypassed (dry/wet 0, drive
//! [`NEUTRAL_DRIVE`]). At or above it the stage is fully wet with drive equal to the
//! amount. There is no crossfade between the two.
//!
//! ```rust
//! use tonebench_core::chain::{DISTORTION_EPSILON, distortion_setting};
//!
//! assert_eq!(distortion_setting(0.0009).dry_wet, 0.0);
//! assert_eq!(distortion_setting(DISTORTION_EPSILON).dry_wet, 1.0);
//! assert_eq!(distortion_setting(0.5).drive, 0.5);
//! ```

use crate::engine::{
    AudioEngine, Endpoint, EngineError, NodeId, NodeKind, NodeParam, WaveshapeCurve,
};
use crate::param::ParameterModel;

/// Amounts strictly below this bypass the distortion stage.
pub const DISTORTION_EPSILON: f32 = 0.001;

/// Drive written while the distortion stage is bypassed.
pub const NEUTRAL_DRIVE: f32 = 0.0;

/// Dry/wet and drive for the distortion node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionSetting {
    /// 0 when bypassed, 1 otherwise.
    pub dry_wet: f32,
    /// Waveshaper drive.
    pub drive: f32,
}

impl DistortionSetting {
    /// Whether this setting bypasses the stage.
    pub fn is_bypassed(&self) -> bool {
        self.dry_wet == 0.0
    }
}

/// Resolves the dead-zone policy for a distortion amount.
#[inline]
pub fn distortion_setting(amount: f32) -> DistortionSetting {
    if amount < DISTORTION_EPSILON {
        DistortionSetting {
            dry_wet: 0.0,
            drive: NEUTRAL_DRIVE,
        }
    } else {
        DistortionSetting {
            dry_wet: 1.0,
            drive: amount,
        }
    }
}

/// Values written once at construction and never touched again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainConstants {
    /// Linear gain of the make-up stage after the waveshaper.
    pub makeup_gain: f32,
    /// Compressor attack in seconds.
    pub compressor_attack_s: f32,
    /// Compressor release in seconds.
    pub compressor_release_s: f32,
    /// Reverb tail length in seconds.
    pub reverb_decay_s: f32,
    /// Reverb decay curve rate.
    pub reverb_decay_rate: f32,
    /// Reverb send level.
    pub reverb_send: f32,
    /// Waveshaper oversampling curve.
    pub curve: WaveshapeCurve,
}

impl Default for ChainConstants {
    fn default() -> Self {
        Self {
            makeup_gain: 2.5,
            compressor_attack_s: 0.003,
            compressor_release_s: 0.25,
            reverb_decay_s: 2.5,
            reverb_decay_rate: 2.0,
            reverb_send: 1.0,
            curve: WaveshapeCurve::Oversample2x,
        }
    }
}

/// The chain's stages in signal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Low-pass filter.
    Filter,
    /// Waveshaper.
    Distortion,
    /// Fixed make-up gain.
    Makeup,
    /// Compressor.
    Compressor,
    /// Reverb.
    Reverb,
}

impl Stage {
    /// All stages in signal order.
    pub const ALL: [Stage; 5] = [
        Stage::Filter,
        Stage::Distortion,
        Stage::Makeup,
        Stage::Compressor,
        Stage::Reverb,
    ];

    /// Node type instantiated for this stage.
    pub const fn kind(self) -> NodeKind {
        match self {
            Stage::Filter => NodeKind::LowPass,
            Stage::Distortion => NodeKind::Distortion,
            Stage::Makeup => NodeKind::Gain,
            Stage::Compressor => NodeKind::Compressor,
            Stage::Reverb => NodeKind::Reverb,
        }
    }
}

/// Node handles for every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainNodes {
    /// Low-pass filter node.
    pub filter: NodeId,
    /// Waveshaper node.
    pub distortion: NodeId,
    /// Make-up gain node.
    pub makeup: NodeId,
    /// Compressor node.
    pub compressor: NodeId,
    /// Reverb node.
    pub reverb: NodeId,
}

impl ChainNodes {
    /// Node handle for `stage`.
    pub fn get(&self, stage: Stage) -> NodeId {
        match stage {
            Stage::Filter => self.filter,
            Stage::Distortion => self.distortion,
            Stage::Makeup => self.makeup,
            Stage::Compressor => self.compressor,
            Stage::Reverb => self.reverb,
        }
    }

    /// `(stage, node)` pairs in signal order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, NodeId)> + '_ {
        Stage::ALL.into_iter().map(|stage| (stage, self.get(stage)))
    }
}

/// Owns the engine handle and the fixed effect topology.
#[derive(Debug)]
pub struct SignalChain<E: AudioEngine> {
    engine: E,
    nodes: ChainNodes,
    constants: ChainConstants,
    applied: ParameterModel,
}

impl<E: AudioEngine> SignalChain<E> {
    /// Builds the graph, writes the fixed constants, and applies the default model.
    ///
    /// If wiring fails part way, nodes created so far are disconnected before the
    /// error is returned.
    pub fn new(mut engine: E, constants: ChainConstants) -> Result<Self, EngineError> {
        let nodes = build_graph(&mut engine)?;

        engine.set_param(nodes.makeup, NodeParam::Gain, constants.makeup_gain);
        engine.set_param(nodes.compressor, NodeParam::Attack, constants.compressor_attack_s);
        engine.set_param(nodes.compressor, NodeParam::Release, constants.compressor_release_s);
        engine.set_param(nodes.reverb, NodeParam::DecaySeconds, constants.reverb_decay_s);
        engine.set_param(nodes.reverb, NodeParam::DecayRate, constants.reverb_decay_rate);
        engine.set_param(nodes.reverb, NodeParam::SendLevel, constants.reverb_send);
        engine.set_curve(nodes.distortion, constants.curve);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            filter = %nodes.filter,
            distortion = %nodes.distortion,
            makeup = %nodes.makeup,
            compressor = %nodes.compressor,
            reverb = %nodes.reverb,
            "signal chain wired"
        );

        let mut chain = Self {
            engine,
            nodes,
            constants,
            applied: ParameterModel::default(),
        };
        chain.apply(&ParameterModel::default());
        Ok(chain)
    }

    /// Writes every parameter of `model` to the engine.
    ///
    /// The model is clamped again here, so a value outside its domain can never reach
    /// the engine. Idempotent and allocation-free.
    pub fn apply(&mut self, model: &ParameterModel) {
        let model = model.clamped();
        let nodes = self.nodes;
        let engine = &mut self.engine;

        engine.set_param(nodes.filter, NodeParam::Frequency, model.cutoff_hz());

        let dist = distortion_setting(model.distortion_amount());
        engine.set_param(nodes.distortion, NodeParam::DryWet, dist.dry_wet);
        engine.set_param(nodes.distortion, NodeParam::Drive, dist.drive);
        engine.set_curve(nodes.distortion, self.constants.curve);

        engine.set_param(
            nodes.compressor,
            NodeParam::Threshold,
            model.compressor_threshold_db(),
        );
        engine.set_param(nodes.compressor, NodeParam::Ratio, model.compressor_ratio());
        engine.set_param(nodes.reverb, NodeParam::DryWet, model.reverb_mix());
        engine.set_master_gain(model.master_volume());

        self.applied = model;
    }

    /// The last model written to the engine.
    pub fn applied(&self) -> &ParameterModel {
        &self.applied
    }

    /// Fixed stage to node mapping.
    pub fn node_ids(&self) -> &ChainNodes {
        &self.nodes
    }

    /// Constants written at construction.
    pub fn constants(&self) -> &ChainConstants {
        &self.constants
    }

    /// Shared access to the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Exclusive access to the engine, for transport calls.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Consumes the chain and returns the engine.
    pub fn into_engine(self) -> E {
        self.engine
    }
}

fn build_graph<E: AudioEngine>(engine: &mut E) -> Result<ChainNodes, EngineError> {
    let mut created: Vec<NodeId> = Vec::with_capacity(Stage::ALL.len());
    let result = wire(engine, &mut created);
    if result.is_err() {
        for node in &created {
            engine.disconnect(*node);
        }
    }
    result
}

fn wire<E: AudioEngine>(
    engine: &mut E,
    created: &mut Vec<NodeId>,
) -> Result<ChainNodes, EngineError> {
    for stage in Stage::ALL {
        created.push(engine.create_node(stage.kind())?);
    }
    let nodes = ChainNodes {
        filter: created[0],
        distortion: created[1],
        makeup: created[2],
        compressor: created[3],
        reverb: created[4],
    };

    let mut prev = Endpoint::Source;
    for (_, node) in nodes.iter() {
        engine.connect(prev, Endpoint::Node(node))?;
        prev = Endpoint::Node(node);
    }
    engine.connect(prev, Endpoint::Master)?;
    Ok(nodes)
}
