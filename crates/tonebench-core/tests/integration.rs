//! Integration tests for tonebench-core.
//!
//! Drives the signal chain through the public API against the offline engine and
//! checks what the engine observed: the fixed topology, the constants written once,
//! the dead-zone policy, and the copy semantics of the parameter model.

use tonebench_core::{
    AudioEngine, ChainConstants, Endpoint, NodeKind, NodeParam, OfflineEngine, ParamKind,
    ParameterModel, SignalChain, Stage, WaveshapeCurve,
};

fn chain() -> SignalChain<OfflineEngine> {
    SignalChain::new(OfflineEngine::new(48000).with_write_log(), ChainConstants::default())
        .unwrap()
}

// ============================================================================
// 1. Topology
// ============================================================================

#[test]
fn stages_map_to_expected_node_kinds() {
    let chain = chain();
    for (stage, node) in chain.node_ids().iter() {
        assert_eq!(chain.engine().node_kind(node), Some(stage.kind()), "{stage:?}");
    }
    assert_eq!(chain.engine().node_count(), Stage::ALL.len());
}

#[test]
fn topology_unchanged_by_apply() {
    let mut chain = chain();
    let before = chain.engine().connections().to_vec();
    for cutoff in [80.0, 440.0, 20000.0] {
        chain.apply(&ParameterModel::default().with(ParamKind::Cutoff, cutoff));
    }
    assert_eq!(chain.engine().connections(), before.as_slice());
    assert_eq!(before.first(), Some(&(Endpoint::Source, Endpoint::Node(chain.node_ids().filter))));
    assert_eq!(before.last(), Some(&(Endpoint::Node(chain.node_ids().reverb), Endpoint::Master)));
}

// ============================================================================
// 2. Parameter application
// ============================================================================

#[test]
fn apply_writes_every_control() {
    let mut chain = chain();
    let model = ParameterModel::new(1500.0, 0.7, -30.0, 8.0, 0.4, 0.6);
    chain.apply(&model);

    let e = chain.engine();
    let n = *chain.node_ids();
    assert_eq!(e.param(n.filter, NodeParam::Frequency), Some(1500.0));
    assert_eq!(e.param(n.distortion, NodeParam::DryWet), Some(1.0));
    assert_eq!(e.param(n.distortion, NodeParam::Drive), Some(0.7));
    assert_eq!(e.param(n.compressor, NodeParam::Threshold), Some(-30.0));
    assert_eq!(e.param(n.compressor, NodeParam::Ratio), Some(8.0));
    assert_eq!(e.param(n.reverb, NodeParam::DryWet), Some(0.4));
    assert_eq!(e.master_gain(), 0.6);
}

#[test]
fn fixed_constants_not_rewritten_by_apply() {
    let mut chain = chain();
    chain.engine_mut().clear_writes();
    chain.apply(&ParameterModel::default().with(ParamKind::Distortion, 0.5));

    let fixed = [
        NodeParam::Attack,
        NodeParam::Release,
        NodeParam::DecaySeconds,
        NodeParam::DecayRate,
        NodeParam::SendLevel,
        NodeParam::Gain,
    ];
    assert!(
        chain
            .engine()
            .writes()
            .iter()
            .all(|w| !fixed.contains(&w.param))
    );
}

#[test]
fn custom_constants_are_honored() {
    let constants = ChainConstants {
        makeup_gain: 1.0,
        curve: WaveshapeCurve::Oversample4x,
        ..ChainConstants::default()
    };
    let chain = SignalChain::new(OfflineEngine::new(44100), constants).unwrap();
    let n = chain.node_ids();
    assert_eq!(chain.engine().param(n.makeup, NodeParam::Gain), Some(1.0));
    assert_eq!(chain.engine().curve(n.distortion), Some(WaveshapeCurve::Oversample4x));
}

#[test]
fn clamped_values_reach_engine() {
    let mut chain = chain();
    let mut model = ParameterModel::default();
    model.set(ParamKind::Cutoff, 1.0e9);
    model.set(ParamKind::Threshold, f32::NEG_INFINITY);
    model.set(ParamKind::MasterVolume, f32::NAN);
    chain.apply(&model);

    let n = chain.node_ids();
    assert_eq!(chain.engine().param(n.filter, NodeParam::Frequency), Some(20000.0));
    assert_eq!(chain.engine().param(n.compressor, NodeParam::Threshold), Some(-80.0));
    assert_eq!(chain.engine().master_gain(), 0.8);
}

// ============================================================================
// 3. Copy semantics
// ============================================================================

#[test]
fn applied_model_is_a_copy() {
    let mut chain = chain();
    let mut live = ParameterModel::default().with(ParamKind::ReverbMix, 0.3);
    chain.apply(&live);
    live.set_reverb_mix(0.9);
    assert_eq!(chain.applied().reverb_mix(), 0.3);
}

// ============================================================================
// 4. Transport through the chain
// ============================================================================

#[test]
fn transport_via_engine_mut() {
    let mut chain = chain();
    assert!(!chain.engine().is_activated());
    chain.engine_mut().activate().unwrap();
    chain.engine_mut().load_source("drums.wav").unwrap();
    chain.engine_mut().play().unwrap();
    assert!(chain.engine().is_playing());

    let engine = chain.into_engine();
    assert_eq!(engine.source(), Some("drums.wav"));
    assert_eq!(engine.node_kind(tonebench_core::NodeId(0)), Some(NodeKind::LowPass));
}
