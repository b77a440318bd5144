//! Property-based tests for parameter clamping and the distortion dead zone.
//!
//! Every value that reaches the engine must lie inside its control's domain, whatever
//! the caller passed in (including NaN and infinities).

use proptest::prelude::*;
use tonebench_core::{
    ChainConstants, DISTORTION_EPSILON, NEUTRAL_DRIVE, NodeParam, OfflineEngine,
    ParamKind, ParameterModel, SignalChain,
};

fn any_f32() -> impl Strategy<Value = f32> {
    prop_oneof![
        prop::num::f32::ANY,
        -1.0e6f32..1.0e6f32,
        Just(f32::NAN),
        Just(f32::INFINITY),
        Just(f32::NEG_INFINITY),
    ]
}

fn logged_chain() -> SignalChain<OfflineEngine> {
    let engine = OfflineEngine::new(48000).with_write_log();
    SignalChain::new(engine, ChainConstants::default()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Whatever the inputs, every stored field is inside its descriptor range.
    #[test]
    fn model_fields_always_in_domain(
        values in prop::array::uniform6(any_f32()),
    ) {
        let model = ParameterModel::new(
            values[0], values[1], values[2], values[3], values[4], values[5],
        );
        for (kind, value) in model.iter() {
            let desc = kind.descriptor();
            prop_assert!(desc.contains(value), "{} = {} outside [{}, {}]", kind, value, desc.min, desc.max);
        }
    }

    /// Setting controls one at a time clamps the same way the constructor does.
    #[test]
    fn set_matches_constructor(
        values in prop::array::uniform6(any_f32()),
    ) {
        let mut model = ParameterModel::default();
        for (kind, &v) in ParamKind::ALL.iter().zip(values.iter()) {
            model.set(*kind, v);
        }
        let built = ParameterModel::new(
            values[0], values[1], values[2], values[3], values[4], values[5],
        );
        prop_assert_eq!(model, built);
    }

    /// No write issued by `apply` carries an out-of-domain value.
    #[test]
    fn apply_never_forwards_out_of_domain(
        values in prop::array::uniform6(any_f32()),
    ) {
        let mut chain = logged_chain();
        chain.engine_mut().clear_writes();

        let mut model = ParameterModel::default();
        for (kind, &v) in ParamKind::ALL.iter().zip(values.iter()) {
            model.set(*kind, v);
        }
        chain.apply(&model);

        for write in chain.engine().writes() {
            prop_assert!(write.value.is_finite(), "{:?}", write);
            let (lo, hi) = match write.param {
                NodeParam::Frequency => (80.0, 20000.0),
                NodeParam::Threshold => (-80.0, 0.0),
                NodeParam::Ratio => (1.0, 20.0),
                NodeParam::DryWet | NodeParam::Drive => (0.0, 1.0),
                _ => continue,
            };
            prop_assert!(write.value >= lo && write.value <= hi, "{:?}", write);
        }
        let gain = chain.engine().master_gain();
        prop_assert!((0.0..=1.0).contains(&gain));
    }

    /// Below epsilon: bypassed with neutral drive. At or above: wet with drive = amount.
    #[test]
    fn distortion_dead_zone(amount in 0.0f32..=1.0f32) {
        let mut chain = logged_chain();
        chain.apply(&ParameterModel::default().with(ParamKind::Distortion, amount));
        let node = chain.node_ids().distortion;
        let dry_wet = chain.engine().param(node, NodeParam::DryWet);
        let drive = chain.engine().param(node, NodeParam::Drive);

        if amount < DISTORTION_EPSILON {
            prop_assert_eq!(dry_wet, Some(0.0));
            prop_assert_eq!(drive, Some(NEUTRAL_DRIVE));
        } else {
            prop_assert_eq!(dry_wet, Some(1.0));
            prop_assert_eq!(drive, Some(amount));
        }
    }

    /// Applying the same model twice leaves the engine exactly as after the first.
    #[test]
    fn apply_idempotent(values in prop::array::uniform6(any_f32())) {
        let model = ParameterModel::new(
            values[0], values[1], values[2], values[3], values[4], values[5],
        );
        let mut chain = logged_chain();
        chain.apply(&model);
        let first = chain.engine().snapshot();
        chain.apply(&model);
        prop_assert_eq!(chain.engine().snapshot(), first);
    }
}
