//! Integration tests for tonebench-analysis.
//!
//! Feeds synthetic signals with known properties through `RollingAnalyzer` and
//! observes them through `AnalysisTaps`, the way a session does once per frame.

use std::f32::consts::PI;

use proptest::prelude::*;
use tonebench_analysis::{AnalysisTaps, AnalyzerConfig, RollingAnalyzer, bin_frequency};
use tonebench_core::TapPoint;

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK: usize = 800; // one 60 Hz frame at 48 kHz

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a sine wave at a given frequency and amplitude.
fn sine(freq_hz: f32, num_samples: usize, amplitude: f32) -> Vec<f32> {
    (0..num_samples)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / SAMPLE_RATE).sin())
        .collect()
}

/// Push `signal` block by block, with the post tap scaled by `gain`, polling each frame.
fn run_frames(engine: &mut RollingAnalyzer, taps: &mut AnalysisTaps, signal: &[f32], gain: f32) {
    let mut post = vec![0.0; BLOCK];
    for block in signal.chunks(BLOCK) {
        engine.push(TapPoint::PreChain, block);
        for (o, &x) in post.iter_mut().zip(block) {
            *o = x * gain;
        }
        engine.push(TapPoint::PostChain, &post[..block.len()]);
        taps.poll(engine);
    }
}

// ===========================================================================
// 1. Level tracking
// ===========================================================================

#[test]
fn post_level_follows_gain() {
    let mut engine = RollingAnalyzer::default();
    let mut taps = AnalysisTaps::default();
    run_frames(&mut engine, &mut taps, &sine(440.0, 48000, 0.5), 0.25);

    let pre = taps.amplitude_pre();
    let post = taps.amplitude_post();
    assert!((pre - 0.5 * std::f32::consts::FRAC_1_SQRT_2).abs() < 0.02, "pre {pre}");
    assert!((post / pre - 0.25).abs() < 0.01, "ratio {}", post / pre);
}

#[test]
fn silence_decays_toward_zero() {
    let mut engine = RollingAnalyzer::default();
    let mut taps = AnalysisTaps::default();
    run_frames(&mut engine, &mut taps, &sine(440.0, 24000, 0.5), 1.0);
    let loud = taps.amplitude_post();

    run_frames(&mut engine, &mut taps, &vec![0.0; 48000], 1.0);
    assert!(taps.amplitude_post() < loud * 0.01);
}

// ===========================================================================
// 2. Spectrum
// ===========================================================================

#[test]
fn smoothed_peak_matches_input_frequency() {
    let mut engine = RollingAnalyzer::default();
    let mut taps = AnalysisTaps::default();
    run_frames(&mut engine, &mut taps, &sine(1500.0, 48000, 0.002), 1.0);

    let (bin, value) = taps.peak_bin(TapPoint::PostChain).unwrap();
    let freq = bin_frequency(bin, SAMPLE_RATE, engine.config().fft_size);
    assert!((freq - 1500.0).abs() < 2.0 * SAMPLE_RATE / 1024.0, "peak at {freq} Hz");
    assert!(value > 0.0 && value <= 1.0);
}

#[test]
fn bin_count_follows_config() {
    let engine = RollingAnalyzer::new(AnalyzerConfig {
        fft_size: 2048,
        ..AnalyzerConfig::default()
    });
    let mut taps = AnalysisTaps::default();
    taps.poll(&engine);
    assert_eq!(taps.bin_count(), 1024);
    assert_eq!(taps.spectrum_pre().len(), 1024);
    assert_eq!(taps.snapshot_post().spectrum.len(), 1024);
}

#[test]
fn reset_clears_observers() {
    let mut engine = RollingAnalyzer::default();
    let mut taps = AnalysisTaps::default();
    run_frames(&mut engine, &mut taps, &sine(440.0, 9600, 0.5), 1.0);
    taps.reset();
    engine.reset();
    assert_eq!(taps.amplitude_post(), 0.0);
    assert!(taps.spectrum_post().all(|b| b == 0.0));
    assert_eq!(taps.polls(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever is pushed, every smoothed bin stays in [0, 1] and amplitude stays finite.
    #[test]
    fn observations_stay_normalized(
        samples in prop::collection::vec(-4.0f32..4.0f32, 1..3000),
        smoothing in 0.0f32..1.0f32,
    ) {
        let mut engine = RollingAnalyzer::new(AnalyzerConfig { fft_size: 256, ..AnalyzerConfig::default() });
        let mut taps = AnalysisTaps::new(smoothing);
        for block in samples.chunks(100) {
            engine.push(TapPoint::PreChain, block);
            taps.poll(&engine);
        }
        prop_assert!(taps.spectrum_pre().all(|b| (0.0..=1.0).contains(&b)));
        prop_assert!(taps.amplitude_pre().is_finite() && taps.amplitude_pre() >= 0.0);
    }
}
