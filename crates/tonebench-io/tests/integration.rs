//! Integration tests for tonebench-io: WAV I/O and recording through a real file engine.

use std::time::Duration;

use tempfile::{NamedTempFile, TempDir};
use tonebench_core::{AudioEngine, OfflineEngine, RecorderEngine};
use tonebench_io::{
    ManualClock, RecordingController, RecordingState, SettlePolicy, WavRecorder, read_wav_info,
    read_wav_mono, write_wav_mono,
};

/// Generate a sine wave at the given sample rate.
fn sine_wave(sample_rate: u32, freq_hz: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect()
}

type Controller = RecordingController<WavRecorder, ManualClock>;

fn recorder(dir: &TempDir, policy: SettlePolicy) -> (Controller, ManualClock) {
    let mut engine = WavRecorder::new(dir.path());
    engine.activate();
    let clock = ManualClock::new();
    (RecordingController::new(engine, clock.clone(), policy, 48000), clock)
}

#[test]
fn wav_roundtrip_mono_f32_48000() {
    let sr = 48000;
    let samples = sine_wave(sr, 440.0, sr as usize);

    let file = NamedTempFile::new().unwrap();
    write_wav_mono(file.path(), &samples, sr).unwrap();

    let audio = read_wav_mono(file.path()).unwrap();
    assert_eq!(audio.sample_rate, sr);
    assert_eq!(audio.samples.len(), samples.len());
    assert!((audio.duration_secs() - 1.0).abs() < 1e-9);

    for (a, b) in samples.iter().zip(audio.samples.iter()) {
        assert!((a - b).abs() < 1e-6, "sample mismatch: {a} vs {b}");
    }
}

#[test]
fn wav_info_reports_duration() {
    let file = NamedTempFile::new().unwrap();
    write_wav_mono(file.path(), &vec![0.0; 24000], 48000).unwrap();
    let info = read_wav_info(file.path()).unwrap();
    assert_eq!(info.num_frames, 24000);
    assert!((info.duration_secs - 0.5).abs() < 1e-9);
}

/// Render a source through the offline engine, capture the post-chain signal, and export.
#[test]
fn record_offline_render_to_file() {
    let temp = TempDir::new().unwrap();
    let (mut rec, clock) = recorder(&temp, SettlePolicy::default());

    let mut engine = OfflineEngine::new(48000);
    engine.activate().unwrap();
    engine.load_source("sine").unwrap();
    engine.set_master_gain(0.5);
    engine.play().unwrap();

    let input = sine_wave(48000, 220.0, 4800);
    let mut output = vec![0.0; input.len()];

    assert!(rec.start());
    for (block_in, block_out) in input.chunks(480).zip(output.chunks_mut(480)) {
        engine.render(block_in, block_out);
        rec.engine_mut().push_post_chain(block_out);
        clock.advance(Duration::from_millis(10));
        assert_eq!(rec.tick(), RecordingState::Recording);
    }
    assert!(rec.stop());
    assert!(!rec.export("early"));

    while !rec.can_export() {
        clock.advance(Duration::from_millis(16));
        rec.tick();
    }
    assert!(rec.export("take"));

    let path = rec.last_export().unwrap().to_path_buf();
    assert_eq!(path, temp.path().join("take.wav"));
    assert!(!temp.path().join("early.wav").exists());

    let audio = read_wav_mono(&path).unwrap();
    assert_eq!(audio.samples.len(), input.len());
    for (x, y) in input.iter().zip(&audio.samples) {
        assert!((x * 0.5 - y).abs() < 1e-6);
    }
}

/// A take restarted during the settle window is never exported by the first stop.
#[test]
fn restart_during_settle_discards_old_take() {
    let temp = TempDir::new().unwrap();
    let (mut rec, clock) = recorder(&temp, SettlePolicy::default());

    rec.start();
    rec.engine_mut().push_post_chain(&[0.9; 100]);
    rec.stop();
    clock.advance(Duration::from_millis(150));

    assert!(rec.start());
    rec.engine_mut().push_post_chain(&[0.1; 10]);
    clock.advance(Duration::from_millis(100));
    assert_eq!(rec.tick(), RecordingState::Recording);

    rec.stop();
    clock.advance(Duration::from_millis(200));
    assert!(rec.export("second"));
    let audio = read_wav_mono(temp.path().join("second.wav")).unwrap();
    assert_eq!(audio.samples, vec![0.1; 10]);
}

/// The file engine acknowledges flushes on stop, so flush-ack settles immediately.
#[test]
fn flush_ack_with_wav_recorder() {
    let temp = TempDir::new().unwrap();
    let (mut rec, _clock) = recorder(&temp, SettlePolicy::flush_acknowledged());

    rec.start();
    rec.engine_mut().push_post_chain(&[0.2; 32]);
    rec.stop();
    assert!(rec.buffer().unwrap().is_flushed());
    assert!(rec.can_export());
}

/// An export failure leaves the take exportable under another name.
#[test]
fn invalid_name_does_not_lose_take() {
    let temp = TempDir::new().unwrap();
    let (mut rec, clock) = recorder(&temp, SettlePolicy::FixedDelay(Duration::from_millis(5)));

    rec.start();
    rec.engine_mut().push_post_chain(&[0.3; 16]);
    rec.stop();
    clock.advance(Duration::from_millis(5));

    assert!(!rec.export("a/b"));
    assert!(rec.can_export());
    assert!(rec.export("ok"));
    assert!(temp.path().join("ok.wav").is_file());
}

#[test]
fn inactive_recorder_never_starts() {
    let temp = TempDir::new().unwrap();
    let engine = WavRecorder::new(temp.path());
    assert!(!engine.is_activated());
    let mut rec =
        RecordingController::new(engine, ManualClock::new(), SettlePolicy::default(), 48000);
    assert!(!rec.start());
    assert_eq!(rec.state(), RecordingState::Idle);
}
