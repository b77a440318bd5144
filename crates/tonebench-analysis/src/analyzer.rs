//! Rolling spectrum and level analyzer for the two tap points.
//!
//! [`RollingAnalyzer`] is an [`AnalysisEngine`]: whoever owns the audio pushes blocks
//! of samples per tap, and readers copy the most recent frame out. Each tap keeps a
//! ring of the last `fft_size` samples. After every push the frame is recomputed:
//!
//! 1. Hann window over the ring (oldest sample first)
//! 2. Forward FFT, `fft_size / 2` magnitude bins scaled by `1 / fft_size`
//! 3. Each bin to dB, then mapped linearly from `[min_db, max_db]` to `[0, 1]`
//! 4. RMS of the ring as the level
//!
//! Reads never recompute. They return whatever the last push produced.

use tonebench_core::{AnalysisEngine, TapPoint};

use crate::dynamics::rms;
use crate::fft::{MagnitudeFft, Window, db_to_unit, magnitude_to_db};

/// Default FFT size (bins = 512).
pub const DEFAULT_FFT_SIZE: usize = 1024;
/// Default dB value mapped to 0.
pub const DEFAULT_MIN_DB: f32 = -100.0;
/// Default dB value mapped to 1.
pub const DEFAULT_MAX_DB: f32 = -30.0;

/// Settings for a [`RollingAnalyzer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    /// FFT size in samples. Rounded up to a power of two, minimum 32.
    pub fft_size: usize,
    /// Level mapped to bin value 0.
    pub min_db: f32,
    /// Level mapped to bin value 1.
    pub max_db: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: DEFAULT_FFT_SIZE,
            min_db: DEFAULT_MIN_DB,
            max_db: DEFAULT_MAX_DB,
        }
    }
}

#[derive(Debug)]
struct TapRing {
    ring: Vec<f32>,
    pos: usize,
    bins: Vec<f32>,
    level: f32,
}

impl TapRing {
    fn new(fft_size: usize) -> Self {
        Self {
            ring: vec![0.0; fft_size],
            pos: 0,
            bins: vec![0.0; fft_size / 2],
            level: 0.0,
        }
    }

    fn write(&mut self, block: &[f32]) {
        let n = self.ring.len();
        // Only the newest `n` samples can survive.
        let block = &block[block.len().saturating_sub(n)..];
        for &x in block {
            self.ring[self.pos] = if x.is_finite() { x } else { 0.0 };
            self.pos = (self.pos + 1) % n;
        }
    }

    fn clear(&mut self) {
        self.ring.fill(0.0);
        self.bins.fill(0.0);
        self.pos = 0;
        self.level = 0.0;
    }
}

/// Per-tap ring buffers plus the last computed frame for each.
#[derive(Debug)]
pub struct RollingAnalyzer {
    config: AnalyzerConfig,
    fft: MagnitudeFft,
    taps: [TapRing; 2],
    linear: Vec<f32>,
    mags: Vec<f32>,
}

impl RollingAnalyzer {
    /// Creates an analyzer. Every bin and level starts at 0.
    pub fn new(config: AnalyzerConfig) -> Self {
        let fft_size = config.fft_size.max(32).next_power_of_two();
        let config = AnalyzerConfig { fft_size, ..config };
        tracing::debug!(
            fft_size,
            min_db = config.min_db,
            max_db = config.max_db,
            "analyzer created"
        );
        Self {
            config,
            fft: MagnitudeFft::new(fft_size, Window::Hann),
            taps: [TapRing::new(fft_size), TapRing::new(fft_size)],
            linear: vec![0.0; fft_size],
            mags: vec![0.0; fft_size / 2],
        }
    }

    /// Effective configuration (after rounding the FFT size).
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Appends a block to `tap`'s ring and recomputes its frame.
    pub fn push(&mut self, tap: TapPoint, block: &[f32]) {
        if block.is_empty() {
            return;
        }
        let state = &mut self.taps[tap.index()];
        state.write(block);

        let n = state.ring.len();
        let (newer, older) = state.ring.split_at(state.pos);
        self.linear[..older.len()].copy_from_slice(older);
        self.linear[older.len()..n].copy_from_slice(newer);

        state.level = rms(&self.linear);
        self.fft.magnitudes(&self.linear, &mut self.mags);
        let (min_db, max_db) = (self.config.min_db, self.config.max_db);
        for (bin, &mag) in state.bins.iter_mut().zip(&self.mags) {
            *bin = db_to_unit(magnitude_to_db(mag), min_db, max_db);
        }
    }

    /// Zeroes both rings and frames.
    pub fn reset(&mut self) {
        for tap in &mut self.taps {
            tap.clear();
        }
    }
}

impl Default for RollingAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl AnalysisEngine for RollingAnalyzer {
    fn bin_count(&self) -> usize {
        self.config.fft_size / 2
    }

    fn read_spectrum(&self, tap: TapPoint, bins: &mut [f32]) {
        let frame = &self.taps[tap.index()].bins;
        let n = bins.len().min(frame.len());
        bins[..n].copy_from_slice(&frame[..n]);
    }

    fn read_level(&self, tap: TapPoint) -> f32 {
        self.taps[tap.index()].level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, amp: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| amp * (2.0 * PI * freq * i as f32 / 48000.0).sin())
            .collect()
    }

    #[test]
    fn fft_size_rounds_to_power_of_two() {
        let a = RollingAnalyzer::new(AnalyzerConfig {
            fft_size: 1000,
            ..AnalyzerConfig::default()
        });
        assert_eq!(a.config().fft_size, 1024);
        assert_eq!(a.bin_count(), 512);
    }

    #[test]
    fn taps_are_independent() {
        let mut a = RollingAnalyzer::default();
        a.push(TapPoint::PreChain, &sine(1000.0, 0.5, 1024));
        assert!(a.read_level(TapPoint::PreChain) > 0.3);
        assert_eq!(a.read_level(TapPoint::PostChain), 0.0);

        let mut bins = vec![0.0; a.bin_count()];
        a.read_spectrum(TapPoint::PostChain, &mut bins);
        assert!(bins.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn spectrum_peaks_near_tone() {
        let mut a = RollingAnalyzer::default();
        // Quiet enough that the peak does not saturate at max_db.
        a.push(TapPoint::PostChain, &sine(3000.0, 0.001, 2048));
        let mut bins = vec![0.0; a.bin_count()];
        a.read_spectrum(TapPoint::PostChain, &mut bins);

        let (peak, _) = bins
            .iter()
            .enumerate()
            .fold((0, 0.0_f32), |best, (i, &b)| if b > best.1 { (i, b) } else { best });
        let expected = (3000.0 * 1024.0 / 48000.0_f32).round() as usize;
        assert!(peak.abs_diff(expected) <= 1, "peak {peak}, expected {expected}");
        assert!(bins.iter().all(|&b| (0.0..=1.0).contains(&b)));
    }

    #[test]
    fn short_reads_copy_prefix_only() {
        let mut a = RollingAnalyzer::default();
        a.push(TapPoint::PreChain, &[0.25; 1024]);
        let mut bins = [9.0_f32; 4];
        a.read_spectrum(TapPoint::PreChain, &mut bins);
        assert!(bins.iter().all(|&b| b <= 1.0));
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let mut a = RollingAnalyzer::default();
        a.push(TapPoint::PreChain, &[f32::NAN, f32::INFINITY, 0.0]);
        assert!(a.read_level(TapPoint::PreChain).is_finite());
    }
}
