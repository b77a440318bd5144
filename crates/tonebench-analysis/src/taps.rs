//! Smoothed spectrum and amplitude observers at the pre- and post-chain taps.
//!
//! [`AnalysisTaps::poll`] is called once per frame. It pulls the latest frame for both
//! taps from an [`AnalysisEngine`] and folds it into exponentially smoothed state:
//!
//! ```text
//! s[k] = α · s[k] + (1 − α) · new[k]        α = smoothing (0.9 by default)
//! ```
//!
//! The getters only read that state, so any number of reads between two polls agree.
//!
//! # Example
//!
//! ```rust
//! use tonebench_analysis::{AnalysisTaps, RollingAnalyzer};
//! use tonebench_core::TapPoint;
//!
//! let mut engine = RollingAnalyzer::default();
//! engine.push(TapPoint::PostChain, &[0.5; 1024]);
//!
//! let mut taps = AnalysisTaps::default();
//! taps.poll(&engine);
//!
//! assert_eq!(taps.spectrum_post().len(), 512);
//! assert!(taps.amplitude_post() > 0.0);
//! ```

use std::iter::Copied;
use std::slice::Iter;

use tonebench_core::{AnalysisEngine, TapPoint};

/// Default smoothing constant applied across polls.
pub const DEFAULT_SMOOTHING: f32 = 0.9;

/// Owned copy of one tap's smoothed state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisSnapshot {
    /// Normalized magnitude bins, each in `[0, 1]`.
    pub spectrum: Vec<f32>,
    /// Smoothed RMS envelope, non-negative.
    pub amplitude: f32,
}

/// Restartable, fixed-length iterator over smoothed spectrum bins.
#[derive(Debug, Clone)]
pub struct Spectrum<'a> {
    bins: Copied<Iter<'a, f32>>,
}

impl Iterator for Spectrum<'_> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.bins.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.bins.size_hint()
    }
}

impl ExactSizeIterator for Spectrum<'_> {}

#[derive(Debug, Default)]
struct TapState {
    bins: Vec<f32>,
    amplitude: f32,
}

/// Pre- and post-chain observers with shared smoothing.
#[derive(Debug)]
pub struct AnalysisTaps {
    smoothing: f32,
    taps: [TapState; 2],
    frame: Vec<f32>,
    polls: u64,
}

impl Default for AnalysisTaps {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING)
    }
}

impl AnalysisTaps {
    /// Creates observers with smoothing `α`, clamped to `[0, 1)`.
    ///
    /// `α = 0` disables smoothing; NaN falls back to [`DEFAULT_SMOOTHING`].
    pub fn new(smoothing: f32) -> Self {
        let smoothing = if smoothing.is_nan() {
            DEFAULT_SMOOTHING
        } else {
            smoothing.clamp(0.0, 0.999)
        };
        Self {
            smoothing,
            taps: [TapState::default(), TapState::default()],
            frame: Vec::new(),
            polls: 0,
        }
    }

    /// Smoothing constant in use.
    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Number of bins per spectrum (0 before the first poll).
    pub fn bin_count(&self) -> usize {
        self.taps[0].bins.len()
    }

    /// Number of polls since creation or the last [`reset`](Self::reset).
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Pulls the latest frame of both taps and folds it into the smoothed state.
    ///
    /// O(bin count). Allocates only when the engine's bin count changes, in which
    /// case the smoothed state restarts from zero.
    pub fn poll<A: AnalysisEngine + ?Sized>(&mut self, engine: &A) {
        let n = engine.bin_count();
        if self.frame.len() != n {
            tracing::debug!(bins = n, "analysis bin count changed, resetting smoothing");
            self.frame = vec![0.0; n];
            for tap in &mut self.taps {
                tap.bins = vec![0.0; n];
                tap.amplitude = 0.0;
            }
        }

        let a = self.smoothing;
        for tap in TapPoint::ALL {
            self.frame.fill(0.0);
            engine.read_spectrum(tap, &mut self.frame);
            let state = &mut self.taps[tap.index()];
            for (s, &new) in state.bins.iter_mut().zip(&self.frame) {
                let new = if new.is_finite() { new.clamp(0.0, 1.0) } else { 0.0 };
                *s = a * *s + (1.0 - a) * new;
            }
            let level = engine.read_level(tap);
            let level = if level.is_finite() { level.max(0.0) } else { 0.0 };
            state.amplitude = a * state.amplitude + (1.0 - a) * level;
        }
        self.polls += 1;
    }

    /// Smoothed spectrum at `tap`.
    pub fn spectrum(&self, tap: TapPoint) -> Spectrum<'_> {
        Spectrum {
            bins: self.taps[tap.index()].bins.iter().copied(),
        }
    }

    /// Smoothed amplitude at `tap`.
    pub fn amplitude(&self, tap: TapPoint) -> f32 {
        self.taps[tap.index()].amplitude
    }

    /// Smoothed spectrum before the first effect stage.
    pub fn spectrum_pre(&self) -> Spectrum<'_> {
        self.spectrum(TapPoint::PreChain)
    }

    /// Smoothed spectrum after master gain.
    pub fn spectrum_post(&self) -> Spectrum<'_> {
        self.spectrum(TapPoint::PostChain)
    }

    /// Smoothed amplitude before the first effect stage.
    pub fn amplitude_pre(&self) -> f32 {
        self.amplitude(TapPoint::PreChain)
    }

    /// Smoothed amplitude after master gain.
    pub fn amplitude_post(&self) -> f32 {
        self.amplitude(TapPoint::PostChain)
    }

    /// Owned copy of `tap`'s state.
    pub fn snapshot(&self, tap: TapPoint) -> AnalysisSnapshot {
        AnalysisSnapshot {
            spectrum: self.spectrum(tap).collect(),
            amplitude: self.amplitude(tap),
        }
    }

    /// Owned copy of the pre-chain state.
    pub fn snapshot_pre(&self) -> AnalysisSnapshot {
        self.snapshot(TapPoint::PreChain)
    }

    /// Owned copy of the post-chain state.
    pub fn snapshot_post(&self) -> AnalysisSnapshot {
        self.snapshot(TapPoint::PostChain)
    }

    /// Index and value of the loudest smoothed bin. First wins on ties.
    pub fn peak_bin(&self, tap: TapPoint) -> Option<(usize, f32)> {
        self.spectrum(tap)
            .enumerate()
            .fold(None, |best, (i, v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((i, v)),
            })
    }

    /// Clears smoothed state. The next poll starts from zero.
    pub fn reset(&mut self) {
        for tap in &mut self.taps {
            tap.bins.fill(0.0);
            tap.amplitude = 0.0;
        }
        self.polls = 0;
    }
}
