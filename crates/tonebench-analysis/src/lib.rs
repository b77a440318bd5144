//! tonebench Analysis - spectrum and level observation at the tap points
//!
//! - [`fft`] - Windowed FFT producing normalized magnitude bins
//! - [`dynamics`] - RMS, peak, and crest factor
//! - [`analyzer`] - [`RollingAnalyzer`], an `AnalysisEngine` fed with sample blocks
//! - [`taps`] - [`AnalysisTaps`], the smoothed pre/post observers polled once per frame
//!
//! ## Example
//!
//! ```rust
//! use tonebench_analysis::{AnalysisTaps, RollingAnalyzer};
//! use tonebench_core::TapPoint;
//!
//! let mut engine = RollingAnalyzer::default();
//! let mut taps = AnalysisTaps::default();
//!
//! // Every frame: feed the engine, then poll.
//! engine.push(TapPoint::PreChain, &[0.1; 256]);
//! engine.push(TapPoint::PostChain, &[0.08; 256]);
//! taps.poll(&engine);
//!
//! let pre = taps.snapshot_pre();
//! let post = taps.snapshot_post();
//! assert!(pre.amplitude >= post.amplitude);
//! ```

pub mod analyzer;
pub mod dynamics;
pub mod fft;
pub mod taps;

pub use analyzer::{AnalyzerConfig, RollingAnalyzer};
pub use dynamics::{crest_factor, peak, peak_db, rms, rms_db};
pub use fft::{MagnitudeFft, Window, bin_frequency, db_to_unit};
pub use taps::{AnalysisSnapshot, AnalysisTaps, DEFAULT_SMOOTHING, Spectrum};
