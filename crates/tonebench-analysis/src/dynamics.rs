//! Level measurement for audio signals
//!
//! - RMS level (linear and dB)
//! - Peak detection
//! - Crest factor (peak-to-RMS ratio)

/// Level reported for silence, in dB.
pub const SILENCE_DB: f32 = -200.0;

/// Compute RMS (Root Mean Square) level of a signal
///
/// Returns RMS value in linear scale (not dB)
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }

    let sum_sq: f32 = signal.iter().map(|&x| x * x).sum();
    (sum_sq / signal.len() as f32).sqrt()
}

/// Compute RMS level in dB
pub fn rms_db(signal: &[f32]) -> f32 {
    to_db(rms(signal))
}

/// Compute peak level (maximum absolute value)
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0_f32, |acc, x| acc.max(x.abs()))
}

/// Compute peak level in dB
pub fn peak_db(signal: &[f32]) -> f32 {
    to_db(peak(signal))
}

/// Compute crest factor (peak-to-RMS ratio)
///
/// Higher values indicate more transient/percussive content.
/// Typical values:
/// - Sine wave: ~1.41 (3 dB)
/// - Music: 4-8 (12-18 dB)
/// - Highly compressed: 2-4 (6-12 dB)
pub fn crest_factor(signal: &[f32]) -> f32 {
    let rms_val = rms(signal);
    if rms_val > 1e-10 {
        peak(signal) / rms_val
    } else {
        0.0
    }
}

/// Linear amplitude to dB, [`SILENCE_DB`] at or below -200 dB.
pub fn to_db(linear: f32) -> f32 {
    if linear > 1e-10 {
        20.0 * linear.log10()
    } else {
        SILENCE_DB
    }
}
