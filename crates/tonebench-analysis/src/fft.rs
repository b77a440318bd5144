//! FFT wrapper with windowing, producing normalized magnitude bins

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    #[default]
    Hann,
}

impl Window {
    /// Apply window to a buffer
    pub fn apply(&self, buffer: &mut [f32]) {
        let n = buffer.len();
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos());
                    *sample *= w;
                }
            }
        }
    }

    /// Get window coefficients
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        let mut coeffs = vec![1.0; size];
        self.apply(&mut coeffs);
        coeffs
    }
}

/// Fixed-size forward FFT that turns a block of samples into `size / 2` magnitude bins.
///
/// The plan, window, and scratch buffers are allocated once in [`new`](Self::new);
/// [`magnitudes`](Self::magnitudes) does not allocate.
pub struct MagnitudeFft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    size: usize,
}

impl std::fmt::Debug for MagnitudeFft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagnitudeFft").field("size", &self.size).finish_non_exhaustive()
    }
}

impl MagnitudeFft {
    /// Create a new FFT processor for the given size and window
    pub fn new(size: usize, window: Window) -> Self {
        let size = size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            fft,
            window: window.coefficients(size),
            buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
            size,
        }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of magnitude bins produced (`size / 2`, DC up to but excluding Nyquist)
    pub fn bin_count(&self) -> usize {
        self.size / 2
    }

    /// Window, transform, and write linear magnitudes scaled by `1 / size`.
    ///
    /// `input` shorter than the FFT size is zero-padded; longer input is truncated.
    /// Writes `min(out.len(), bin_count())` bins.
    pub fn magnitudes(&mut self, input: &[f32], out: &mut [f32]) {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let x = input.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(x * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let scale = 1.0 / self.size as f32;
        for (o, c) in out.iter_mut().zip(&self.buffer[..self.bin_count()]) {
            *o = c.norm() * scale;
        }
    }
}

/// Convert a linear magnitude to dB, floored at -200 dB
pub fn magnitude_to_db(mag: f32) -> f32 {
    20.0 * mag.max(1e-10).log10()
}

/// Map a dB value linearly from `[min_db, max_db]` onto `[0, 1]`, clamping outside.
pub fn db_to_unit(db: f32, min_db: f32, max_db: f32) -> f32 {
    let range = max_db - min_db;
    if range <= 0.0 || db.is_nan() {
        return 0.0;
    }
    ((db - min_db) / range).clamp(0.0, 1.0)
}

/// Center frequency in Hz of `bin` for an FFT of `fft_size` at `sample_rate`
pub fn bin_frequency(bin: usize, sample_rate: f32, fft_size: usize) -> f32 {
    bin as f32 * sample_rate / fft_size as f32
}
