//! Audio file I/O and recording for tonebench.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav_mono`] and [`write_wav_mono`] for loading sources and
//!   saving takes
//! - **Recording**: [`RecordingController`], the `Idle → Recording → Stopping → Ready`
//!   state machine with a pluggable [`SettlePolicy`]
//! - **Capture engine**: [`WavRecorder`], a [`RecorderEngine`](tonebench_core::RecorderEngine)
//!   that writes takes to disk
//! - **Time**: [`Clock`] with [`SystemClock`] and [`ManualClock`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tonebench_io::{RecordingController, SettlePolicy, SystemClock, WavRecorder, read_wav_mono};
//!
//! let source = read_wav_mono("guitar.wav")?;
//!
//! let mut recorder = WavRecorder::new("takes");
//! recorder.activate();
//! let mut rec = RecordingController::new(
//!     recorder,
//!     SystemClock::new(),
//!     SettlePolicy::default(),
//!     source.sample_rate,
//! );
//!
//! rec.start();
//! rec.engine_mut().push_post_chain(&source.samples);
//! rec.stop();
//! // ... once per frame:
//! if rec.can_export() {
//!     rec.export("take-1");
//! }
//! ```

mod clock;
mod recorder;
mod wav;
mod wav_recorder;

pub use clock::{Clock, ManualClock, SystemClock};
pub use recorder::{
    DEFAULT_FLUSH_TIMEOUT, DEFAULT_SETTLE_DELAY, RecordingController, RecordingState,
    SettlePolicy,
};
pub use wav::{MonoAudio, WavFormat, WavInfo, read_wav_info, read_wav_mono, write_wav_mono};
pub use wav_recorder::WavRecorder;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export name is empty or would escape the output directory.
    #[error("invalid recording name: {0:?}")]
    InvalidName(String),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
