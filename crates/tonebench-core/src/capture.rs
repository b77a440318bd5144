//! Shared capture target written by the engine and read at export time.
//!
//! The recording controller allocates one [`CaptureBuffer`] per take and hands an
//! `Arc` to the recorder engine. The engine appends from its own thread; the control
//! thread only reads once the take is finished. When the engine has written its last
//! sample it calls [`CaptureBuffer::mark_flushed`]. After that the buffer is final
//! and further appends are dropped.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

/// Mono f32 sample buffer with a flush acknowledgment flag.
#[derive(Debug)]
pub struct CaptureBuffer {
    sample_rate: u32,
    samples: Mutex<Vec<f32>>,
    flushed: AtomicBool,
}

impl CaptureBuffer {
    /// Creates an empty buffer for audio at `sample_rate` Hz.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            samples: Mutex::new(Vec::new()),
            flushed: AtomicBool::new(false),
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Appends samples. Returns `false` (and drops them) once flushed.
    pub fn append(&self, block: &[f32]) -> bool {
        if self.is_flushed() {
            return false;
        }
        self.samples.lock().extend_from_slice(block);
        true
    }

    /// Marks the buffer final. Idempotent.
    pub fn mark_flushed(&self) {
        self.flushed.store(true, Ordering::Release);
    }

    /// Whether the engine has acknowledged the final flush.
    pub fn is_flushed(&self) -> bool {
        self.flushed.load(Ordering::Acquire)
    }

    /// Number of captured samples.
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Captured duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / f64::from(self.sample_rate)
    }

    /// Runs `f` with a view of the captured samples, holding the lock for its duration.
    pub fn with_samples<R>(&self, f: impl FnOnce(&[f32]) -> R) -> R {
        f(&self.samples.lock())
    }

    /// Copies the captured samples out.
    pub fn to_vec(&self) -> Vec<f32> {
        self.samples.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn append_until_flushed() {
        let buf = CaptureBuffer::new(48000);
        assert!(buf.append(&[0.1, 0.2]));
        buf.mark_flushed();
        assert!(!buf.append(&[0.3]));
        assert_eq!(buf.to_vec(), vec![0.1, 0.2]);
    }

    #[test]
    fn duration_from_sample_rate() {
        let buf = CaptureBuffer::new(100);
        buf.append(&[0.0; 50]);
        assert!((buf.duration_secs() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn writer_thread_and_reader_agree() {
        let buf = Arc::new(CaptureBuffer::new(48000));
        let writer = Arc::clone(&buf);
        let handle = std::thread::spawn(move || {
            for _ in 0..10 {
                writer.append(&[0.5; 64]);
            }
            writer.mark_flushed();
        });
        handle.join().unwrap();
        assert!(buf.is_flushed());
        assert_eq!(buf.len(), 640);
        buf.with_samples(|s| assert!(s.iter().all(|&x| x == 0.5)));
    }
}
