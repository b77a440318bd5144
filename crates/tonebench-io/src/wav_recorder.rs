//! File-backed [`RecorderEngine`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tonebench_core::{CaptureBuffer, EngineError, RecorderEngine, TapPoint};

use crate::wav::write_wav_mono;
use crate::{Error, Result};

/// Captures pushed sample blocks and exports them as mono 32-bit float WAV files.
///
/// The recorder has no audio thread of its own. Whoever renders audio pushes each
/// block with [`push`](Self::push) or [`push_post_chain`](Self::push_post_chain).
#[derive(Debug)]
pub struct WavRecorder {
    output_dir: PathBuf,
    activated: bool,
    target: Option<(TapPoint, Arc<CaptureBuffer>)>,
}

impl WavRecorder {
    /// Creates an inactive recorder that exports into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            activated: false,
            target: None,
        }
    }

    /// Grants capture permission.
    pub fn activate(&mut self) {
        if !self.activated {
            tracing::debug!(dir = %self.output_dir.display(), "wav recorder activated");
        }
        self.activated = true;
    }

    /// Export directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether a capture target is bound.
    pub fn is_capturing(&self) -> bool {
        self.target.is_some()
    }

    /// Appends `block` if it comes from the tap being captured.
    pub fn push(&mut self, tap: TapPoint, block: &[f32]) {
        if let Some((bound, buffer)) = &self.target
            && *bound == tap
        {
            buffer.append(block);
        }
    }

    /// Appends a post-chain block.
    pub fn push_post_chain(&mut self, block: &[f32]) {
        self.push(TapPoint::PostChain, block);
    }

    /// Resolves an export name to a path inside the output directory.
    ///
    /// Appends `.wav` unless the name already ends with it. Names that are blank,
    /// contain a path separator, or are `.`/`..` are rejected.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let name = name.trim();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
            || name.contains('\0')
        {
            return Err(Error::InvalidName(name.to_string()));
        }
        let file = if name.to_ascii_lowercase().ends_with(".wav") {
            name.to_string()
        } else {
            format!("{name}.wav")
        };
        Ok(self.output_dir.join(file))
    }

    fn write_take(&self, buffer: &CaptureBuffer, name: &str) -> Result<PathBuf> {
        let path = self.resolve(name)?;
        std::fs::create_dir_all(&self.output_dir)?;
        buffer.with_samples(|samples| write_wav_mono(&path, samples, buffer.sample_rate()))?;
        Ok(path)
    }
}

impl RecorderEngine for WavRecorder {
    fn activate(&mut self) -> std::result::Result<(), EngineError> {
        WavRecorder::activate(self);
        Ok(())
    }

    fn is_activated(&self) -> bool {
        self.activated
    }

    fn begin_capture(
        &mut self,
        tap: TapPoint,
        target: Arc<CaptureBuffer>,
    ) -> std::result::Result<(), EngineError> {
        if !self.activated {
            return Err(EngineError::NotActivated);
        }
        if let Some((_, previous)) = self.target.replace((tap, target)) {
            previous.mark_flushed();
        }
        Ok(())
    }

    fn end_capture(&mut self) -> std::result::Result<(), EngineError> {
        match self.target.take() {
            Some((_, buffer)) => {
                buffer.mark_flushed();
                Ok(())
            }
            None => Err(EngineError::Capture("no capture in progress".into())),
        }
    }

    fn export(
        &mut self,
        buffer: &CaptureBuffer,
        destination: &str,
    ) -> std::result::Result<PathBuf, EngineError> {
        self.write_take(buffer, destination)
            .map_err(|e| EngineError::export(destination, e))
    }
}
