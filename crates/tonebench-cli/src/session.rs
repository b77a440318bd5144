//! One interactive session: the live parameters, the signal chain, the analysis taps,
//! the recorder, and the preset collection.
//!
//! A front end owns one [`Session`], turns user input into [`Action`]s for
//! [`Session::dispatch`], and calls [`Session::tick`] once per frame.
//!
//! ```rust
//! use tonebench_analysis::{AnalysisTaps, RollingAnalyzer};
//! use tonebench_cli::{Action, Outcome, Session};
//! use tonebench_config::{MemoryStore, PresetStore};
//! use tonebench_core::{ChainConstants, OfflineEngine, ParamKind, SignalChain};
//! use tonebench_io::{ManualClock, RecordingController, SettlePolicy, WavRecorder};
//!
//! let chain = SignalChain::new(OfflineEngine::new(48000), ChainConstants::default())?;
//! let recorder = RecordingController::new(
//!     WavRecorder::new(std::env::temp_dir()),
//!     ManualClock::new(),
//!     SettlePolicy::default(),
//!     48000,
//! );
//! let mut session = Session::new(
//!     chain,
//!     RollingAnalyzer::default(),
//!     AnalysisTaps::default(),
//!     recorder,
//!     PresetStore::new(MemoryStore::new()),
//! );
//!
//! session.dispatch(Action::SetParam(ParamKind::ReverbMix, 0.3));
//! session.tick();
//! assert_eq!(session.chain().applied().reverb_mix(), 0.3);
//!
//! assert!(matches!(session.dispatch(Action::SavePreset("Roomy".into())), Outcome::Created(_)));
//! assert_eq!(session.status().message(), "Not recording");
//! # Ok::<(), tonebench_core::EngineError>(())
//! ```

use std::fmt;

use tonebench_analysis::{AnalysisTaps, Spectrum};
use tonebench_config::{KeyValueStore, Preset, PresetId, PresetStore};
use tonebench_core::{
    AnalysisEngine, AudioEngine, ParamKind, ParameterModel, RecorderEngine, SignalChain,
};
use tonebench_io::{Clock, RecordingController, RecordingState};

/// A user intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Set one control. Out-of-range values are clamped.
    SetParam(ParamKind, f32),
    /// Replace every control.
    SetParameters(ParameterModel),
    /// Grant audio permission to the engine and the recorder.
    Activate,
    /// Start playback of the loaded source.
    Play,
    /// Stop playback.
    StopPlayback,
    /// Begin a new take.
    StartRecording,
    /// End the current take.
    StopRecording,
    /// Export the finished take under a name.
    Export(String),
    /// Save the live parameters as a new preset, and select it.
    SavePreset(String),
    /// Change the selected preset.
    SelectPreset(Option<PresetId>),
    /// Copy the selected preset into the live parameters.
    LoadSelected,
    /// Overwrite the selected preset with the live parameters.
    UpdateSelected,
    /// Rename the selected preset.
    RenameSelected(String),
    /// Delete the selected preset and clear the selection.
    DeleteSelected,
}

/// Result of [`Session::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The action took effect.
    Done,
    /// A precondition did not hold, or a collaborator refused. Nothing changed.
    NotPerformed,
    /// A preset was saved under this id.
    Created(PresetId),
}

impl Outcome {
    /// Whether anything changed.
    pub fn performed(&self) -> bool {
        !matches!(self, Outcome::NotPerformed)
    }

    fn from_bool(done: bool) -> Self {
        if done { Outcome::Done } else { Outcome::NotPerformed }
    }
}

/// Snapshot of what the status line shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    /// Whether permission was granted.
    pub activated: bool,
    /// Whether the source is playing.
    pub playing: bool,
    /// Recorder state.
    pub recording: RecordingState,
    /// Selected preset name, if any.
    pub preset: Option<String>,
}

impl SessionStatus {
    /// One-line recording status.
    pub fn message(&self) -> &'static str {
        match self.recording {
            RecordingState::Recording => "RECORDING...",
            RecordingState::Ready => "Ready to save WAV",
            RecordingState::Idle | RecordingState::Stopping => "Not recording",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())?;
        if let Some(name) = &self.preset {
            write!(f, " | preset: {name}")?;
        }
        Ok(())
    }
}

/// Context object for one session.
pub struct Session<E, A, R, C, S>
where
    E: AudioEngine,
    A: AnalysisEngine,
    R: RecorderEngine,
    C: Clock,
    S: KeyValueStore,
{
    params: ParameterModel,
    chain: SignalChain<E>,
    analysis: A,
    taps: AnalysisTaps,
    recorder: RecordingController<R, C>,
    presets: PresetStore<S>,
    selected: Option<PresetId>,
}

impl<E, A, R, C, S> Session<E, A, R, C, S>
where
    E: AudioEngine,
    A: AnalysisEngine,
    R: RecorderEngine,
    C: Clock,
    S: KeyValueStore,
{
    /// Assembles a session. The live parameters start at whatever the chain applied.
    pub fn new(
        chain: SignalChain<E>,
        analysis: A,
        taps: AnalysisTaps,
        recorder: RecordingController<R, C>,
        presets: PresetStore<S>,
    ) -> Self {
        Self {
            params: *chain.applied(),
            chain,
            analysis,
            taps,
            recorder,
            presets,
            selected: None,
        }
    }

    /// Performs one user action.
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        tracing::debug!(?action, "dispatch");
        match action {
            Action::SetParam(kind, value) => {
                self.params.set(kind, value);
                Outcome::Done
            }
            Action::SetParameters(model) => {
                self.params = model.clamped();
                Outcome::Done
            }
            Action::Activate => self.activate(),
            Action::Play => match self.chain.engine_mut().play() {
                Ok(()) => Outcome::Done,
                Err(e) => {
                    tracing::warn!(error = %e, "playback not started");
                    Outcome::NotPerformed
                }
            },
            Action::StopPlayback => {
                self.chain.engine_mut().stop();
                Outcome::Done
            }
            Action::StartRecording => Outcome::from_bool(self.recorder.start()),
            Action::StopRecording => Outcome::from_bool(self.recorder.stop()),
            Action::Export(name) => Outcome::from_bool(self.recorder.export(&name)),
            Action::SavePreset(name) => self.save_preset(&name),
            Action::SelectPreset(id) => self.select(id),
            Action::LoadSelected => match self.selected_preset() {
                Some(preset) => {
                    self.params = preset.settings;
                    Outcome::Done
                }
                None => Outcome::NotPerformed,
            },
            Action::UpdateSelected => {
                let params = self.params;
                self.with_selected(|store, id| store.update(id, params))
            }
            Action::RenameSelected(name) => {
                self.with_selected(|store, id| store.rename(id, &name))
            }
            Action::DeleteSelected => {
                let outcome = self.with_selected(|store, id| store.delete(id));
                if outcome.performed() {
                    self.selected = None;
                }
                outcome
            }
        }
    }

    /// Runs one frame: apply the parameters, poll the taps, advance the recorder.
    pub fn tick(&mut self) -> RecordingState {
        self.chain.apply(&self.params);
        self.taps.poll(&self.analysis);
        self.recorder.tick()
    }

    /// Current status line.
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            activated: self.chain.engine().is_activated(),
            playing: self.chain.engine().is_playing(),
            recording: self.recorder.state(),
            preset: self.selected_preset().map(|p| p.name),
        }
    }

    /// Live parameters.
    pub fn params(&self) -> &ParameterModel {
        &self.params
    }

    /// Currently selected preset id.
    pub fn selected(&self) -> Option<&PresetId> {
        self.selected.as_ref()
    }

    /// A copy of the selected preset, if it still exists.
    pub fn selected_preset(&self) -> Option<Preset> {
        self.selected.as_ref().and_then(|id| self.presets.find(id))
    }

    /// Pre-chain spectrum, normalized bins.
    pub fn spectrum_pre(&self) -> Spectrum<'_> {
        self.taps.spectrum_pre()
    }

    /// Post-chain spectrum, normalized bins.
    pub fn spectrum_post(&self) -> Spectrum<'_> {
        self.taps.spectrum_post()
    }

    /// Pre-chain level.
    pub fn amplitude_pre(&self) -> f32 {
        self.taps.amplitude_pre()
    }

    /// Post-chain level.
    pub fn amplitude_post(&self) -> f32 {
        self.taps.amplitude_post()
    }

    /// Signal chain.
    pub fn chain(&self) -> &SignalChain<E> {
        &self.chain
    }

    /// Mutable signal chain, for rendering.
    pub fn chain_mut(&mut self) -> &mut SignalChain<E> {
        &mut self.chain
    }

    /// Analysis engine.
    pub fn analysis(&self) -> &A {
        &self.analysis
    }

    /// Mutable analysis engine, for feeding blocks.
    pub fn analysis_mut(&mut self) -> &mut A {
        &mut self.analysis
    }

    /// Smoothed analysis state.
    pub fn taps(&self) -> &AnalysisTaps {
        &self.taps
    }

    /// Recording controller.
    pub fn recorder(&self) -> &RecordingController<R, C> {
        &self.recorder
    }

    /// Mutable recording controller.
    pub fn recorder_mut(&mut self) -> &mut RecordingController<R, C> {
        &mut self.recorder
    }

    /// Preset collection.
    pub fn presets(&self) -> &PresetStore<S> {
        &self.presets
    }

    fn activate(&mut self) -> Outcome {
        if let Err(e) = self.chain.engine_mut().activate() {
            tracing::warn!(error = %e, "audio engine refused activation");
            return Outcome::NotPerformed;
        }
        if let Err(e) = self.recorder.engine_mut().activate() {
            tracing::warn!(error = %e, "recorder refused activation");
            return Outcome::NotPerformed;
        }
        tracing::info!("audio activated");
        Outcome::Done
    }

    fn save_preset(&mut self, name: &str) -> Outcome {
        match self.presets.create(name, self.params) {
            Ok(Some(id)) => {
                self.selected = Some(id.clone());
                Outcome::Created(id)
            }
            Ok(None) => Outcome::NotPerformed,
            Err(e) => {
                tracing::warn!(error = %e, "preset not saved");
                Outcome::NotPerformed
            }
        }
    }

    fn select(&mut self, id: Option<PresetId>) -> Outcome {
        match id {
            Some(id) if self.presets.find(&id).is_none() => Outcome::NotPerformed,
            id => {
                self.selected = id;
                Outcome::Done
            }
        }
    }

    fn with_selected<F>(&mut self, op: F) -> Outcome
    where
        F: FnOnce(
            &mut PresetStore<S>,
            &PresetId,
        ) -> Result<bool, tonebench_config::ConfigError>,
    {
        let Some(id) = self.selected.as_ref() else {
            return Outcome::NotPerformed;
        };
        match op(&mut self.presets, id) {
            Ok(done) => Outcome::from_bool(done),
            Err(e) => {
                tracing::warn!(%id, error = %e, "preset store write failed");
                Outcome::NotPerformed
            }
        }
    }
}
