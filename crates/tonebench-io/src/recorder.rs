//! Recording state machine.
//!
//! ```text
//!            start()            stop()             settled
//!   Idle ───────────▶ Recording ───────▶ Stopping ─────────▶ Ready
//!    ▲                    ▲                  │                 │
//!    │                    └──── start() ─────┴──── start() ────┤
//!    └──────────────────────────── reset() ────────────────────┘
//! ```
//!
//! [`RecordingController`] owns a [`RecorderEngine`] and a [`Clock`]. Nothing here
//! blocks: `stop()` only schedules the `Stopping → Ready` edge, and the edge fires on
//! the first [`tick`](RecordingController::tick) or state query after the
//! [`SettlePolicy`] is satisfied.
//!
//! Every `start()` bumps a generation counter. A pending ready edge belongs to the
//! generation that scheduled it and is dropped if a newer take has begun.

use std::cell::Cell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tonebench_core::{CaptureBuffer, RecorderEngine, TapPoint};

use crate::clock::{Clock, SystemClock};

/// Settle delay used by [`SettlePolicy::default`].
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Flush acknowledgment timeout used by [`SettlePolicy::flush_acknowledged`].
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Recording lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingState {
    /// Nothing captured.
    #[default]
    Idle,
    /// Capturing the post-chain signal.
    Recording,
    /// Capture stopped; waiting for the engine to finish writing.
    Stopping,
    /// Capture final and exportable.
    Ready,
}

impl RecordingState {
    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            RecordingState::Idle => "idle",
            RecordingState::Recording => "recording",
            RecordingState::Stopping => "stopping",
            RecordingState::Ready => "ready",
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a stopped take may be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlePolicy {
    /// Ready a fixed delay after `stop()`.
    FixedDelay(Duration),
    /// Ready once the engine has marked the buffer flushed and `min_delay` has passed.
    ///
    /// After `timeout` the take goes ready anyway, with a warning.
    FlushAcknowledged {
        /// Lower bound on the wait.
        min_delay: Duration,
        /// Upper bound on the wait.
        timeout: Duration,
    },
}

impl SettlePolicy {
    /// Flush acknowledgment with no minimum delay and the default timeout.
    pub const fn flush_acknowledged() -> Self {
        SettlePolicy::FlushAcknowledged {
            min_delay: Duration::ZERO,
            timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }

    /// Longest possible wait after `stop()`.
    pub const fn max_wait(&self) -> Duration {
        match *self {
            SettlePolicy::FixedDelay(delay) => delay,
            SettlePolicy::FlushAcknowledged { timeout, .. } => timeout,
        }
    }
}

impl Default for SettlePolicy {
    fn default() -> Self {
        SettlePolicy::FixedDelay(DEFAULT_SETTLE_DELAY)
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingReady {
    generation: u64,
    stopped_at: Duration,
}

/// Drives capture through `Idle → Recording → Stopping → Ready`.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tonebench_io::{ManualClock, RecordingController, RecordingState, SettlePolicy, WavRecorder};
///
/// let mut engine = WavRecorder::new(std::env::temp_dir());
/// engine.activate();
///
/// let clock = ManualClock::new();
/// let mut rec = RecordingController::new(engine, clock.clone(), SettlePolicy::default(), 48000);
///
/// assert!(rec.start());
/// rec.engine_mut().push_post_chain(&[0.0; 480]);
/// assert!(rec.stop());
/// assert!(!rec.can_export());
///
/// clock.advance(Duration::from_millis(200));
/// assert_eq!(rec.tick(), RecordingState::Ready);
/// assert!(rec.can_export());
/// ```
pub struct RecordingController<R: RecorderEngine, C: Clock = SystemClock> {
    engine: R,
    clock: C,
    policy: SettlePolicy,
    sample_rate: u32,
    state: Cell<RecordingState>,
    pending: Cell<Option<PendingReady>>,
    generation: u64,
    buffer: Option<Arc<CaptureBuffer>>,
    last_export: Option<PathBuf>,
}

impl<R: RecorderEngine, C: Clock> RecordingController<R, C> {
    /// Creates an idle controller. Takes are captured at `sample_rate` Hz.
    pub fn new(engine: R, clock: C, policy: SettlePolicy, sample_rate: u32) -> Self {
        Self {
            engine,
            clock,
            policy,
            sample_rate,
            state: Cell::new(RecordingState::Idle),
            pending: Cell::new(None),
            generation: 0,
            buffer: None,
            last_export: None,
        }
    }

    /// Begins a new take, discarding any previous one.
    ///
    /// Returns `false` if already recording, if the engine is not activated, or if
    /// the engine refuses to capture.
    pub fn start(&mut self) -> bool {
        let previous = self.state();
        if previous == RecordingState::Recording {
            return false;
        }
        if !self.engine.is_activated() {
            tracing::debug!("recording start ignored: engine not activated");
            return false;
        }

        let buffer = Arc::new(CaptureBuffer::new(self.sample_rate));
        if let Err(e) = self
            .engine
            .begin_capture(TapPoint::PostChain, Arc::clone(&buffer))
        {
            tracing::warn!(error = %e, "engine refused to start capture");
            return false;
        }

        self.generation += 1;
        self.buffer = Some(buffer);
        self.last_export = None;
        self.pending.set(None);
        self.state.set(RecordingState::Recording);
        tracing::info!(generation = self.generation, from = %previous, "recording started");
        true
    }

    /// Ends capture and schedules the ready edge. Only valid while recording.
    pub fn stop(&mut self) -> bool {
        if self.state() != RecordingState::Recording {
            return false;
        }
        if let Err(e) = self.engine.end_capture() {
            tracing::warn!(error = %e, "engine reported an error ending capture");
        }

        let now = self.clock.now();
        self.pending.set(Some(PendingReady {
            generation: self.generation,
            stopped_at: now,
        }));
        self.state.set(RecordingState::Stopping);
        tracing::info!(
            generation = self.generation,
            captured_secs = self.captured_secs(),
            "recording stopped, settling"
        );
        self.settle();
        true
    }

    /// Advances timed transitions. Call once per frame.
    pub fn tick(&mut self) -> RecordingState {
        self.state()
    }

    /// Current state, after applying any due ready edge.
    pub fn state(&self) -> RecordingState {
        self.settle();
        self.state.get()
    }

    /// Whether a take is being captured.
    pub fn is_recording(&self) -> bool {
        self.state() == RecordingState::Recording
    }

    /// Whether the take is final. Only then does [`export`](Self::export) act.
    pub fn can_export(&self) -> bool {
        self.state() == RecordingState::Ready
    }

    /// Writes the take to `name` through the engine.
    ///
    /// Ignored outside `Ready`. Export failures are logged and reported as `false`.
    /// The state does not change, so a take can be exported more than once.
    pub fn export(&mut self, name: &str) -> bool {
        if !self.can_export() {
            tracing::debug!(state = %self.state.get(), "export ignored: no finished take");
            return false;
        }
        let Some(buffer) = self.buffer.as_ref() else {
            return false;
        };
        match self.engine.export(buffer, name) {
            Ok(path) => {
                tracing::info!(
                    path = %path.display(),
                    samples = buffer.len(),
                    "recording exported"
                );
                self.last_export = Some(path);
                true
            }
            Err(e) => {
                tracing::warn!(name, error = %e, "export failed");
                false
            }
        }
    }

    /// Returns to `Idle` from `Ready`, dropping the take.
    pub fn reset(&mut self) -> bool {
        if self.state() != RecordingState::Ready {
            return false;
        }
        self.buffer = None;
        self.state.set(RecordingState::Idle);
        true
    }

    /// Time until a pending ready edge may fire, if one is pending.
    ///
    /// Under [`SettlePolicy::FlushAcknowledged`] this is the time to the timeout.
    pub fn settle_remaining(&self) -> Option<Duration> {
        let pending = self.pending.get()?;
        let due = pending.stopped_at + self.policy.max_wait();
        Some(due.saturating_sub(self.clock.now()))
    }

    /// Take counter; bumped by every successful `start()`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The current take's buffer, if any.
    pub fn buffer(&self) -> Option<&Arc<CaptureBuffer>> {
        self.buffer.as_ref()
    }

    /// Seconds captured in the current take.
    pub fn captured_secs(&self) -> f64 {
        self.buffer.as_ref().map_or(0.0, |b| b.duration_secs())
    }

    /// Where the most recent export of this take was written.
    pub fn last_export(&self) -> Option<&Path> {
        self.last_export.as_deref()
    }

    /// Active settle policy.
    pub fn policy(&self) -> SettlePolicy {
        self.policy
    }

    /// Capture sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Recorder engine.
    pub fn engine(&self) -> &R {
        &self.engine
    }

    /// Mutable recorder engine, for feeding samples.
    pub fn engine_mut(&mut self) -> &mut R {
        &mut self.engine
    }

    /// Fires the pending ready edge if its policy is satisfied.
    fn settle(&self) {
        let Some(pending) = self.pending.get() else {
            return;
        };
        let stale = pending.generation != self.generation;
        if stale || self.state.get() != RecordingState::Stopping {
            self.pending.set(None);
            return;
        }

        let waited = self.clock.now().saturating_sub(pending.stopped_at);
        let ready = match self.policy {
            SettlePolicy::FixedDelay(delay) => waited >= delay,
            SettlePolicy::FlushAcknowledged { min_delay, timeout } => {
                let flushed = self.buffer.as_ref().is_none_or(|b| b.is_flushed());
                if waited >= min_delay && flushed {
                    true
                } else if waited >= timeout {
                    tracing::warn!(
                        generation = pending.generation,
                        waited_ms = waited.as_millis() as u64,
                        "no flush acknowledgment before timeout, exporting what was captured"
                    );
                    true
                } else {
                    false
                }
            }
        };

        if ready {
            self.pending.set(None);
            self.state.set(RecordingState::Ready);
            tracing::info!(generation = pending.generation, "recording ready to export");
        }
    }
}

impl<R, C> fmt::Debug for RecordingController<R, C>
where
    R: RecorderEngine + fmt::Debug,
    C: Clock + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingController")
            .field("state", &self.state.get())
            .field("generation", &self.generation)
            .field("policy", &self.policy)
            .field("captured_secs", &self.captured_secs())
            .field("engine", &self.engine)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use tonebench_core::EngineError;

    /// Recorder that records calls and lets tests control flushing.
    #[derive(Debug, Default)]
    struct MockRecorder {
        activated: bool,
        refuse_capture: bool,
        fail_export: bool,
        auto_flush: bool,
        target: Option<Arc<CaptureBuffer>>,
        begins: usize,
        ends: usize,
        exports: Vec<String>,
    }

    impl MockRecorder {
        fn activated() -> Self {
            Self {
                activated: true,
                auto_flush: true,
                ..Self::default()
            }
        }
    }

    impl RecorderEngine for MockRecorder {
        fn activate(&mut self) -> Result<(), EngineError> {
            self.activated = true;
            Ok(())
        }

        fn is_activated(&self) -> bool {
            self.activated
        }

        fn begin_capture(
            &mut self,
            tap: TapPoint,
            target: Arc<CaptureBuffer>,
        ) -> Result<(), EngineError> {
            assert_eq!(tap, TapPoint::PostChain);
            if self.refuse_capture {
                return Err(EngineError::Capture("busy".into()));
            }
            self.begins += 1;
            self.target = Some(target);
            Ok(())
        }

        fn end_capture(&mut self) -> Result<(), EngineError> {
            self.ends += 1;
            if let Some(target) = self.target.take()
                && self.auto_flush
            {
                target.mark_flushed();
            }
            Ok(())
        }

        fn export(
            &mut self,
            _buffer: &CaptureBuffer,
            destination: &str,
        ) -> Result<PathBuf, EngineError> {
            if self.fail_export {
                let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
                return Err(EngineError::export(destination, io));
            }
            self.exports.push(destination.to_string());
            Ok(PathBuf::from(destination))
        }
    }

    fn controller(
        engine: MockRecorder,
        policy: SettlePolicy,
    ) -> (RecordingController<MockRecorder, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (
            RecordingController::new(engine, clock.clone(), policy, 48000),
            clock,
        )
    }

    #[test]
    fn full_cycle() {
        let (mut rec, clock) = controller(MockRecorder::activated(), SettlePolicy::default());
        assert_eq!(rec.state(), RecordingState::Idle);

        assert!(rec.start());
        assert_eq!(rec.state(), RecordingState::Recording);
        assert!(rec.stop());
        assert_eq!(rec.state(), RecordingState::Stopping);
        assert!(!rec.can_export());

        clock.advance(Duration::from_millis(199));
        assert_eq!(rec.tick(), RecordingState::Stopping);
        clock.advance(Duration::from_millis(1));
        assert!(rec.can_export());

        assert!(rec.export("take.wav"));
        assert!(rec.export("again.wav"));
        assert_eq!(rec.engine().exports, vec!["take.wav", "again.wav"]);
        assert_eq!(rec.last_export(), Some(Path::new("again.wav")));

        assert!(rec.reset());
        assert_eq!(rec.state(), RecordingState::Idle);
        assert!(rec.buffer().is_none());
    }

    #[test]
    fn start_requires_activation() {
        let (mut rec, _) = controller(MockRecorder::default(), SettlePolicy::default());
        assert!(!rec.start());
        assert_eq!(rec.state(), RecordingState::Idle);
        assert_eq!(rec.generation(), 0);
    }

    #[test]
    fn engine_refusal_keeps_state() {
        let engine = MockRecorder {
            refuse_capture: true,
            ..MockRecorder::activated()
        };
        let (mut rec, _) = controller(engine, SettlePolicy::default());
        assert!(!rec.start());
        assert_eq!(rec.state(), RecordingState::Idle);
    }

    #[test]
    fn preconditions_are_noops() {
        let (mut rec, clock) = controller(MockRecorder::activated(), SettlePolicy::default());
        assert!(!rec.stop());
        assert!(!rec.export("x.wav"));
        assert!(!rec.reset());

        assert!(rec.start());
        assert!(!rec.start());
        assert_eq!(rec.generation(), 1);
        assert!(!rec.export("x.wav"));

        assert!(rec.stop());
        clock.advance(Duration::from_millis(100));
        assert!(!rec.stop());
        assert_eq!(rec.engine().ends, 1);
        // The second stop did not reschedule.
        clock.advance(Duration::from_millis(100));
        assert!(rec.can_export());
        assert!(rec.engine().exports.is_empty());
    }

    #[test]
    fn restart_during_stopping_preempts() {
        let (mut rec, clock) = controller(MockRecorder::activated(), SettlePolicy::default());
        assert!(rec.start());
        let first = Arc::clone(rec.buffer().unwrap());
        assert!(rec.stop());

        clock.advance(Duration::from_millis(50));
        assert!(rec.start());
        assert_eq!(rec.generation(), 2);
        assert!(!Arc::ptr_eq(&first, rec.buffer().unwrap()));

        clock.advance(Duration::from_secs(1));
        assert_eq!(rec.tick(), RecordingState::Recording);
        assert!(!rec.can_export());
    }

    #[test]
    fn restart_from_ready_discards_take() {
        let (mut rec, clock) = controller(MockRecorder::activated(), SettlePolicy::default());
        rec.start();
        rec.buffer().unwrap().append(&[0.5; 10]);
        rec.stop();
        clock.advance(DEFAULT_SETTLE_DELAY);
        assert!(rec.can_export());

        assert!(rec.start());
        assert!(rec.buffer().unwrap().is_empty());
        assert_eq!(rec.engine().begins, 2);
    }

    #[test]
    fn export_failure_reports_false_and_stays_ready() {
        let engine = MockRecorder {
            fail_export: true,
            ..MockRecorder::activated()
        };
        let (mut rec, clock) = controller(engine, SettlePolicy::FixedDelay(Duration::ZERO));
        rec.start();
        rec.stop();
        clock.advance(Duration::from_millis(1));
        assert!(!rec.export("take.wav"));
        assert_eq!(rec.state(), RecordingState::Ready);
        assert!(rec.last_export().is_none());
    }

    #[test]
    fn zero_delay_is_ready_immediately() {
        let (mut rec, _) =
            controller(MockRecorder::activated(), SettlePolicy::FixedDelay(Duration::ZERO));
        rec.start();
        rec.stop();
        assert!(rec.can_export());
    }

    #[test]
    fn flush_ack_waits_for_engine() {
        let engine = MockRecorder {
            auto_flush: false,
            ..MockRecorder::activated()
        };
        let policy = SettlePolicy::FlushAcknowledged {
            min_delay: Duration::from_millis(10),
            timeout: Duration::from_secs(2),
        };
        let (mut rec, clock) = controller(engine, policy);
        rec.start();
        let buffer = Arc::clone(rec.buffer().unwrap());
        rec.stop();

        clock.advance(Duration::from_millis(500));
        assert_eq!(rec.tick(), RecordingState::Stopping);

        buffer.mark_flushed();
        assert_eq!(rec.tick(), RecordingState::Ready);
    }

    #[test]
    fn flush_ack_respects_min_delay() {
        let policy = SettlePolicy::FlushAcknowledged {
            min_delay: Duration::from_millis(10),
            timeout: Duration::from_secs(2),
        };
        let (mut rec, clock) = controller(MockRecorder::activated(), policy);
        rec.start();
        rec.stop();
        assert!(rec.buffer().unwrap().is_flushed());
        assert_eq!(rec.tick(), RecordingState::Stopping);
        clock.advance(Duration::from_millis(10));
        assert_eq!(rec.tick(), RecordingState::Ready);
    }

    #[test]
    fn flush_ack_times_out() {
        let engine = MockRecorder {
            auto_flush: false,
            ..MockRecorder::activated()
        };
        let (mut rec, clock) = controller(engine, SettlePolicy::flush_acknowledged());
        rec.start();
        rec.stop();
        assert_eq!(rec.settle_remaining(), Some(DEFAULT_FLUSH_TIMEOUT));

        clock.advance(DEFAULT_FLUSH_TIMEOUT - Duration::from_millis(1));
        assert_eq!(rec.tick(), RecordingState::Stopping);
        clock.advance(Duration::from_millis(1));
        assert_eq!(rec.tick(), RecordingState::Ready);
        assert_eq!(rec.settle_remaining(), None);
    }
}
