//! Offline recording: play a WAV file through the chain, capture the output, export.
//!
//! Runs the same frame loop an interactive front end would, on a manual clock, so the
//! settle delay costs no wall time.

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tonebench_cli::{Action, Outcome, Session};
use tonebench_config::Settings;
use tonebench_core::{AudioEngine, ChainConstants, OfflineEngine, SignalChain, TapPoint};
use tonebench_io::{ManualClock, RecordingController, WavRecorder, read_wav_mono};

use super::common::{ParamArgs, analysis, frame_len, open_presets, progress_bar, settle_policy};

#[derive(Args)]
pub struct RecordArgs {
    /// Source WAV file (looped if shorter than the take)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Take length in seconds (default: the source length)
    #[arg(short, long)]
    seconds: Option<f64>,

    /// Name of the exported take (".wav" is appended if missing)
    #[arg(short, long)]
    out: String,

    /// Export directory (default: [recording] output_dir)
    #[arg(long)]
    dir: Option<PathBuf>,

    #[command(flatten)]
    params: ParamArgs,
}

pub fn run(args: RecordArgs, settings: &Settings) -> anyhow::Result<()> {
    let audio = read_wav_mono(&args.input)?;
    if audio.samples.is_empty() {
        anyhow::bail!("{} contains no samples", args.input.display());
    }
    let sample_rate = audio.sample_rate;
    let seconds = args.seconds.unwrap_or_else(|| audio.duration_secs());
    if !(seconds.is_finite() && seconds > 0.0) {
        anyhow::bail!("--seconds must be positive");
    }

    let dir = args.dir.clone().unwrap_or_else(|| settings.recordings_dir());
    let clock = ManualClock::new();
    let (analyzer, taps) = analysis(settings);
    let chain = SignalChain::new(OfflineEngine::new(sample_rate), ChainConstants::default())?;
    let recorder = RecordingController::new(
        WavRecorder::new(&dir),
        clock.clone(),
        settle_policy(settings),
        sample_rate,
    );
    let mut session = Session::new(chain, analyzer, taps, recorder, open_presets(settings));

    let model = args.params.resolve(session.presets())?;
    session.dispatch(Action::SetParameters(model));
    session
        .chain_mut()
        .engine_mut()
        .load_source(&args.input.display().to_string())?;

    for action in [Action::Activate, Action::Play, Action::StartRecording] {
        if session.dispatch(action.clone()) == Outcome::NotPerformed {
            anyhow::bail!("{action:?} was refused by the engine");
        }
    }
    session.tick();

    let block = frame_len(settings);
    let frame_time = Duration::from_secs_f64(block as f64 / f64::from(sample_rate));
    let total = (seconds * f64::from(sample_rate)).round() as usize;
    let frames = total.div_ceil(block);

    println!(
        "Recording {:.2}s of {} ({} frames of {} samples)...",
        seconds,
        args.input.display(),
        frames,
        block
    );
    let pb = progress_bar(frames as u64);
    let mut source = audio.samples.iter().copied().cycle();
    let mut input = vec![0.0f32; block];
    let mut output = vec![0.0f32; block];

    let mut remaining = total;
    while remaining > 0 {
        let n = remaining.min(block);
        for x in &mut input[..n] {
            *x = source.next().unwrap_or(0.0);
        }
        session.chain().engine().render(&input[..n], &mut output[..n]);
        session.analysis_mut().push(TapPoint::PreChain, &input[..n]);
        session.analysis_mut().push(TapPoint::PostChain, &output[..n]);
        session.recorder_mut().engine_mut().push_post_chain(&output[..n]);
        clock.advance(frame_time);
        session.tick();
        pb.inc(1);
        remaining -= n;
    }
    pb.finish_and_clear();

    session.dispatch(Action::StopRecording);
    session.dispatch(Action::StopPlayback);
    tracing::debug!(status = %session.status(), "take stopped");

    // Keep ticking until the take settles. Bounded by the policy's longest wait.
    let deadline = session.recorder().policy().max_wait() + frame_time;
    let mut waited = Duration::ZERO;
    while !session.recorder().can_export() && waited <= deadline {
        clock.advance(frame_time);
        waited += frame_time;
        session.tick();
    }

    println!("{}", session.status());
    if session.dispatch(Action::Export(args.out.clone())) != Outcome::Done {
        anyhow::bail!("Could not export '{}' (see log for details)", args.out);
    }
    if let Some(path) = session.recorder().last_export() {
        println!(
            "Exported {:.2}s to {}",
            session.recorder().captured_secs(),
            path.display()
        );
    }
    println!(
        "  level pre {:.3}, post {:.3}",
        session.amplitude_pre(),
        session.amplitude_post()
    );

    Ok(())
}
