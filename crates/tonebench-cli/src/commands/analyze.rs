//! Pre/post analysis of a WAV file run through the chain.

use clap::Args;
use std::path::PathBuf;
use tonebench_analysis::dynamics::to_db;
use tonebench_analysis::{bin_frequency, crest_factor, peak_db, rms_db};
use tonebench_config::Settings;
use tonebench_core::{AudioEngine, ChainConstants, OfflineEngine, SignalChain, TapPoint};
use tonebench_io::read_wav_mono;

use super::common::{ParamArgs, analysis, frame_len, open_presets, progress_bar};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    #[command(flatten)]
    params: ParamArgs,

    /// Print a row every N frames (default: once per second)
    #[arg(long)]
    every: Option<usize>,
}

pub fn run(args: AnalyzeArgs, settings: &Settings) -> anyhow::Result<()> {
    println!("Analyzing {}...", args.input.display());
    let audio = read_wav_mono(&args.input)?;
    let sample_rate = audio.sample_rate;
    println!(
        "  {} samples, {} Hz, {:.2}s",
        audio.samples.len(),
        sample_rate,
        audio.duration_secs()
    );

    let store = open_presets(settings);
    let model = args.params.resolve(&store)?;

    let mut chain = SignalChain::new(OfflineEngine::new(sample_rate), ChainConstants::default())?;
    let engine = chain.engine_mut();
    engine.activate()?;
    engine.load_source(&args.input.display().to_string())?;
    engine.play()?;

    let (mut analyzer, mut taps) = analysis(settings);
    let fft_size = analyzer.config().fft_size;
    let block = frame_len(settings);
    let every = args
        .every
        .unwrap_or(settings.engine.tick_hz as usize)
        .max(1);

    let frames = audio.samples.len().div_ceil(block);
    let pb = progress_bar(frames as u64);
    let mut post = vec![0.0f32; audio.samples.len()];
    let mut rows = Vec::new();

    for (i, (input, output)) in audio
        .samples
        .chunks(block)
        .zip(post.chunks_mut(block))
        .enumerate()
    {
        chain.apply(&model);
        chain.engine().render(input, output);
        analyzer.push(TapPoint::PreChain, input);
        analyzer.push(TapPoint::PostChain, output);
        taps.poll(&analyzer);
        pb.inc(1);

        if (i + 1) % every == 0 || i + 1 == frames {
            let peak_hz = |tap: TapPoint| {
                taps.peak_bin(tap)
                    .map(|(bin, _)| bin_frequency(bin, sample_rate as f32, fft_size))
            };
            rows.push((
                ((i + 1) * block).min(audio.samples.len()) as f32 / sample_rate as f32,
                to_db(taps.amplitude_pre()),
                to_db(taps.amplitude_post()),
                peak_hz(TapPoint::PreChain),
                peak_hz(TapPoint::PostChain),
            ));
        }
    }
    pb.finish_and_clear();

    println!();
    println!(
        "{:>8}  {:>10}  {:>10}  {:>12}  {:>12}",
        "time", "pre dB", "post dB", "pre peak", "post peak"
    );
    let hz = |f: Option<f32>| f.map_or_else(|| "-".to_string(), |f| format!("{f:.0} Hz"));
    for (t, pre_db, post_db, pre_peak, post_peak) in rows {
        println!(
            "{:>7.2}s  {:>10.1}  {:>10.1}  {:>12}  {:>12}",
            t,
            pre_db,
            post_db,
            hz(pre_peak),
            hz(post_peak)
        );
    }

    println!();
    println!("Summary:");
    for (label, signal) in [("pre", &audio.samples), ("post", &post)] {
        println!(
            "  {:5} RMS {:>7.1} dB   peak {:>7.1} dB   crest {:>5.2}",
            label,
            rms_db(signal),
            peak_db(signal),
            crest_factor(signal)
        );
    }

    Ok(())
}
