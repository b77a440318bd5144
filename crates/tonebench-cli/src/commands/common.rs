//! Shared CLI helpers used across multiple commands.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tonebench_analysis::{AnalysisTaps, AnalyzerConfig, RollingAnalyzer};
use tonebench_config::{
    FileStore, KeyValueStore, Preset, PresetStore, Settings, SettlePolicyKind, paths,
};
use tonebench_core::{ParamKind, ParameterModel};
use tonebench_io::SettlePolicy;

/// Load settings from `--config`, or the user settings file if present.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load_or_default(paths::settings_path())?,
    };
    Ok(settings)
}

/// Parse a `name=value` control assignment for clap's `value_parser`.
pub fn parse_param(s: &str) -> Result<(ParamKind, f32), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter format: '{s}' (expected name=value)"))?;
    let kind: ParamKind = name.parse().map_err(|e| format!("{e}"))?;
    let value: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid value for {kind}: '{value}'"))?;
    Ok((kind, value))
}

/// Parameter source shared by `apply`, `analyze`, `record`, and `presets save`.
#[derive(Args, Debug, Default)]
pub struct ParamArgs {
    /// Start from a saved preset (id or name)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Override a control, e.g. `--set cutoff_hz=3000 --set dist=0.4`
    #[arg(long = "set", value_parser = parse_param, value_name = "NAME=VALUE")]
    pub overrides: Vec<(ParamKind, f32)>,
}

impl ParamArgs {
    /// Resolves to a model: defaults or the preset, then each override in order.
    pub fn resolve<S: KeyValueStore>(
        &self,
        store: &PresetStore<S>,
    ) -> anyhow::Result<ParameterModel> {
        let mut model = match &self.preset {
            Some(query) => find_preset(store, query)?.settings,
            None => ParameterModel::default(),
        };
        for &(kind, value) in &self.overrides {
            model.set(kind, value);
        }
        Ok(model)
    }
}

/// Open the preset store configured in `settings`.
pub fn open_presets(settings: &Settings) -> PresetStore<FileStore> {
    PresetStore::new(FileStore::new(settings.preset_store_dir()))
}

/// Find a preset by exact id, or by unique case-insensitive name.
pub fn find_preset<S: KeyValueStore>(store: &PresetStore<S>, query: &str) -> anyhow::Result<Preset> {
    let presets = store.list();
    if let Some(preset) = presets.iter().find(|p| p.id.as_str() == query) {
        return Ok(preset.clone());
    }

    let mut matches = presets
        .into_iter()
        .filter(|p| p.name.eq_ignore_ascii_case(query.trim()));
    match (matches.next(), matches.next()) {
        (Some(preset), None) => Ok(preset),
        (Some(_), Some(_)) => anyhow::bail!(
            "Several presets are named '{}'. Use the id from 'tonebench presets list'.",
            query
        ),
        (None, _) => anyhow::bail!(
            "Preset '{}' not found. Use 'tonebench presets list' to see saved presets.",
            query
        ),
    }
}

/// Settle policy described by the `[recording]` section.
pub fn settle_policy(settings: &Settings) -> SettlePolicy {
    let r = &settings.recording;
    match r.policy {
        SettlePolicyKind::Fixed => SettlePolicy::FixedDelay(Duration::from_millis(r.settle_ms)),
        SettlePolicyKind::FlushAck => SettlePolicy::FlushAcknowledged {
            min_delay: Duration::from_millis(r.settle_ms),
            timeout: Duration::from_millis(r.flush_timeout_ms.max(r.settle_ms)),
        },
    }
}

/// Analyzer and taps configured by the `[analysis]` section.
pub fn analysis(settings: &Settings) -> (RollingAnalyzer, AnalysisTaps) {
    let a = &settings.analysis;
    let analyzer = RollingAnalyzer::new(AnalyzerConfig {
        fft_size: a.fft_size,
        min_db: a.min_db,
        max_db: a.max_db,
    });
    (analyzer, AnalysisTaps::new(a.smoothing))
}

/// Samples per control frame at the configured tick rate.
pub fn frame_len(settings: &Settings) -> usize {
    let e = &settings.engine;
    (e.sample_rate / e.tick_hz.max(1)).max(1) as usize
}

/// Progress bar for offline renders.
pub fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({eta})")
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("##-"));
    pb.set_style(style);
    pb
}

/// Print every control of `model`, one per line.
pub fn print_params(model: &ParameterModel) {
    for (kind, value) in model.iter() {
        let desc = kind.descriptor();
        println!("  {:16} {:>12}   ({})", desc.name, desc.format_value(value), kind);
    }
}
