//! tonebench CLI - offline driver for the tonebench effect chain.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tonebench")]
#[command(author, version, about = "Guitar tone bench: effect chain, analysis, and recording", long_about = None)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List and manage saved presets
    Presets(commands::presets::PresetsArgs),

    /// Apply parameters to the chain and print every node setting
    Apply(commands::apply::ApplyArgs),

    /// Run a WAV file through the chain and report pre/post analysis
    Analyze(commands::analyze::AnalyzeArgs),

    /// Record the chain output for a WAV file and export the take
    Record(commands::record::RecordArgs),

    /// Show effective settings and paths
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = commands::common::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Presets(args) => commands::presets::run(args, &settings),
        Commands::Apply(args) => commands::apply::run(args, &settings),
        Commands::Analyze(args) => commands::analyze::run(args, &settings),
        Commands::Record(args) => commands::record::run(args, &settings),
        Commands::Config(args) => commands::config::run(args, &settings, cli.config.as_deref()),
    }
}
