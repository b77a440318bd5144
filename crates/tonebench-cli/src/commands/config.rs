//! Effective settings and paths.

use clap::Args;
use std::path::Path;
use tonebench_config::{Settings, paths};

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the effective settings to the settings file
    #[arg(long)]
    save: bool,
}

pub fn run(args: ConfigArgs, settings: &Settings, explicit: Option<&Path>) -> anyhow::Result<()> {
    let settings_path = explicit.map_or_else(paths::settings_path, Path::to_path_buf);

    println!("Paths:");
    println!("  settings:   {}", settings_path.display());
    println!("  presets:    {}", settings.preset_store_dir().display());
    println!("  recordings: {}", settings.recordings_dir().display());
    println!();
    println!("Settings:");
    print!("{}", settings.to_toml()?);

    if args.save {
        settings.save(&settings_path)?;
        println!();
        println!("Saved to {}", settings_path.display());
    }

    Ok(())
}
