//! Preset management commands.
//!
//! Provides commands to list, show, save, update, rename, and delete presets.

use clap::{Args, Subcommand};
use tonebench_config::Settings;

use super::common::{ParamArgs, find_preset, open_presets, print_params};

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List saved presets in order
    List,

    /// Show the settings of a preset
    Show {
        /// Preset id or name
        preset: String,

        /// Print the stored JSON record
        #[arg(long)]
        json: bool,
    },

    /// Save parameters as a new preset
    Save {
        /// Name for the new preset
        name: String,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Replace the settings of an existing preset
    Update {
        /// Preset id or name
        preset: String,

        /// Override a control, e.g. `--set comp_ratio=8`
        #[arg(long = "set", value_parser = super::common::parse_param, value_name = "NAME=VALUE")]
        overrides: Vec<(tonebench_core::ParamKind, f32)>,
    },

    /// Rename a preset
    Rename {
        /// Preset id or name
        preset: String,

        /// New name
        name: String,
    },

    /// Delete a preset
    Delete {
        /// Preset id or name
        preset: String,
    },

    /// Show the preset store location
    Paths,
}

pub fn run(args: PresetsArgs, settings: &Settings) -> anyhow::Result<()> {
    let mut store = open_presets(settings);

    match args.command {
        PresetsCommand::List => {
            let presets = store.list();
            println!("Presets:");
            println!("========");
            if presets.is_empty() {
                println!("  (none)");
                println!();
                println!("  Create one with: tonebench presets save <name> --set cutoff_hz=3000");
            }
            for preset in presets {
                println!("  {:24} {:20}  {}", preset.name, preset.id, preset.summary());
            }
        }
        PresetsCommand::Show { preset, json } => {
            let preset = find_preset(&store, &preset)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&preset)?);
            } else {
                println!("Preset: {}", preset.name);
                println!("  id: {}", preset.id);
                println!();
                print_params(&preset.settings);
            }
        }
        PresetsCommand::Save { name, params } => {
            let model = params.resolve(&store)?;
            match store.create(&name, model)? {
                Some(id) => println!("Saved preset '{}' ({id})", name.trim()),
                None => anyhow::bail!("Preset name must not be blank"),
            }
        }
        PresetsCommand::Update { preset, overrides } => {
            let found = find_preset(&store, &preset)?;
            let mut model = found.settings;
            for (kind, value) in overrides {
                model.set(kind, value);
            }
            store.update(&found.id, model)?;
            println!("Updated preset '{}'", found.name);
            print_params(&model);
        }
        PresetsCommand::Rename { preset, name } => {
            let found = find_preset(&store, &preset)?;
            if !store.rename(&found.id, &name)? {
                anyhow::bail!("Preset name must not be blank");
            }
            println!("Renamed '{}' to '{}'", found.name, name.trim());
        }
        PresetsCommand::Delete { preset } => {
            let found = find_preset(&store, &preset)?;
            store.delete(&found.id)?;
            println!("Deleted preset '{}' ({})", found.name, found.id);
        }
        PresetsCommand::Paths => {
            println!("Preset store: {}", store.backend().path_for(store.key()).display());
        }
    }

    Ok(())
}
