//! Dry-run parameter application against the offline engine.

use clap::Args;
use tonebench_config::Settings;
use tonebench_core::{
    ChainConstants, DISTORTION_EPSILON, OfflineEngine, SignalChain, Stage, distortion_setting,
};

use super::common::{ParamArgs, open_presets, print_params};

#[derive(Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    params: ParamArgs,

    /// Print each engine write in order instead of the final node table
    #[arg(long)]
    writes: bool,
}

pub fn run(args: ApplyArgs, settings: &Settings) -> anyhow::Result<()> {
    let store = open_presets(settings);
    let model = args.params.resolve(&store)?;

    let engine = OfflineEngine::new(settings.engine.sample_rate).with_write_log();
    let mut chain = SignalChain::new(engine, ChainConstants::default())?;
    chain.engine_mut().clear_writes();
    chain.apply(&model);

    println!("Parameters:");
    print_params(chain.applied());
    println!();

    let engine = chain.engine();
    if args.writes {
        println!("Engine writes:");
        for write in engine.writes() {
            println!(
                "  {:8} {:12} {}",
                write.node.to_string(),
                write.param.as_str(),
                write.value
            );
        }
    } else {
        println!("Nodes:");
        for (stage, node) in chain.node_ids().iter() {
            let kind = engine.node_kind(node).map_or("?", |k| k.as_str());
            println!("  {node} ({kind})");
            for (param, value) in engine.params(node) {
                println!("    {:14} {value}", param.as_str());
            }
            if stage == Stage::Distortion
                && let Some(curve) = engine.curve(node)
            {
                println!("    {:14} {}", "curve", curve.as_str());
            }
        }
        println!("  master gain    {}", engine.master_gain());
    }

    let dist = distortion_setting(chain.applied().distortion_amount());
    println!();
    if dist.is_bypassed() {
        println!("Distortion bypassed (amount below {DISTORTION_EPSILON})");
    } else {
        println!("Distortion active: drive {:.3}", dist.drive);
    }

    Ok(())
}
