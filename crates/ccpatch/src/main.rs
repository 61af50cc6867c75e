use std::path::PathBuf;

use ccpatch_beatstep::{ports, BeatStepModule};
use ccpatch_core::ConfigManager;
use clap::Parser;

/// Capture, save and recall MIDI CC patches from an Arturia BeatStep.
#[derive(Parser, Debug)]
#[command(name = "ccpatch")]
#[command(about = "MIDI CC patch recall for the Arturia BeatStep")]
struct Args {
    /// Patch file to load at startup
    patch: Option<PathBuf>,

    /// Configuration file (default: ccpatch.json in the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the available MIDI ports and exit
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list_ports {
        let (inputs, outputs) = ports::list_ports()?;
        println!("MIDI inputs:");
        for name in inputs {
            println!("  {}", name);
        }
        println!("MIDI outputs:");
        for name in outputs {
            println!("  {}", name);
        }
        return Ok(());
    }

    let mut config = ConfigManager::new(args.config);
    let settings = config.load()?;
    log::info!("Using config {}", config.config_path().display());

    let mut module = BeatStepModule::initialize(&settings)?;

    if let Some(path) = &args.patch {
        if let Err(e) = module.load_patch(path) {
            log::error!("{}", e);
        }
    }

    tokio::select! {
        _ = module.run() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                log::error!("Failed to listen for Ctrl-C: {}", e);
            }
        }
    }

    module.shutdown();
    Ok(())
}
