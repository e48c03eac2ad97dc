//! Headless lasercanvas shell.

use clap::{Parser, Subcommand};
use lasercanvas_core::{CanvasConfig, ShortcutRegistry};
use std::path::PathBuf;

mod replay;

#[derive(Parser, Debug)]
#[command(name = "lasercanvas")]
#[command(version, about = "Replay pointer-drawing input against a headless canvas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a timed input script and print the remaining shapes as JSON
    Replay {
        /// Script file ({"events": [{"at_ms": .., "event": {..}}]})
        script: PathBuf,

        /// Canvas configuration (JSON)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Shapes present before the canvas mounts (JSON array)
        #[arg(long, value_name = "PATH")]
        shapes: Option<PathBuf>,
    },
    /// List keyboard shortcuts
    Shortcuts,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay { script, config, shapes } => {
            let config = match config {
                Some(path) => CanvasConfig::load(&path)?,
                None => CanvasConfig::default(),
            };
            let initial = match shapes {
                Some(path) => replay::load_shapes(&path)?,
                None => Vec::new(),
            };
            let script = replay::Script::load(&script)?;

            let outcome = replay::run(config, initial, &script);
            log::info!(
                "Replayed {} event(s): {} stroke(s) caught up, {} timer(s) fired, {} shape(s) left",
                script.events.len(),
                outcome.caught_up,
                outcome.timers_fired,
                outcome.shapes.len()
            );
            println!("{}", serde_json::to_string_pretty(&outcome.shapes)?);
        }
        Command::Shortcuts => {
            println!("\n=== Keyboard Shortcuts ===");
            print!("{}", ShortcutRegistry::table());
            println!();
        }
    }

    Ok(())
}
