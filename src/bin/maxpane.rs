use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use maxpane::actor::reactor::{Script, replay};
use maxpane::common::config::Config;
use maxpane::common::log::init_logging;
use maxpane::layout_engine::WindowLayout;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "maxpane", about = "Maximize and restore panes of a grid layout", version)]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the layout with one group filling the window.
    Maximize {
        #[arg(long, default_value_t = 0)]
        group: usize,
        /// Layout JSON; read from stdin when omitted.
        file: Option<PathBuf>,
    },
    /// Print the layout with evenly spaced splits.
    Distribute { file: Option<PathBuf> },
    /// Validate a layout and describe it.
    Inspect { file: Option<PathBuf> },
    /// Run a scripted session against the headless editor and print the
    /// final state.
    Replay { script: PathBuf },
}

#[derive(Serialize)]
struct LayoutSummary {
    groups: usize,
    looks_maximized: bool,
    layout: WindowLayout,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Maximize { group, file } => {
            let layout = read_layout(file.as_deref())?;
            print_json(&layout.maximized(group)?)
        }
        Commands::Distribute { file } => {
            let layout = read_layout(file.as_deref())?;
            print_json(&layout.distributed())
        }
        Commands::Inspect { file } => {
            let layout = read_layout(file.as_deref())?;
            print_json(&LayoutSummary {
                groups: layout.num_groups(),
                looks_maximized: layout.looks_maximized(),
                layout,
            })
        }
        Commands::Replay { script } => {
            let config = Config::load(cli.config.as_deref())?;
            let buf = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let parsed: Script = serde_json::from_str(&buf)
                .with_context(|| format!("parsing script {}", script.display()))?;
            info!(steps = parsed.steps.len(), windows = parsed.windows.len(), "replaying");
            let reactor = replay(&parsed, config)?;
            println!("{}", reactor.serialize_state()?);
            Ok(())
        }
    }
}

fn read_layout(file: Option<&Path>) -> anyhow::Result<WindowLayout> {
    let buf = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading layout {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading layout from stdin")?;
            buf
        }
    };
    let layout: WindowLayout = serde_json::from_str(&buf).context("parsing layout")?;
    layout.validate()?;
    Ok(layout)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
