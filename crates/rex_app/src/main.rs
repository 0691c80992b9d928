use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::sync::broadcast;
use tracing::{error, info};

use rex_app::{Exporter, ServerState, server};
use rex_core::{RexConfig, logging};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "\
Usage:
  rex [serve]                        Run the export HTTP service
  rex convert <input.json> [outdir]  Export a request file to disk";

enum Command {
    Serve,
    Convert { input: PathBuf, out_dir: PathBuf },
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    match args.first().map(String::as_str) {
        None | Some("serve") => Ok(Command::Serve),
        Some("convert") => {
            let input = args
                .get(1)
                .map(PathBuf::from)
                .context("convert needs an input file")?;
            let out_dir = args.get(2).map_or_else(|| PathBuf::from("."), PathBuf::from);
            Ok(Command::Convert { input, out_dir })
        }
        Some("-h" | "--help" | "help") => Ok(Command::Help),
        Some(other) => bail!("Unknown command: {other}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    let config = RexConfig::load().context("Failed to load configuration")?;
    config.validate()?;
    let _log_guard = match command {
        Command::Convert { .. } => {
            logging::init_logging_to_dir(&RexConfig::logs_dir()?, &config.log_level)?
        }
        _ => logging::init_logging(&config.log_level)?,
    };
    info!("Starting rex v{VERSION}");

    match command {
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
        Command::Serve => serve(config).await,
        Command::Convert { input, out_dir } => convert(&config, &input, &out_dir),
    }
}

async fn serve(config: RexConfig) -> Result<()> {
    let state = Arc::new(ServerState::from_config(&config));
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received"),
            Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
        }
        let _ = shutdown_tx.send(());
    });

    server::run(&config.bind_addr, state, shutdown_rx).await
}

fn convert(config: &RexConfig, input: &Path, out_dir: &Path) -> Result<()> {
    let body =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let outcome = Exporter::from_config(config)
        .export_bytes(&body)
        .with_context(|| format!("Failed to export {}", input.display()))?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let path = out_dir.join(&outcome.filename);
    std::fs::write(&path, &outcome.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(sheets = outcome.sheet_count, "Wrote {}", path.display());
    println!("{}", path.display());
    Ok(())
}
