use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

mod config;
mod replay;
mod tally;

use config::Config;
use replay::Replayer;
use tally::Tally;

#[derive(Parser, Debug)]
#[command(
    name = "ministore-replay",
    about = "Replays JSON-lines actions and prints the final state"
)]
struct Cli {
    /// Config file to use instead of searching for .ministore.toml
    #[arg(short, long, env = "MINISTORE_CONFIG")]
    config: Option<PathBuf>,

    /// Action log to replay; stdin when absent or `-`
    input: Option<PathBuf>,
}

impl Cli {
    fn input_file(&self) -> Option<&Path> {
        self.input.as_deref().filter(|path| *path != Path::new("-"))
    }
}

fn main() -> Result<()> {
    // .env may set RUST_LOG, so load it before the logger
    let dotenv = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match dotenv {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) => log::debug!("No .env file loaded: {}", e),
    }

    let cli = Cli::parse();

    let config = Config::resolve(cli.config.as_deref())?;
    log::debug!("Config: {:?}", config);

    let preloaded_state = match &config.initial_state {
        Some(path) => Some(load_state(path)?),
        None => None,
    };

    let replayer = Replayer::new(&config, preloaded_state)?;

    let summary = match cli.input_file() {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            replayer.replay(BufReader::new(file), config.strict)?
        }
        None => replayer.replay(io::stdin().lock(), config.strict)?,
    };

    log::info!(
        "Replay finished: {} dispatched, {} ignored, {} rejected, {} notifications",
        summary.dispatched,
        summary.ignored,
        summary.rejected,
        summary.notifications
    );

    let state = replayer.store().get_state();
    let output = if config.pretty {
        serde_json::to_string_pretty(&*state)
    } else {
        serde_json::to_string(&*state)
    }
    .context("Failed to serialize state")?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", output)?;
    Ok(())
}

fn load_state(path: &Path) -> Result<Tally> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read initial state {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse initial state {}", path.display()))
}
