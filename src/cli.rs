use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cmd::Commands;
use crate::store::DEFAULT_SLOT;

/// Learning-goal tracker backed by a local JSON slot.
/// Storage defaults to ~/.goals/learningTodos.json.
#[derive(Parser)]
#[command(name = "goals", version, about = "Track learning goals from the terminal")]
pub struct Cli {
    /// Directory holding the storage slots.
    #[arg(long, global = true, env = "GOALS_DIR")]
    pub dir: Option<PathBuf>,

    /// Name of the storage slot inside the directory.
    #[arg(long, global = true, env = "GOALS_SLOT", default_value = DEFAULT_SLOT)]
    pub slot: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Decrease log verbosity (-qq errors only).
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Pick the log level from the verbosity flags.
pub fn log_level(verbose: u8, quiet: u8) -> &'static str {
    if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    }
}

/// Install the stderr tracing subscriber. `RUST_LOG` wins over the flags.
///
/// With `interactive` set, logging stays off unless `RUST_LOG` asks for it,
/// so log lines don't tear the terminal UI.
pub fn init_tracing(verbose: u8, quiet: u8, interactive: bool) -> anyhow::Result<()> {
    let default_level = if interactive { "off" } else { log_level(verbose, quiet) };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}
