//! # goals - learning-goal tracker
//!
//! A small terminal tool that keeps a list of learning goals in a local JSON
//! slot, with a CLI for scripting and a TUI for day-to-day use.
//!
//! ## Key Features
//!
//! - **Persisted list**: every change rewrites the slot, so the list survives restarts
//! - **Filters**: view all, active or completed goals, in the order they were added
//! - **Progress**: completed / total counts and a rounded completion percentage
//! - **Seed data**: a fresh or unreadable slot starts with three example goals
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive view
//! goals ui
//!
//! # Add a goal
//! goals add Learn Rust
//!
//! # List what's still open
//! goals list --filter active
//!
//! # Mark a goal done (or undo it)
//! goals toggle 1700000000000
//! ```
//!
//! Data is stored in `~/.goals/learningTodos.json` unless `--dir` / `GOALS_DIR`
//! or `--slot` / `GOALS_SLOT` say otherwise.

use clap::Parser;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fields;
pub mod store;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, Commands::Ui);
    cli::init_tracing(cli.verbose, cli.quiet, interactive)?;
    dispatch(cli)
}

fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env(cli.dir, cli.slot);

    match cli.command {
        // Completions don't touch storage.
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Ui => cmd_ui(config.open_store()?)?,
        Commands::Add { text } => cmd_add(&mut config.open_store()?, text),
        Commands::List { filter } => cmd_list(&config.open_store()?, filter),
        Commands::Toggle { id } => cmd_toggle(&mut config.open_store()?, id),
        Commands::Remove { id } => cmd_remove(&mut config.open_store()?, id),
        Commands::ClearCompleted => cmd_clear_completed(&mut config.open_store()?),
        Commands::Stats => cmd_stats(&config.open_store()?, &config),
    }
    Ok(())
}
