//! Command implementations for the CLI interface.
//!
//! Each handler takes the loaded `TaskStore`, performs one store operation and
//! prints the outcome. Blank text and unknown IDs are reported but are not
//! treated as failures.

use std::io;

use chrono::{DateTime, Local, Utc};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::config::Config;
use crate::fields::{format_filter, FilterMode};
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::run::run_tui;
use crate::view::{counts, empty_message, progress_percent, visible};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// Add a new learning goal.
    Add {
        /// Task text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List tasks.
    List {
        /// Which tasks to show.
        #[arg(long, short, value_enum, default_value_t = FilterMode::All)]
        filter: FilterMode,
    },

    /// Flip a task between active and completed.
    Toggle {
        /// Task ID.
        id: u64,
    },

    /// Remove a task.
    #[command(visible_alias = "delete")]
    Remove {
        /// Task ID.
        id: u64,
    },

    /// Remove every completed task.
    #[command(visible_alias = "clear")]
    ClearCompleted,

    /// Show counts and completion progress.
    Stats,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the terminal user interface.
pub fn cmd_ui(store: TaskStore) -> anyhow::Result<()> {
    run_tui(store)?;
    Ok(())
}

/// Add a new task to the store.
pub fn cmd_add(store: &mut TaskStore, text: Vec<String>) {
    match store.add(&text.join(" ")) {
        Some(task) => println!("Added task {}", task.id),
        None => eprintln!("Ignored empty task text."),
    }
}

/// List tasks under a filter, followed by the stats footer.
pub fn cmd_list(store: &TaskStore, filter: FilterMode) {
    print!("{}", format_list(store.tasks(), filter));
}

/// Toggle completion of a task.
pub fn cmd_toggle(store: &mut TaskStore, id: u64) {
    match store.toggle(id) {
        Some(task) if task.completed => println!("Completed task {}: {}", task.id, task.text),
        Some(task) => println!("Reopened task {}: {}", task.id, task.text),
        None => eprintln!("Task {id} not found; nothing changed."),
    }
}

/// Remove a task.
pub fn cmd_remove(store: &mut TaskStore, id: u64) {
    match store.remove(id) {
        Some(task) => println!("Removed task {}: {}", task.id, task.text),
        None => eprintln!("Task {id} not found; nothing changed."),
    }
}

/// Remove all completed tasks.
pub fn cmd_clear_completed(store: &mut TaskStore) {
    let removed = store.clear_completed();
    println!("Cleared {removed} completed task{}", if removed == 1 { "" } else { "s" });
}

/// Print counts and progress.
pub fn cmd_stats(store: &TaskStore, config: &Config) {
    let c = counts(store.tasks());
    println!("Total:      {}", c.total);
    println!("Active:     {}", c.active);
    println!("Completed:  {}", c.completed);
    println!("Progress:   {}%", progress_percent(store.tasks()));
    println!("Storage:    {}", config.slot_path().display());
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

/// Render the task table, empty-state line and stats footer for `filter`.
pub fn format_list(tasks: &[Task], filter: FilterMode) -> String {
    let shown = visible(tasks, filter);
    let mut out = String::new();
    if shown.is_empty() {
        out.push_str(empty_message(filter));
        out.push('\n');
    } else {
        out.push_str(&format!("{:<2} {:<14} {:<10} {}\n", "", "ID", "Created", "Text"));
        for t in &shown {
            out.push_str(&format!(
                "{:<2} {:<14} {:<10} {}\n",
                t.status_icon(),
                t.id,
                format_date(t.created_at),
                t.text
            ));
        }
    }
    out.push_str(&format_footer(tasks, filter));
    out.push('\n');
    out
}

/// One-line progress summary, e.g. `[All] Completed 1 / 3 (33%)`.
pub fn format_footer(tasks: &[Task], filter: FilterMode) -> String {
    let c = counts(tasks);
    format!(
        "[{}] Completed {} / {} ({}%)",
        format_filter(filter),
        c.completed,
        c.total,
        progress_percent(tasks)
    )
}

/// Local calendar date of a timestamp.
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}
