//! Read-only projections over the task collection.
//!
//! Everything here is recomputed from the current tasks on every call; nothing
//! is cached between mutations.

use crate::fields::FilterMode;
use crate::task::Task;

/// Number of tasks in each completion state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl Counts {
    /// Count belonging to a filter tab.
    pub fn for_mode(&self, mode: FilterMode) -> usize {
        match mode {
            FilterMode::All => self.total,
            FilterMode::Active => self.active,
            FilterMode::Completed => self.completed,
        }
    }
}

/// Tasks shown under `mode`, in insertion order.
pub fn visible(tasks: &[Task], mode: FilterMode) -> Vec<&Task> {
    tasks.iter().filter(|t| mode.matches(t.completed)).collect()
}

/// Count total, active and completed tasks. `active + completed` always equals `total`.
pub fn counts(tasks: &[Task]) -> Counts {
    let completed = tasks.iter().filter(|t| t.completed).count();
    Counts {
        total: tasks.len(),
        active: tasks.len() - completed,
        completed,
    }
}

/// Share of completed tasks as a rounded percentage; 0 for an empty list.
pub fn progress_percent(tasks: &[Task]) -> u8 {
    let c = counts(tasks);
    if c.total == 0 {
        return 0;
    }
    (c.completed as f64 / c.total as f64 * 100.0).round() as u8
}

/// Message shown when `mode` has nothing to display.
pub fn empty_message(mode: FilterMode) -> &'static str {
    match mode {
        FilterMode::All => "No tasks yet",
        FilterMode::Active => "No active tasks",
        FilterMode::Completed => "No completed tasks",
    }
}
