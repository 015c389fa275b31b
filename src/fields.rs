//! Enumerations shared by the CLI and the terminal interface.

use clap::ValueEnum;

/// Which slice of the task list a view shows.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterMode {
    /// Filter modes in the order they appear as tabs.
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::Active, FilterMode::Completed];

    /// Position of this mode in [`FilterMode::ALL`].
    pub fn index(self) -> usize {
        match self {
            FilterMode::All => 0,
            FilterMode::Active => 1,
            FilterMode::Completed => 2,
        }
    }

    /// The mode after this one, wrapping from `Completed` back to `All`.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// The mode before this one, wrapping from `All` to `Completed`.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Whether a task with the given completion flag belongs in this view.
    pub fn matches(self, completed: bool) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !completed,
            FilterMode::Completed => completed,
        }
    }
}

/// Format a filter mode for display.
pub fn format_filter(mode: FilterMode) -> &'static str {
    match mode {
        FilterMode::All => "All",
        FilterMode::Active => "Active",
        FilterMode::Completed => "Completed",
    }
}
