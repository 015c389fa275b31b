//! Enumerations for TUI state management.

/// Which screen or overlay currently receives key presses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    TaskList,
    AddTask,
    Help,
    ConfirmClear,
}

/// Action that a key press asks the event loop to take.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    Continue,
    Quit,
}
