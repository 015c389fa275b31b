//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Header and status bar background.
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Progress gauge fill.
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Confirmation dialogs.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Completed rows.
pub const MUTED: Color = Color::DarkGray;
