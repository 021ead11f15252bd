//! Theme and Colors
//!
//! A fresh-paint palette: a teal accent for the estimator, green for the
//! user, and warm warning tones for notices.

use estimator_conductor::{ConductorState, NotifyLevel};
use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Transcript Colors
// ============================================================================

/// Estimator voice - wet teal paint
pub const ESTIMATOR_TEAL: Color = Color::Rgb(64, 196, 196);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

// ============================================================================
// Notice Colors
// ============================================================================

/// Warning amber
pub const WARNING_AMBER: Color = Color::Rgb(255, 191, 0);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Paint-bucket orange for the status bar accent
pub const BUCKET_ORANGE: Color = Color::Rgb(255, 140, 60);

/// Style for a notification line
pub fn notice_style(level: NotifyLevel) -> Style {
    match level {
        NotifyLevel::Info => Style::default().fg(DIM_GRAY),
        NotifyLevel::Warning => Style::default().fg(WARNING_AMBER),
        NotifyLevel::Error => Style::default().fg(ERROR_RED).add_modifier(Modifier::BOLD),
    }
}

/// Style for the status bar in a given conductor state
pub fn status_style(state: ConductorState) -> Style {
    match state {
        ConductorState::Blocked => Style::default().fg(ERROR_RED),
        ConductorState::AwaitingRestart => Style::default().fg(BUCKET_ORANGE),
        ConductorState::Initializing | ConductorState::ShuttingDown => {
            Style::default().fg(ESTIMATOR_TEAL)
        }
        ConductorState::Asking | ConductorState::Ended => Style::default().fg(DIM_GRAY),
    }
}
