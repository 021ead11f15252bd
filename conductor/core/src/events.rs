//! Surface Events
//!
//! Events sent from UI surfaces to the Conductor. Surfaces report what the
//! user did; the Conductor decides what it means.

use serde::{Deserialize, Serialize};

use crate::messages::EventId;

/// Events from UI Surface to Conductor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SurfaceEvent {
    // ============================================
    // Connection Events
    // ============================================
    /// Surface connected to Conductor
    Connected {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Surface type identifier
        surface_type: SurfaceType,
        /// Surface capabilities
        capabilities: SurfaceCapabilities,
    },

    /// Surface disconnecting gracefully
    Disconnected {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Reason for disconnect (optional)
        reason: Option<String>,
    },

    /// Surface window/viewport resized
    Resized {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// New width (in surface-specific units)
        width: u32,
        /// New height (in surface-specific units)
        height: u32,
    },

    // ============================================
    // User Input Events
    // ============================================
    /// User submitted a line of text
    UserMessage {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// The raw text
        content: String,
    },

    /// User executed a command (e.g., /help, /restart)
    UserCommand {
        /// Event ID for acknowledgment
        event_id: EventId,
        /// Command name (without leading /)
        command: String,
        /// Command arguments
        args: Vec<String>,
    },

    // ============================================
    // Lifecycle Events
    // ============================================
    /// User requested quit
    QuitRequested {
        /// Event ID for acknowledgment
        event_id: EventId,
    },
}

impl SurfaceEvent {
    /// Generate a new event ID for this event
    pub fn new_event_id() -> EventId {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        EventId(format!("evt_{id}"))
    }

    /// Get the event ID
    pub fn event_id(&self) -> &EventId {
        match self {
            Self::Connected { event_id, .. }
            | Self::Disconnected { event_id, .. }
            | Self::Resized { event_id, .. }
            | Self::UserMessage { event_id, .. }
            | Self::UserCommand { event_id, .. }
            | Self::QuitRequested { event_id } => event_id,
        }
    }

    /// Build a user message event, splitting `/command args` lines into commands
    pub fn from_input_line(line: &str) -> Self {
        let event_id = Self::new_event_id();
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix('/') {
            let mut parts = rest.split_whitespace();
            if let Some(command) = parts.next() {
                return Self::UserCommand {
                    event_id,
                    command: command.to_lowercase(),
                    args: parts.map(str::to_string).collect(),
                };
            }
        }
        Self::UserMessage {
            event_id,
            content: line.to_string(),
        }
    }
}

/// Type of UI surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceType {
    /// Terminal UI (ratatui/crossterm)
    Tui,
    /// Line-mode terminal (stdin/stdout)
    Repl,
    /// Headless (for testing/automation)
    Headless,
    /// Custom surface type
    Custom(String),
}

impl SurfaceType {
    /// Human-readable name
    pub fn name(&self) -> &str {
        match self {
            Self::Tui => "Terminal",
            Self::Repl => "Line mode",
            Self::Headless => "Headless",
            Self::Custom(name) => name,
        }
    }
}

/// Capabilities that a surface can support
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SurfaceCapabilities {
    /// Can display colored text
    pub color: bool,
    /// Can handle mouse/touch input
    pub pointer_input: bool,
    /// Maximum text width (0 = unlimited)
    pub max_width: u32,
}

impl SurfaceCapabilities {
    /// Create capabilities for a standard TUI
    pub fn tui() -> Self {
        Self {
            color: true,
            pointer_input: true,
            max_width: 0,
        }
    }

    /// Create capabilities for the line-mode terminal
    pub fn repl() -> Self {
        Self {
            color: false,
            pointer_input: false,
            max_width: 0,
        }
    }

    /// Create minimal capabilities for headless/testing
    pub fn headless() -> Self {
        Self {
            color: false,
            pointer_input: false,
            max_width: 80,
        }
    }
}
