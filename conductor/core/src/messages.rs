//! Conductor Messages
//!
//! Messages sent from the Conductor to UI surfaces. Surfaces render what they
//! are told and keep no business logic of their own.
//!
//! # Design Philosophy
//!
//! The transcript is append-only: each new history entry is published once as
//! a [`ConductorMessage::Message`]. When the session restarts, the Conductor
//! sends [`ConductorMessage::TranscriptReset`] and republishes from scratch, so
//! a surface never has to diff.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::estimator::EstimateResult;
use crate::session::HistoryEntry;

/// Messages from Conductor to UI Surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ConductorMessage {
    // ============================================
    // Transcript Messages
    // ============================================
    /// A transcript entry to display
    Message {
        /// Unique message ID for tracking
        id: MessageId,
        /// Who sent this message
        role: MessageRole,
        /// The message content
        content: String,
    },

    /// Discard everything displayed so far; a fresh transcript follows
    TranscriptReset,

    /// Full transcript snapshot (sent to newly connected surfaces)
    Transcript {
        /// Every entry, oldest first
        entries: Vec<HistoryEntry>,
    },

    /// Questionnaire progress
    Progress {
        /// Number of answers collected
        answered: usize,
        /// Number of questions
        total: usize,
    },

    /// An estimate was computed
    Estimate {
        /// The computed quantities
        result: EstimateResult,
    },

    // ============================================
    // System Messages
    // ============================================
    /// System notification (validation warnings, advisories, errors)
    Notify {
        /// Notification level
        level: NotifyLevel,
        /// Title (optional)
        title: Option<String>,
        /// Message content
        message: String,
    },

    /// Conductor state change
    State {
        /// The new state
        state: ConductorState,
    },

    /// Acknowledgment of received event
    Ack {
        /// Event ID being acknowledged
        event_id: EventId,
    },

    /// Session information
    SessionInfo {
        /// Session ID
        session_id: SessionId,
        /// Configured language model (never queried)
        model: String,
        /// Whether the session accepts answers
        ready: bool,
    },

    /// Request surface to quit
    Quit {
        /// Optional goodbye message
        message: Option<String>,
    },
}

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Event identifier (for acks)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new random session ID
    pub fn new() -> Self {
        Self(format!("session_{}", Uuid::new_v4().simple()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// User input
    User,
    /// The estimator assistant
    Assistant,
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
}

/// Conductor operational states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorState {
    /// Starting up, not ready
    Initializing,
    /// Configuration is missing; no interaction possible
    Blocked,
    /// Waiting for an answer to the current question
    Asking,
    /// Estimate shown, waiting for a yes/no restart decision
    AwaitingRestart,
    /// The user declined to restart
    Ended,
    /// Shutting down
    ShuttingDown,
}

impl ConductorState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Initializing => "Starting up...",
            Self::Blocked => "Configuration error",
            Self::Asking => "Waiting for your answer",
            Self::AwaitingRestart => "Another calculation?",
            Self::Ended => "Session closed",
            Self::ShuttingDown => "Shutting down...",
        }
    }

    /// Whether user messages are processed in this state
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Asking | Self::AwaitingRestart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_unique() {
        let id1 = MessageId::new();
        let id2 = MessageId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_id_unique() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
        assert!(id1.0.starts_with("session_"));
    }

    #[test]
    fn test_conductor_state_input() {
        assert!(ConductorState::Asking.accepts_input());
        assert!(ConductorState::AwaitingRestart.accepts_input());
        assert!(!ConductorState::Blocked.accepts_input());
        assert!(!ConductorState::Ended.accepts_input());
        assert_eq!(ConductorState::Blocked.description(), "Configuration error");
    }

    #[test]
    fn test_message_serializes() {
        let msg = ConductorMessage::Notify {
            level: NotifyLevel::Warning,
            title: None,
            message: "Please enter a valid number.".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("Warning"));
        let back: ConductorMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, ConductorMessage::Notify { level: NotifyLevel::Warning, .. }));
    }
}
