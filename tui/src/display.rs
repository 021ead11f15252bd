//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from ConductorMessages and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client" - it just renders what the Conductor tells it to.
//! Display state is the bridge between ConductorMessages and rendering.
//!
//! - DisplayMessage: A rendered transcript entry
//! - DisplayNotification: The notice line under the transcript
//! - Progress: Which question the user is on

use estimator_conductor::{
    ConductorMessage, ConductorState, EstimateResult, MessageId, MessageRole, NotifyLevel,
};

/// A rendered transcript entry
#[derive(Clone, Debug)]
pub struct DisplayMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: DisplayRole,
    /// The message content
    pub content: String,
}

impl DisplayMessage {
    /// Create a new display message
    pub fn new(id: MessageId, role: MessageRole, content: String) -> Self {
        Self {
            id,
            role: role.into(),
            content,
        }
    }
}

/// Display role for styling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User message
    User,
    /// Estimator message
    Assistant,
}

impl From<MessageRole> for DisplayRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => Self::User,
            MessageRole::Assistant => Self::Assistant,
        }
    }
}

impl DisplayRole {
    /// Get display prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::User => "You: ",
            Self::Assistant => "Estimator: ",
        }
    }
}

/// A notification to display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayNotification {
    /// Notification level
    pub level: NotifyLevel,
    /// Optional title
    pub title: Option<String>,
    /// Message content
    pub message: String,
}

/// The full display state for the TUI
#[derive(Debug)]
pub struct DisplayState {
    /// Transcript entries
    pub messages: Vec<DisplayMessage>,
    /// Conductor state
    pub conductor_state: ConductorState,
    /// Session info
    pub session_model: String,
    /// Whether the session accepts answers
    pub ready: bool,
    /// Pending notification (if any)
    pub notification: Option<DisplayNotification>,
    /// (answered, total)
    pub progress: Option<(usize, usize)>,
    /// Most recent estimate
    pub last_estimate: Option<EstimateResult>,
    /// Goodbye text from the Conductor
    pub goodbye: Option<String>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            conductor_state: ConductorState::Initializing,
            session_model: String::new(),
            ready: false,
            notification: None,
            progress: None,
            last_estimate: None,
            goodbye: None,
        }
    }
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a ConductorMessage to update display state
    pub fn apply_message(&mut self, msg: ConductorMessage) {
        match msg {
            // Transcript messages
            ConductorMessage::Message { id, role, content } => {
                self.messages.push(DisplayMessage::new(id, role, content));
            }
            ConductorMessage::TranscriptReset => {
                self.messages.clear();
                self.last_estimate = None;
            }
            ConductorMessage::Transcript { entries } => {
                self.messages = entries
                    .into_iter()
                    .map(|e| DisplayMessage::new(e.id, e.role, e.content))
                    .collect();
            }
            ConductorMessage::Progress { answered, total } => {
                self.progress = Some((answered, total));
            }
            ConductorMessage::Estimate { result } => {
                self.last_estimate = Some(result);
            }

            // System messages
            ConductorMessage::State { state } => {
                self.conductor_state = state;
            }
            ConductorMessage::SessionInfo { model, ready, .. } => {
                self.session_model = model;
                self.ready = ready;
            }
            ConductorMessage::Notify {
                level,
                title,
                message,
            } => {
                self.notification = Some(DisplayNotification {
                    level,
                    title,
                    message,
                });
            }
            ConductorMessage::Quit { message } => {
                self.goodbye = message;
            }
            ConductorMessage::Ack { .. } => {}
        }
    }

    /// Status bar progress text
    pub fn progress_label(&self) -> Option<String> {
        match (self.conductor_state, self.progress) {
            (ConductorState::Asking, Some((answered, total))) if answered < total => {
                Some(format!("Question {} of {total}", answered + 1))
            }
            (ConductorState::AwaitingRestart, _) => Some("Estimate ready".to_string()),
            _ => None,
        }
    }

    /// Clear the notification
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }
}
