//! Session State
//!
//! Everything one conversation remembers: the transcript, the answers
//! collected so far, and where in the questionnaire the user is.
//!
//! # Design Philosophy
//!
//! A session is plain data. The [`Controller`](crate::controller::Controller)
//! is the only thing that mutates it, one validated input at a time, and the
//! caller decides where it lives (owned by a Conductor, keyed in a
//! [`SessionRegistry`](crate::registry::SessionRegistry), or on the stack of
//! a test). Nothing is persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::messages::{MessageId, MessageRole, SessionId};
use crate::questions::QuestionKey;
use crate::validation::AnswerValue;

/// A transcript entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique message ID
    pub id: MessageId,
    /// Who said it
    pub role: MessageRole,
    /// Text as displayed
    pub content: String,
    /// When the entry was appended (Unix timestamp ms)
    pub timestamp: i64,
}

impl HistoryEntry {
    /// Create a new entry stamped with the current time
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Where the conversation is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the answer to `questions[cursor]`
    Asking {
        /// Index of the active question
        cursor: usize,
    },
    /// All answers collected, estimate not yet shown
    Complete,
    /// Estimate shown, waiting for yes/no
    AwaitingRestart,
    /// User declined to restart
    Terminated,
}

/// State of one conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique session ID
    pub id: SessionId,
    history: Vec<HistoryEntry>,
    answers: BTreeMap<QuestionKey, AnswerValue>,
    cursor: usize,
    completed: bool,
    awaiting_restart: bool,
    terminated: bool,
}

impl SessionState {
    /// Create a session whose transcript starts with `first_prompt`
    pub fn new(first_prompt: &str) -> Self {
        Self::with_id(SessionId::new(), first_prompt)
    }

    /// Create a session with a specific ID
    pub fn with_id(id: SessionId, first_prompt: &str) -> Self {
        Self {
            id,
            history: vec![HistoryEntry::new(MessageRole::Assistant, first_prompt)],
            answers: BTreeMap::new(),
            cursor: 0,
            completed: false,
            awaiting_restart: false,
            terminated: false,
        }
    }

    /// Current phase, derived from the flags
    pub fn phase(&self) -> Phase {
        if self.terminated {
            Phase::Terminated
        } else if self.awaiting_restart {
            Phase::AwaitingRestart
        } else if self.completed {
            Phase::Complete
        } else {
            Phase::Asking {
                cursor: self.cursor,
            }
        }
    }

    /// Transcript, oldest first
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Answers collected so far
    pub fn answers(&self) -> &BTreeMap<QuestionKey, AnswerValue> {
        &self.answers
    }

    /// Answer for a question, if given
    pub fn answer(&self, key: QuestionKey) -> Option<&AnswerValue> {
        self.answers.get(&key)
    }

    /// Index of the active question
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether all questions have been answered
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether the restart prompt is pending
    pub fn is_awaiting_restart(&self) -> bool {
        self.awaiting_restart
    }

    /// Whether the session is over
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub(crate) fn push(&mut self, role: MessageRole, content: impl Into<String>) {
        self.history.push(HistoryEntry::new(role, content));
    }

    pub(crate) fn store_answer(&mut self, key: QuestionKey, value: AnswerValue) {
        self.answers.insert(key, value);
    }

    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
    }

    pub(crate) fn mark_awaiting_restart(&mut self) {
        self.awaiting_restart = true;
    }

    pub(crate) fn terminate(&mut self) {
        self.awaiting_restart = false;
        self.terminated = true;
    }

    /// Return to the initial state, keeping the session ID
    pub(crate) fn reset(&mut self, first_prompt: &str) {
        let id = self.id.clone();
        *self = Self::with_id(id, first_prompt);
    }
}
