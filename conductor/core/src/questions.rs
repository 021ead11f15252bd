//! Questionnaire
//!
//! The fixed sequence of questions the Conductor walks a user through.
//! Questions are defined at compile time and never change during a session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a question and the answer slot it fills
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKey {
    /// Interior, exterior or both
    Scope,
    /// Number of buildings
    Buildings,
    /// Average wall area per building (m²)
    Area,
    /// Average floors per building
    Floors,
    /// Coats of paint
    Layers,
}

impl QuestionKey {
    /// Stable identifier used in logs and serialized answers
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scope => "scope",
            Self::Buildings => "buildings",
            Self::Area => "area",
            Self::Floors => "floors",
            Self::Layers => "layers",
        }
    }

    /// Whether answers to this question must be whole numbers
    #[must_use]
    pub fn requires_integer(&self) -> bool {
        matches!(self, Self::Buildings | Self::Floors)
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an answer is interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionKind {
    /// One of a fixed set of lower-case options
    Choice(&'static [&'static str]),
    /// A positive number
    Number,
}

impl QuestionKind {
    /// Allowed values for a choice question
    #[must_use]
    pub fn allowed_values(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::Choice(options) => Some(options),
            Self::Number => None,
        }
    }
}

/// A single question in the conversation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Question {
    /// Answer slot
    pub key: QuestionKey,
    /// Text shown to the user
    pub prompt: &'static str,
    /// Answer interpretation
    pub kind: QuestionKind,
}

/// Options accepted for the scope question
pub const SCOPE_OPTIONS: &[&str] = &["interior", "exterior", "both"];

/// The questionnaire, in the order it is asked
pub const QUESTIONS: [Question; 5] = [
    Question {
        key: QuestionKey::Scope,
        prompt: "What is the scope of your painting project? (type interior / exterior / both)",
        kind: QuestionKind::Choice(SCOPE_OPTIONS),
    },
    Question {
        key: QuestionKey::Buildings,
        prompt: "How many buildings do you plan to paint?",
        kind: QuestionKind::Number,
    },
    Question {
        key: QuestionKey::Area,
        prompt: "What is the average wall area (in m²) of each building?",
        kind: QuestionKind::Number,
    },
    Question {
        key: QuestionKey::Floors,
        prompt: "How many floors does each building have on average?",
        kind: QuestionKind::Number,
    },
    Question {
        key: QuestionKey::Layers,
        prompt: "How many coats of paint do you plan to apply?",
        kind: QuestionKind::Number,
    },
];

/// The questionnaire as a slice
#[must_use]
pub fn questionnaire() -> &'static [Question] {
    &QUESTIONS
}
