//! Conversation Controller
//!
//! The state machine behind the questionnaire:
//!
//! ```text
//! Asking(0) -> Asking(1) -> ... -> Asking(n-1) -> Complete -> AwaitingRestart
//!     ^                                                            |
//!     +------------------------- yes -------------------------------+
//!                                                                  | no
//!                                                             Terminated
//! ```
//!
//! Every operation takes the session explicitly. Failed operations leave it
//! untouched.

use thiserror::Error;

use crate::estimator::{self, EstimateError, EstimateInput, EstimateParams, EstimateResult, Scope};
use crate::messages::MessageRole;
use crate::questions::{questionnaire, Question, QuestionKey};
use crate::session::{Phase, SessionState};
use crate::validation::{validate_answer, Advisory, AnswerValue, ValidationError};

/// Prompt appended after the estimate summary
pub const RESTART_PROMPT: &str = "Would you like to make another calculation? (yes / no)";

/// Heading shown by surfaces above the conversation
pub const APP_TITLE: &str = "City Paint Estimator with Gemini";

/// One-line description shown under the title
pub const APP_CAPTION: &str =
    "Your smart assistant to estimate how many paint buckets are needed for the entire city.";

/// Message appended when the user declines to restart
pub const CLOSING_MESSAGE: &str = "Thank you for using City Paint Estimator with Gemini.";

/// Inputs that accept the restart offer
pub const AFFIRMATIVE_TOKENS: &[&str] = &["yes", "yess", "y", "sure", "ok"];

/// Errors from controller operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    /// The answer failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The estimator rejected the collected answers
    #[error(transparent)]
    Estimate(#[from] EstimateError),
    /// Operation called in the wrong phase
    #[error("cannot {operation} while {actual:?}")]
    WrongPhase {
        /// The operation attempted
        operation: &'static str,
        /// The phase the session was in
        actual: Phase,
    },
    /// An answer needed for the estimate is missing or has the wrong type
    #[error("missing answer for {0}")]
    MissingAnswer(QuestionKey),
}

/// Result of an accepted answer
#[derive(Clone, Debug, PartialEq)]
pub enum AnswerOutcome {
    /// Moved on to the question at `cursor`
    Advanced {
        /// New active question index
        cursor: usize,
        /// Notice to show the user
        advisory: Option<Advisory>,
    },
    /// That was the last question
    Finished {
        /// Notice to show the user
        advisory: Option<Advisory>,
    },
}

impl AnswerOutcome {
    /// Notice attached to the accepted answer
    pub fn advisory(&self) -> Option<&Advisory> {
        match self {
            Self::Advanced { advisory, .. } | Self::Finished { advisory } => advisory.as_ref(),
        }
    }
}

/// Result of the restart prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartDecision {
    /// Session reset to the first question
    Restarted,
    /// Session closed
    Declined,
}

/// Drives a [`SessionState`] through the questionnaire
#[derive(Clone, Debug)]
pub struct Controller {
    questions: &'static [Question],
    params: EstimateParams,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(EstimateParams::default())
    }
}

impl Controller {
    /// Create a controller using the given estimate constants
    pub fn new(params: EstimateParams) -> Self {
        Self {
            questions: questionnaire(),
            params,
        }
    }

    /// Questions in order
    pub fn questions(&self) -> &'static [Question] {
        self.questions
    }

    /// Estimate constants
    pub fn params(&self) -> &EstimateParams {
        &self.params
    }

    /// Fresh session positioned on the first question
    pub fn start(&self) -> SessionState {
        SessionState::new(self.first_prompt())
    }

    /// Active question, if the session is asking one
    pub fn active_question(&self, state: &SessionState) -> Option<&'static Question> {
        match state.phase() {
            Phase::Asking { cursor } => self.questions.get(cursor),
            _ => None,
        }
    }

    /// Validate and store an answer to the active question
    ///
    /// # Errors
    ///
    /// [`ControllerError::Validation`] when the input is rejected,
    /// [`ControllerError::Estimate`] when the last answer leaves the estimate
    /// uncomputable, and [`ControllerError::WrongPhase`] when no question is
    /// active. In every case the session is unchanged.
    pub fn submit_answer(
        &self,
        state: &mut SessionState,
        raw: &str,
    ) -> Result<AnswerOutcome, ControllerError> {
        let question = self
            .active_question(state)
            .ok_or(ControllerError::WrongPhase {
                operation: "submit an answer",
                actual: state.phase(),
            })?;

        let validated = validate_answer(question, raw).map_err(|e| {
            tracing::debug!(key = %question.key, error = ?e, "Answer rejected");
            e
        })?;

        if let Some(ref advisory) = validated.advisory {
            tracing::info!(key = %question.key, advisory = ?advisory, "Answer adjusted");
        }
        tracing::debug!(key = %question.key, value = %validated.value, "Answer accepted");

        let next = state.cursor() + 1;
        if next < self.questions.len() {
            state.push(MessageRole::User, raw);
            state.store_answer(question.key, validated.value);
            state.advance();
            state.push(MessageRole::Assistant, self.questions[next].prompt);
            return Ok(AnswerOutcome::Advanced {
                cursor: next,
                advisory: validated.advisory,
            });
        }

        // The last answer only lands if the estimate can be computed from it
        let mut staged = state.clone();
        staged.push(MessageRole::User, raw);
        staged.store_answer(question.key, validated.value);
        let input = self.estimate_input(&staged)?;
        estimator::compute(&input, &self.params).map_err(|e| {
            tracing::warn!(session = %state.id, error = %e, "Answers cannot be estimated");
            e
        })?;

        staged.mark_completed();
        *state = staged;
        Ok(AnswerOutcome::Finished {
            advisory: validated.advisory,
        })
    }

    /// Compute the estimate and offer a restart
    ///
    /// # Errors
    ///
    /// [`ControllerError::WrongPhase`] unless every question has been
    /// answered and the estimate has not been shown yet.
    pub fn complete(&self, state: &mut SessionState) -> Result<EstimateResult, ControllerError> {
        if state.phase() != Phase::Complete {
            return Err(ControllerError::WrongPhase {
                operation: "complete",
                actual: state.phase(),
            });
        }

        let input = self.estimate_input(state)?;
        let result = estimator::compute(&input, &self.params)?;

        tracing::info!(
            session = %state.id,
            scope = %input.scope,
            cans = result.cans,
            "Estimate computed"
        );

        state.push(
            MessageRole::Assistant,
            format_summary(&result, input.coats, self.params.can_volume),
        );
        state.push(MessageRole::Assistant, RESTART_PROMPT);
        state.mark_awaiting_restart();

        Ok(result)
    }

    /// Handle the answer to the restart prompt
    ///
    /// # Errors
    ///
    /// [`ControllerError::WrongPhase`] unless the restart prompt is pending.
    pub fn submit_restart_decision(
        &self,
        state: &mut SessionState,
        raw: &str,
    ) -> Result<RestartDecision, ControllerError> {
        if state.phase() != Phase::AwaitingRestart {
            return Err(ControllerError::WrongPhase {
                operation: "answer the restart prompt",
                actual: state.phase(),
            });
        }

        let normalized = raw.trim().to_lowercase();
        if is_affirmative(&normalized) {
            self.reset(state);
            Ok(RestartDecision::Restarted)
        } else {
            state.push(MessageRole::User, normalized);
            state.push(MessageRole::Assistant, CLOSING_MESSAGE);
            state.terminate();
            tracing::info!(session = %state.id, "Session closed by user");
            Ok(RestartDecision::Declined)
        }
    }

    /// Return the session to the first question, whatever its phase
    pub fn reset(&self, state: &mut SessionState) {
        state.reset(self.first_prompt());
        tracing::debug!(session = %state.id, "Session reset");
    }

    fn first_prompt(&self) -> &'static str {
        self.questions.first().map_or("", |q| q.prompt)
    }

    fn estimate_input(&self, state: &SessionState) -> Result<EstimateInput, ControllerError> {
        let scope: Scope = state
            .answer(QuestionKey::Scope)
            .and_then(AnswerValue::as_text)
            .ok_or(ControllerError::MissingAnswer(QuestionKey::Scope))?
            .parse()?;
        let count = |key| {
            state
                .answer(key)
                .and_then(AnswerValue::as_count)
                .ok_or(ControllerError::MissingAnswer(key))
        };
        let amount = |key| {
            state
                .answer(key)
                .and_then(AnswerValue::as_f64)
                .ok_or(ControllerError::MissingAnswer(key))
        };

        Ok(EstimateInput {
            scope,
            buildings: count(QuestionKey::Buildings)?,
            avg_area: amount(QuestionKey::Area)?,
            floors: count(QuestionKey::Floors)?,
            coats: amount(QuestionKey::Layers)?,
        })
    }
}

/// Whether a normalized input accepts the restart offer
pub fn is_affirmative(normalized: &str) -> bool {
    AFFIRMATIVE_TOKENS.contains(&normalized)
}

/// Three-line summary shown after the last answer
///
/// Coats are shown as a whole number; the litres still use the exact value.
pub fn format_summary(result: &EstimateResult, coats: f64, can_volume: f64) -> String {
    format!(
        "Net area after excluding doors/windows: {:.0} m²\n\
         Total liters required ({} coat(s)): {:.0} L\n\
         You'll need approximately {} buckets ({can_volume}L each) to paint the entire city.",
        result.net_area,
        coats.trunc(),
        result.liters_needed,
        result.cans
    )
}
