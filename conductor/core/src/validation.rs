//! Answer Validation
//!
//! Turns raw chat text into a typed answer for the active question.
//! Rules are applied in order and the first failure wins; a failure never
//! touches session state.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::estimator::MAX_COATS;
use crate::questions::{Question, QuestionKey, QuestionKind};

/// Why an answer was rejected
///
/// The `Display` text is the warning shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Input does not parse as a finite number
    #[error("Please enter a valid number.")]
    InvalidNumber {
        /// The raw input
        input: String,
    },
    /// Parsed number is zero or negative
    #[error("The number must be greater than 0.")]
    NonPositive {
        /// The parsed value
        value: f64,
    },
    /// A whole number was required
    #[error("Please enter a whole number.")]
    NotInteger {
        /// The parsed value
        value: f64,
    },
    /// Input is not one of the allowed options
    #[error("Please type {}.", .options.join(" or "))]
    InvalidChoice {
        /// The normalized input
        input: String,
        /// Accepted options
        options: Vec<String>,
    },
}

/// A validated answer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnswerValue {
    /// A choice option, lower-cased
    Text(String),
    /// A whole number
    Count(u32),
    /// A positive real number
    Amount(f64),
}

impl AnswerValue {
    /// Text value, if this is a choice answer
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whole-number value
    #[must_use]
    pub fn as_count(&self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value of any number answer
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Count(n) => Some(f64::from(*n)),
            Self::Amount(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Count(n) => write!(f, "{n}"),
            Self::Amount(v) => write!(f, "{v}"),
        }
    }
}

/// Non-blocking notice attached to an accepted answer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advisory {
    /// More than the maximum number of coats was requested
    CoatsClamped,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoatsClamped => {
                f.write_str("You don't need more than 3 coats. I'll use 3 as the maximum.")
            }
        }
    }
}

/// Outcome of a successful validation
#[derive(Clone, Debug, PartialEq)]
pub struct Validated {
    /// The value to store
    pub value: AnswerValue,
    /// Optional notice for the user
    pub advisory: Option<Advisory>,
}

/// Validate raw input against a question
pub fn validate_answer(question: &Question, raw: &str) -> Result<Validated, ValidationError> {
    match question.kind {
        QuestionKind::Number => validate_number(question.key, raw),
        QuestionKind::Choice(options) => validate_choice(options, raw),
    }
}

fn validate_number(key: QuestionKey, raw: &str) -> Result<Validated, ValidationError> {
    let trimmed = raw.trim();
    let parsed: f64 = trimmed
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber {
            input: trimmed.to_string(),
        })?;

    if parsed <= 0.0 {
        return Err(ValidationError::NonPositive { value: parsed });
    }

    if key.requires_integer() {
        if parsed.fract() != 0.0 {
            return Err(ValidationError::NotInteger { value: parsed });
        }
        if parsed > f64::from(u32::MAX) {
            return Err(ValidationError::InvalidNumber {
                input: trimmed.to_string(),
            });
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = parsed as u32;
        return Ok(Validated {
            value: AnswerValue::Count(count),
            advisory: None,
        });
    }

    if key == QuestionKey::Layers && parsed > MAX_COATS {
        return Ok(Validated {
            value: AnswerValue::Amount(MAX_COATS),
            advisory: Some(Advisory::CoatsClamped),
        });
    }

    Ok(Validated {
        value: AnswerValue::Amount(parsed),
        advisory: None,
    })
}

fn validate_choice(options: &[&str], raw: &str) -> Result<Validated, ValidationError> {
    let normalized = raw.trim().to_lowercase();
    if options.contains(&normalized.as_str()) {
        Ok(Validated {
            value: AnswerValue::Text(normalized),
            advisory: None,
        })
    } else {
        Err(ValidationError::InvalidChoice {
            input: normalized,
            options: options.iter().map(|o| (*o).to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::QUESTIONS;

    fn question(key: QuestionKey) -> &'static Question {
        QUESTIONS.iter().find(|q| q.key == key).unwrap()
    }

    #[test]
    fn test_scope_is_normalized() {
        let v = validate_answer(question(QuestionKey::Scope), "  Both \n").unwrap();
        assert_eq!(v.value, AnswerValue::Text("both".to_string()));
        assert_eq!(v.advisory, None);
    }

    #[test]
    fn test_scope_rejects_unknown() {
        let err = validate_answer(question(QuestionKey::Scope), "maybe").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidChoice { .. }));
        assert_eq!(err.to_string(), "Please type interior or exterior or both.");
    }

    #[test]
    fn test_invalid_number() {
        for raw in ["abc", "", "12abc", "nan", "inf", "-inf"] {
            let err = validate_answer(question(QuestionKey::Area), raw).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidNumber { .. }),
                "{raw:?} should be InvalidNumber"
            );
        }
    }

    #[test]
    fn test_non_positive_checked_before_integer() {
        let err = validate_answer(question(QuestionKey::Buildings), "-1.5").unwrap_err();
        assert!(matches!(err, ValidationError::NonPositive { .. }));
        let err = validate_answer(question(QuestionKey::Floors), "0").unwrap_err();
        assert!(matches!(err, ValidationError::NonPositive { .. }));
    }

    #[test]
    fn test_buildings_must_be_whole() {
        let err = validate_answer(question(QuestionKey::Buildings), "3.5").unwrap_err();
        assert_eq!(err, ValidationError::NotInteger { value: 3.5 });
        assert_eq!(err.to_string(), "Please enter a whole number.");

        let ok = validate_answer(question(QuestionKey::Buildings), "3.0").unwrap();
        assert_eq!(ok.value, AnswerValue::Count(3));
    }

    #[test]
    fn test_area_accepts_fraction() {
        let ok = validate_answer(question(QuestionKey::Area), " 250.75 ").unwrap();
        assert_eq!(ok.value, AnswerValue::Amount(250.75));
    }

    #[test]
    fn test_layers_clamped_with_advisory() {
        let ok = validate_answer(question(QuestionKey::Layers), "5").unwrap();
        assert_eq!(ok.value, AnswerValue::Amount(3.0));
        assert_eq!(ok.advisory, Some(Advisory::CoatsClamped));

        let ok = validate_answer(question(QuestionKey::Layers), "3").unwrap();
        assert_eq!(ok.value, AnswerValue::Amount(3.0));
        assert_eq!(ok.advisory, None);
    }

    #[test]
    fn test_answer_value_display() {
        assert_eq!(AnswerValue::Amount(2.0).to_string(), "2");
        assert_eq!(AnswerValue::Amount(2.5).to_string(), "2.5");
        assert_eq!(AnswerValue::Count(4).to_string(), "4");
    }
}
