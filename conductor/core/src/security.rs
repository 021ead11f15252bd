//! Input Screening
//!
//! Raw surface input is screened before it reaches the controller:
//! oversized lines and control characters are rejected outright, and
//! commands must look like commands.
//!
//! This is separate from answer validation. A screened message can still be
//! a wrong answer; an unscreened one never reaches the questionnaire.

use serde::{Deserialize, Serialize};

/// Configuration limits for the Conductor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConductorLimits {
    /// Maximum size of a single message in bytes (default: 4KB)
    pub max_message_size: usize,
    /// Maximum command arguments (default: 4)
    pub max_command_args: usize,
}

impl Default for ConductorLimits {
    fn default() -> Self {
        Self {
            max_message_size: 4 * 1024,
            max_command_args: 4,
        }
    }
}

/// Result of input screening
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    /// Input is acceptable
    Valid,
    /// Input is rejected with reason
    Invalid(String),
}

impl ValidationResult {
    /// Check if the result indicates valid input
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Get the error message if invalid
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(msg) => Some(msg),
        }
    }
}

/// Screens user messages and commands from surfaces
#[derive(Clone, Debug, Default)]
pub struct InputValidator {
    limits: ConductorLimits,
}

impl InputValidator {
    /// Create a new input validator with the given limits
    pub fn new(limits: ConductorLimits) -> Self {
        Self { limits }
    }

    /// Screen a user message
    pub fn validate_message(&self, content: &str) -> ValidationResult {
        if content.len() > self.limits.max_message_size {
            return ValidationResult::Invalid(format!(
                "Message too large: {} bytes (max: {})",
                content.len(),
                self.limits.max_message_size
            ));
        }

        if content
            .chars()
            .any(|c| c.is_control() && c != '\t' && c != '\r' && c != '\n')
        {
            return ValidationResult::Invalid(
                "Message contains invalid control characters".to_string(),
            );
        }

        ValidationResult::Valid
    }

    /// Screen a user command
    pub fn validate_command(&self, command: &str, args: &[String]) -> ValidationResult {
        if command.is_empty() {
            return ValidationResult::Invalid("Empty command name".to_string());
        }

        if command.len() > 32 {
            return ValidationResult::Invalid("Command name too long".to_string());
        }

        if !command
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return ValidationResult::Invalid(
                "Command name contains invalid characters".to_string(),
            );
        }

        if args.len() > self.limits.max_command_args {
            return ValidationResult::Invalid(format!(
                "Too many command arguments: {} (max: {})",
                args.len(),
                self.limits.max_command_args
            ));
        }

        if let Some(i) = args
            .iter()
            .position(|arg| arg.len() > self.limits.max_message_size)
        {
            return ValidationResult::Invalid(format!("Argument {i} too long"));
        }

        ValidationResult::Valid
    }

    /// Get the current limits
    pub fn limits(&self) -> &ConductorLimits {
        &self.limits
    }
}
