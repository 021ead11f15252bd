//! Language Model Client Configuration
//!
//! The estimator ships with a language-model client configuration so the
//! deployment looks the same as other assistants: a model name and an API key
//! read from the environment, which may be seeded from a `.env` file. The
//! conversation itself never queries the model; the only behavior here is
//! that a missing key blocks the session.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Load a `.env` file from the working directory or one of its parents
///
/// Variables already present in the environment keep their values. Returns
/// the file that was loaded, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Load a specific `.env` file, returning whether it was read
pub fn load_dotenv_from(path: &Path) -> bool {
    dotenvy::from_path(path).is_ok()
}

/// Credential resolution failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// The API key variable is unset or blank
    #[error("Missing API Key. Please set API key in your environment.")]
    MissingCredential {
        /// The variable that was checked
        var: String,
    },
}

/// Resolved model client configuration
#[derive(Clone, PartialEq, Eq)]
pub struct ModelClientConfig {
    /// Model identifier
    pub model: String,
    api_key: String,
}

impl ModelClientConfig {
    /// Build a configuration from an explicit key
    ///
    /// # Errors
    ///
    /// [`CredentialError::MissingCredential`] if `api_key` is blank.
    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        var: &str,
    ) -> Result<Self, CredentialError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CredentialError::MissingCredential {
                var: var.to_string(),
            });
        }
        Ok(Self {
            model: model.into(),
            api_key,
        })
    }

    /// Read the API key from the environment variable `var`
    ///
    /// # Errors
    ///
    /// [`CredentialError::MissingCredential`] if the variable is unset,
    /// not valid unicode, or blank.
    pub fn from_env(model: impl Into<String>, var: &str) -> Result<Self, CredentialError> {
        let key = std::env::var(var).map_err(|_| CredentialError::MissingCredential {
            var: var.to_string(),
        })?;
        Self::new(model, key, var)
    }

    /// The API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for ModelClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClientConfig")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
