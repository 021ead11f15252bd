//! TOML Configuration File Support
//!
//! Loads the Conductor configuration from an optional TOML file at
//! `~/.config/city-paint-estimator/config.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. Environment variables
//! 2. TOML configuration file
//! 3. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [estimate]
//! can_volume = 18.0
//! loss_rate = 0.08
//! coverage = 12.0
//! openings_rate = 0.15
//!
//! [model]
//! name = "gemini-2.0-flash"
//! api_key_env = "GOOGLE_API_KEY"
//!
//! [security]
//! max_message_size = 4096
//! max_command_args = 4
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conductor::ConductorConfig;

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "PAINT_ESTIMATOR_CONFIG";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// At least one value from an environment variable
    Env,
    /// Values from the TOML configuration file
    File,
    /// Default values only
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Estimate constants section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateToml {
    /// Litres per can
    pub can_volume: Option<f64>,
    /// Waste overhead fraction
    pub loss_rate: Option<f64>,
    /// m² per litre
    pub coverage: Option<f64>,
    /// Door/window fraction
    pub openings_rate: Option<f64>,
}

/// Language model section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelToml {
    /// Model identifier
    pub name: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
}

/// Security section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityToml {
    /// Maximum message size in bytes
    pub max_message_size: Option<usize>,
    /// Maximum arguments per command
    pub max_command_args: Option<usize>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorToml {
    /// Estimate constants
    pub estimate: EstimateToml,
    /// Language model
    pub model: ModelToml,
    /// Input limits
    pub security: SecurityToml,
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// `$PAINT_ESTIMATOR_CONFIG` if set, else
/// `$XDG_CONFIG_HOME/city-paint-estimator/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|p| p.join("city-paint-estimator").join("config.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed,
/// or if the resulting estimate constants are invalid. A missing config file
/// is not an error.
pub fn load_config() -> Result<ConductorConfig, ConfigError> {
    load_config_from_path(default_config_path().as_deref(), |name| {
        std::env::var(name).ok()
    })
}

/// Load configuration from a specific path with a custom environment lookup
///
/// # Errors
///
/// Same as [`load_config`].
pub fn load_config_from_path<F>(path: Option<&Path>, env: F) -> Result<ConductorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ConductorConfig::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;

            let toml_config: EstimatorToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.to_path_buf());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env)?;

    config
        .estimate
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ConductorConfig, toml: &EstimatorToml) {
    if let Some(v) = toml.estimate.can_volume {
        config.estimate.can_volume = v;
    }
    if let Some(v) = toml.estimate.loss_rate {
        config.estimate.loss_rate = v;
    }
    if let Some(v) = toml.estimate.coverage {
        config.estimate.coverage = v;
    }
    if let Some(v) = toml.estimate.openings_rate {
        config.estimate.openings_rate = v;
    }

    if let Some(ref name) = toml.model.name {
        config.model = name.clone();
    }
    if let Some(ref var) = toml.model.api_key_env {
        config.api_key_var = var.clone();
    }

    if let Some(size) = toml.security.max_message_size {
        config.limits.max_message_size = size;
    }
    if let Some(n) = toml.security.max_command_args {
        config.limits.max_command_args = n;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut ConductorConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let float = |name: &str| -> Result<Option<f64>, ConfigError> {
        env(name)
            .map(|raw| {
                raw.trim().parse::<f64>().map_err(|_| {
                    ConfigError::ValidationError(format!("{name} is not a number: {raw:?}"))
                })
            })
            .transpose()
    };

    let mut touched = false;
    for (name, slot) in [
        ("PAINT_CAN_VOLUME", &mut config.estimate.can_volume),
        ("PAINT_LOSS_RATE", &mut config.estimate.loss_rate),
        ("PAINT_COVERAGE", &mut config.estimate.coverage),
        ("PAINT_OPENINGS_RATE", &mut config.estimate.openings_rate),
    ] {
        if let Some(v) = float(name)? {
            *slot = v;
            touched = true;
        }
    }

    if let Some(model) = env("PAINT_ESTIMATOR_MODEL") {
        config.model = model;
        touched = true;
    }
    if let Some(var) = env("PAINT_ESTIMATOR_KEY_VAR") {
        config.api_key_var = var;
        touched = true;
    }
    for (name, slot) in [
        (
            "PAINT_ESTIMATOR_MAX_MESSAGE_SIZE",
            &mut config.limits.max_message_size,
        ),
        (
            "PAINT_ESTIMATOR_MAX_COMMAND_ARGS",
            &mut config.limits.max_command_args,
        ),
    ] {
        if let Some(raw) = env(name) {
            *slot = raw.trim().parse::<usize>().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "{name} is not a whole number: {raw:?}"
                ))
            })?;
            touched = true;
        }
    }

    if touched {
        config.source = ConfigSource::Env;
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config_from_path(None, no_env).unwrap();
        assert_eq!(config.source, ConfigSource::Default);
        assert!((config.estimate.can_volume - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.api_key_var, "GOOGLE_API_KEY");
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config_from_path(Some(&path), no_env).unwrap();
        assert_eq!(config.source, ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_parse_valid_toml() {
        let toml_content = r#"
[estimate]
can_volume = 18.0
coverage = 12.0

[model]
name = "custom-model"
api_key_env = "MY_KEY"

[security]
max_message_size = 512
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config_from_path(Some(file.path()), no_env).unwrap();

        assert_eq!(config.source, ConfigSource::File);
        assert!((config.estimate.can_volume - 18.0).abs() < f64::EPSILON);
        assert!((config.estimate.coverage - 12.0).abs() < f64::EPSILON);
        // untouched values keep defaults
        assert!((config.estimate.loss_rate - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.model, "custom-model");
        assert_eq!(config.api_key_var, "MY_KEY");
        assert_eq!(config.limits.max_message_size, 512);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[estimate]\ncan_volume = 18.0\n").unwrap();

        let env: HashMap<&str, &str> = [
            ("PAINT_CAN_VOLUME", "5"),
            ("PAINT_ESTIMATOR_MODEL", "env-model"),
        ]
        .into_iter()
        .collect();

        let config = load_config_from_path(Some(file.path()), |name| {
            env.get(name).map(|v| (*v).to_string())
        })
        .unwrap();

        assert_eq!(config.source, ConfigSource::Env);
        assert!((config.estimate.can_volume - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.model, "env-model");
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[estimate\ncan_volume = ").unwrap();
        let err = load_config_from_path(Some(file.path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_invalid_estimate_constants_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[estimate]\nopenings_rate = 1.5\n").unwrap();
        let err = load_config_from_path(Some(file.path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_non_numeric_env_rejected() {
        let err = load_config_from_path(None, |name| {
            (name == "PAINT_COVERAGE").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("PAINT_COVERAGE"));
    }

    #[test]
    fn test_non_numeric_limit_env_rejected() {
        for var in [
            "PAINT_ESTIMATOR_MAX_MESSAGE_SIZE",
            "PAINT_ESTIMATOR_MAX_COMMAND_ARGS",
        ] {
            let err = load_config_from_path(None, |name| (name == var).then(|| "-3".to_string()))
                .unwrap_err();
            assert!(matches!(err, ConfigError::ValidationError(_)));
            assert!(err.to_string().contains(var));
        }

        let config = load_config_from_path(None, |name| {
            (name == "PAINT_ESTIMATOR_MAX_COMMAND_ARGS").then(|| " 8 ".to_string())
        })
        .unwrap();
        assert_eq!(config.limits.max_command_args, 8);
    }
}
