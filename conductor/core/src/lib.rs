//! Conductor Core - Headless City Paint Estimator
//!
//! This crate provides the estimator's conversation logic, completely
//! independent of any UI framework. It can drive a TUI, a line-mode terminal,
//! or run headless for testing/automation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        UI Surfaces                           │
//! │        ┌─────────┐        ┌─────────┐        ┌──────────┐    │
//! │        │   TUI   │        │  REPL   │        │ Headless │    │
//! │        │(ratatui)│        │ (stdin) │        │ (tests)  │    │
//! │        └────┬────┘        └────┬────┘        └────┬─────┘    │
//! │             └──────────────────┼──────────────────┘          │
//! │                    SurfaceEvent (up)                         │
//! │                  ConductorMessage (down)                     │
//! └────────────────────────────────┼─────────────────────────────┘
//!                                  │
//! ┌────────────────────────────────┼─────────────────────────────┐
//! │                        CONDUCTOR CORE                        │
//! │  ┌─────────────────────────────┴──────────────────────────┐  │
//! │  │                       Conductor                        │  │
//! │  │  ┌────────────┐  ┌────────────┐  ┌──────────────────┐  │  │
//! │  │  │  Session   │  │ Controller │  │    Estimator     │  │  │
//! │  │  │   State    │  │  (phases)  │  │  (pure compute)  │  │  │
//! │  │  └────────────┘  └────────────┘  └──────────────────┘  │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: Event-driven owner of one session
//! - [`Controller`]: The questionnaire state machine
//! - [`SessionState`]: Transcript, answers and progress of one conversation
//! - [`estimator::compute`]: Paint quantities from five answers
//! - [`SessionRegistry`]: Many sessions keyed by [`SessionId`]
//!
//! # Quick Start
//!
//! ```ignore
//! use estimator_conductor::{load_config, Conductor, SurfaceEvent};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::channel(100);
//!     let mut conductor = Conductor::new(load_config()?, tx);
//!     conductor.start().await?;
//!
//!     conductor
//!         .handle_event(SurfaceEvent::from_input_line("both"))
//!         .await?;
//!
//!     while let Ok(msg) = rx.try_recv() {
//!         // Render message to UI
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod conductor;
pub mod config;
pub mod controller;
pub mod estimator;
pub mod events;
pub mod messages;
pub mod questions;
pub mod registry;
pub mod security;
pub mod session;
pub mod validation;

// Re-exports for convenience
pub use backend::{
    load_dotenv, load_dotenv_from, CredentialError, ModelClientConfig, DEFAULT_API_KEY_VAR,
    DEFAULT_MODEL,
};
pub use conductor::{Conductor, ConductorConfig, HELP_TEXT};
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigSource,
    EstimatorToml,
};
pub use controller::{
    format_summary, is_affirmative, AnswerOutcome, Controller, ControllerError, RestartDecision,
    AFFIRMATIVE_TOKENS, APP_CAPTION, APP_TITLE, CLOSING_MESSAGE, RESTART_PROMPT,
};
pub use estimator::{
    compute, EstimateError, EstimateInput, EstimateParams, EstimateResult, Scope, MAX_COATS,
};
pub use events::{SurfaceCapabilities, SurfaceEvent, SurfaceType};
pub use messages::{
    ConductorMessage, ConductorState, EventId, MessageId, MessageRole, NotifyLevel, SessionId,
};
pub use questions::{questionnaire, Question, QuestionKey, QuestionKind, QUESTIONS};
pub use registry::{RegistryError, SessionRegistry, SubmitReport};
pub use security::{ConductorLimits, InputValidator, ValidationResult};
pub use session::{HistoryEntry, Phase, SessionState};
pub use validation::{validate_answer, Advisory, AnswerValue, ValidationError};
