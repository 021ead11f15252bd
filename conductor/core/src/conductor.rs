//! Conductor - The Orchestration Core
//!
//! The Conductor is the "brain" of the estimator. It orchestrates:
//! - Credential resolution at startup
//! - The questionnaire session and its controller
//! - Communication with UI surfaces
//!
//! # Design Philosophy
//!
//! The Conductor is UI-agnostic. It doesn't know or care whether it's talking to
//! a TUI, a line-mode terminal, or a test harness. It communicates through:
//! - `ConductorMessage`: Commands sent TO the UI surface
//! - `SurfaceEvent`: Events received FROM the UI surface
//!
//! Every user input runs one validate -> mutate -> publish cycle. History
//! entries appended by the controller are published exactly once; when the
//! session restarts the surface is told to reset its transcript first.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::backend::{CredentialError, ModelClientConfig, DEFAULT_API_KEY_VAR, DEFAULT_MODEL};
use crate::config::ConfigSource;
use crate::controller::{AnswerOutcome, Controller, ControllerError, RestartDecision, CLOSING_MESSAGE};
use crate::estimator::EstimateParams;
use crate::events::{SurfaceCapabilities, SurfaceEvent, SurfaceType};
use crate::messages::{ConductorMessage, ConductorState, EventId, MessageId, NotifyLevel, SessionId};
use crate::security::{ConductorLimits, InputValidator, ValidationResult};
use crate::session::{Phase, SessionState};

/// Commands understood by [`Conductor::handle_event`]
pub const HELP_TEXT: &str = "Available commands: /help, /restart, /quit";

/// Conductor configuration
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// Language model identifier (reported, never queried)
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_var: String,
    /// Estimate constants
    pub estimate: EstimateParams,
    /// Security limits
    pub limits: ConductorLimits,
    /// Config file the values were read from, if any
    pub config_file_path: Option<PathBuf>,
    /// Highest-priority source that contributed a value
    pub source: ConfigSource,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key_var: DEFAULT_API_KEY_VAR.to_string(),
            estimate: EstimateParams::default(),
            limits: ConductorLimits::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

/// The Conductor - headless orchestration core
pub struct Conductor {
    /// Configuration
    config: ConductorConfig,
    /// Questionnaire state machine
    controller: Controller,
    /// Current session
    session: SessionState,
    /// Resolved model client configuration
    credential: Option<ModelClientConfig>,
    /// Current operational state
    state: ConductorState,
    /// Channel to send messages to UI surface
    tx: mpsc::Sender<ConductorMessage>,
    /// Connected surface info
    surface_type: Option<SurfaceType>,
    surface_capabilities: Option<SurfaceCapabilities>,
    /// Number of history entries already sent to the surface
    published: usize,
    /// First entry of the transcript the surface is showing
    published_head: Option<MessageId>,
    /// Input validator for surface events
    input_validator: InputValidator,
}

impl Conductor {
    /// Create a new Conductor
    pub fn new(config: ConductorConfig, tx: mpsc::Sender<ConductorMessage>) -> Self {
        let controller = Controller::new(config.estimate);
        let session = controller.start();
        let input_validator = InputValidator::new(config.limits.clone());

        Self {
            config,
            controller,
            session,
            credential: None,
            state: ConductorState::Initializing,
            tx,
            surface_type: None,
            surface_capabilities: None,
            published: 0,
            published_head: None,
            input_validator,
        }
    }

    /// Get the session ID
    pub fn session_id(&self) -> &SessionId {
        &self.session.id
    }

    /// Get the session
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Get current state
    pub fn state(&self) -> ConductorState {
        self.state
    }

    /// Get the configuration
    pub fn config(&self) -> &ConductorConfig {
        &self.config
    }

    /// Resolved model client, if the credential was present
    pub fn credential(&self) -> Option<&ModelClientConfig> {
        self.credential.as_ref()
    }

    /// Connected surface, if any
    pub fn surface(&self) -> Option<(&SurfaceType, Option<&SurfaceCapabilities>)> {
        self.surface_type
            .as_ref()
            .map(|t| (t, self.surface_capabilities.as_ref()))
    }

    /// Whether the credential was resolved and questions are being asked
    pub fn is_ready(&self) -> bool {
        self.credential.is_some()
    }

    /// Start the Conductor, reading the credential from the environment
    pub async fn start(&mut self) -> anyhow::Result<()> {
        let credential =
            ModelClientConfig::from_env(self.config.model.clone(), &self.config.api_key_var);
        self.start_with_credential(credential).await
    }

    /// Start the Conductor with an already-resolved credential
    pub async fn start_with_credential(
        &mut self,
        credential: Result<ModelClientConfig, CredentialError>,
    ) -> anyhow::Result<()> {
        self.set_state(ConductorState::Initializing).await;

        match credential {
            Ok(client) => {
                tracing::info!(
                    session = %self.session.id,
                    model = %client.model,
                    "Credential resolved"
                );
                self.credential = Some(client);
                self.send_session_info().await;
                self.sync_history().await;
                self.send_progress().await;
                self.sync_state().await;
            }
            Err(e) => {
                let CredentialError::MissingCredential { ref var } = e;
                tracing::error!(var = %var, "API key not set; session blocked");
                self.set_state(ConductorState::Blocked).await;
                self.send_session_info().await;
                self.notify(NotifyLevel::Error, &e.to_string()).await;
            }
        }

        Ok(())
    }

    /// Handle an event from the UI surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        match event {
            SurfaceEvent::Connected {
                event_id,
                surface_type,
                capabilities,
            } => {
                tracing::debug!(surface = surface_type.name(), "Surface connected");
                self.surface_type = Some(surface_type);
                self.surface_capabilities = Some(capabilities);
                self.ack(event_id).await;

                // Send current state to new surface
                self.send(ConductorMessage::State { state: self.state })
                    .await;
                self.send_session_info().await;
                self.send(ConductorMessage::Transcript {
                    entries: self.session.history()[..self.published].to_vec(),
                })
                .await;
                if self.is_ready() {
                    self.send_progress().await;
                }
            }

            SurfaceEvent::Disconnected { event_id, reason } => {
                tracing::debug!(reason = ?reason, "Surface disconnected");
                self.surface_type = None;
                self.surface_capabilities = None;
                self.ack(event_id).await;
            }

            SurfaceEvent::Resized { event_id, .. } => {
                self.ack(event_id).await;
            }

            SurfaceEvent::UserMessage { event_id, content } => {
                self.ack(event_id).await;
                // Screen input before it reaches the questionnaire
                match self.input_validator.validate_message(&content) {
                    ValidationResult::Valid => {
                        self.handle_user_message(&content).await;
                    }
                    ValidationResult::Invalid(reason) => {
                        tracing::warn!(reason = %reason, "Rejected user message");
                        self.notify(NotifyLevel::Warning, &format!("Invalid message: {reason}"))
                            .await;
                    }
                }
            }

            SurfaceEvent::UserCommand {
                event_id,
                command,
                args,
            } => {
                self.ack(event_id).await;
                match self.input_validator.validate_command(&command, &args) {
                    ValidationResult::Valid => {
                        self.handle_command(&command).await?;
                    }
                    ValidationResult::Invalid(reason) => {
                        tracing::warn!(command = %command, reason = %reason, "Rejected user command");
                        self.notify(NotifyLevel::Warning, &format!("Invalid command: {reason}"))
                            .await;
                    }
                }
            }

            SurfaceEvent::QuitRequested { event_id } => {
                self.ack(event_id).await;
                self.shutdown().await?;
            }
        }

        Ok(())
    }

    /// Route a screened line to the controller operation for the current phase
    async fn handle_user_message(&mut self, content: &str) {
        if !self.is_ready() {
            self.notify_missing_credential().await;
            return;
        }

        match self.session.phase() {
            Phase::Asking { .. } => {
                match self.controller.submit_answer(&mut self.session, content) {
                    Ok(outcome) => {
                        if let Some(advisory) = outcome.advisory() {
                            self.notify(NotifyLevel::Warning, &advisory.to_string())
                                .await;
                        }
                        if matches!(outcome, AnswerOutcome::Finished { .. }) {
                            self.complete().await;
                        }
                    }
                    Err(ControllerError::Validation(e)) => {
                        self.notify(NotifyLevel::Warning, &e.to_string()).await;
                    }
                    Err(ControllerError::Estimate(e)) => {
                        let message = format!(
                            "Those answers cannot be estimated ({e}). Type /restart to start over."
                        );
                        self.notify(NotifyLevel::Warning, &message).await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Answer could not be processed");
                        self.notify(NotifyLevel::Error, &e.to_string()).await;
                    }
                }
            }
            Phase::Complete => self.complete().await,
            Phase::AwaitingRestart => {
                match self
                    .controller
                    .submit_restart_decision(&mut self.session, content)
                {
                    Ok(RestartDecision::Restarted) => {
                        tracing::info!(session = %self.session.id, "Starting a new calculation");
                    }
                    Ok(RestartDecision::Declined) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Restart decision could not be processed");
                        self.notify(NotifyLevel::Error, &e.to_string()).await;
                    }
                }
            }
            Phase::Terminated => {
                self.notify(
                    NotifyLevel::Info,
                    "This session is closed. Type /restart to start over or /quit to leave.",
                )
                .await;
            }
        }

        self.sync_history().await;
        self.send_progress().await;
        self.sync_state().await;
    }

    /// Run the estimate once every answer is in
    async fn complete(&mut self) {
        match self.controller.complete(&mut self.session) {
            Ok(result) => {
                self.send(ConductorMessage::Estimate { result }).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Estimate failed");
                self.notify(NotifyLevel::Error, &e.to_string()).await;
            }
        }
    }

    /// Handle a slash command
    async fn handle_command(&mut self, command: &str) -> anyhow::Result<()> {
        match command {
            "help" => {
                self.notify(NotifyLevel::Info, HELP_TEXT).await;
            }
            "restart" => {
                if self.is_ready() {
                    self.controller.reset(&mut self.session);
                    self.sync_history().await;
                    self.send_progress().await;
                    self.sync_state().await;
                    self.notify(NotifyLevel::Info, "Starting over.").await;
                } else {
                    self.notify_missing_credential().await;
                }
            }
            "quit" | "exit" => {
                self.shutdown().await?;
            }
            _ => {
                self.notify(
                    NotifyLevel::Warning,
                    &format!("Unknown command: /{command}"),
                )
                .await;
            }
        }

        Ok(())
    }

    /// Shutdown the Conductor
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        tracing::info!(session = %self.session.id, "Conductor shutting down");
        self.set_state(ConductorState::ShuttingDown).await;

        // Send quit to UI
        self.send(ConductorMessage::Quit {
            message: Some(CLOSING_MESSAGE.to_string()),
        })
        .await;

        Ok(())
    }

    /// Publish history entries the surface has not seen yet
    async fn sync_history(&mut self) {
        let head = self.session.history().first().map(|e| e.id.clone());
        if self.published > 0 && head != self.published_head {
            self.send(ConductorMessage::TranscriptReset).await;
            self.published = 0;
        }
        self.published_head = head;

        let fresh = self.session.history()[self.published..].to_vec();
        self.published += fresh.len();
        for entry in fresh {
            self.send(ConductorMessage::Message {
                id: entry.id,
                role: entry.role,
                content: entry.content,
            })
            .await;
        }
    }

    /// Bring the conductor state in line with the session phase
    async fn sync_state(&mut self) {
        let state = match self.session.phase() {
            Phase::Asking { .. } | Phase::Complete => ConductorState::Asking,
            Phase::AwaitingRestart => ConductorState::AwaitingRestart,
            Phase::Terminated => ConductorState::Ended,
        };
        if state != self.state {
            self.set_state(state).await;
        }
    }

    async fn send_progress(&self) {
        self.send(ConductorMessage::Progress {
            answered: self.session.answers().len(),
            total: self.controller.questions().len(),
        })
        .await;
    }

    async fn send_session_info(&self) {
        self.send(ConductorMessage::SessionInfo {
            session_id: self.session.id.clone(),
            model: self.config.model.clone(),
            ready: self.is_ready(),
        })
        .await;
    }

    async fn notify_missing_credential(&self) {
        let error = CredentialError::MissingCredential {
            var: self.config.api_key_var.clone(),
        };
        self.notify(NotifyLevel::Error, &error.to_string()).await;
    }

    /// Set state and notify UI
    async fn set_state(&mut self, state: ConductorState) {
        self.state = state;
        self.send(ConductorMessage::State { state }).await;
    }

    /// Send acknowledgment
    async fn ack(&self, event_id: EventId) {
        self.send(ConductorMessage::Ack { event_id }).await;
    }

    /// Send notification
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(ConductorMessage::Notify {
            level,
            title: None,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}
