//! Conductor Client
//!
//! Thin wrapper around the Conductor for TUI integration.
//! This client embeds the Conductor directly (no network) and provides
//! a convenient interface for sending events and receiving messages.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any business logic.
//! All orchestration happens in the Conductor. The TUI's job is:
//! 1. Convert terminal events to SurfaceEvents
//! 2. Send SurfaceEvents to Conductor
//! 3. Receive ConductorMessages
//! 4. Render display state based on messages

use tokio::sync::mpsc;

use estimator_conductor::{
    Conductor, ConductorConfig, ConductorMessage, ConductorState, CredentialError,
    ModelClientConfig, SurfaceCapabilities, SurfaceEvent, SurfaceType,
};

/// Client for communicating with the embedded Conductor
pub struct ConductorClient {
    /// The embedded Conductor instance
    conductor: Conductor,
    /// Receiver for messages from Conductor
    rx: mpsc::Receiver<ConductorMessage>,
}

impl ConductorClient {
    /// Create a new ConductorClient with embedded Conductor
    pub fn new(config: ConductorConfig) -> Self {
        // Create channel for Conductor -> TUI messages
        let (tx, rx) = mpsc::channel(256);
        let conductor = Conductor::new(config, tx);
        Self { conductor, rx }
    }

    /// Start the Conductor, reading the credential from the environment
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.conductor.start().await
    }

    /// Start the Conductor with an already-resolved credential
    pub async fn start_with_credential(
        &mut self,
        credential: Result<ModelClientConfig, CredentialError>,
    ) -> anyhow::Result<()> {
        self.conductor.start_with_credential(credential).await
    }

    /// Connect this surface to the Conductor
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::Connected {
            event_id: SurfaceEvent::new_event_id(),
            surface_type: SurfaceType::Tui,
            capabilities: SurfaceCapabilities::tui(),
        };
        self.conductor.handle_event(event).await
    }

    /// Send a line typed by the user (a leading `/` makes it a command)
    pub async fn send_input(&mut self, line: &str) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::from_input_line(line))
            .await
    }

    /// Notify Conductor that user wants to quit
    pub async fn request_quit(&mut self) -> anyhow::Result<()> {
        let event = SurfaceEvent::QuitRequested {
            event_id: SurfaceEvent::new_event_id(),
        };
        self.conductor.handle_event(event).await
    }

    /// Notify Conductor of resize
    pub async fn resized(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        let event = SurfaceEvent::Resized {
            event_id: SurfaceEvent::new_event_id(),
            width,
            height,
        };
        self.conductor.handle_event(event).await
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ConductorMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Get the current Conductor state
    pub fn state(&self) -> ConductorState {
        self.conductor.state()
    }

    /// Check if the Conductor resolved its credential
    pub fn is_ready(&self) -> bool {
        self.conductor.is_ready()
    }
}
