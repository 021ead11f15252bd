//! End-to-end conversation tests
//!
//! These tests drive the Conductor the way a surface does: events in through
//! `handle_event`, messages out through the channel. They cover:
//! - A complete estimate, restart and decline cycle
//! - Config files feeding the estimate constants
//! - Many sessions sharing one registry

use std::io::Write;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};

use estimator_conductor::{
    load_config_from_path, Conductor, ConductorConfig, ConductorMessage, ConductorState,
    ModelClientConfig, NotifyLevel, RegistryError, SessionRegistry, SurfaceCapabilities,
    SurfaceEvent, SurfaceType, CLOSING_MESSAGE, DEFAULT_MODEL, RESTART_PROMPT,
};

// =============================================================================
// Helpers
// =============================================================================

/// What a minimal surface would have on screen
#[derive(Default)]
struct Screen {
    transcript: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    state: Option<ConductorState>,
    quit: bool,
}

impl Screen {
    fn apply(&mut self, msg: ConductorMessage) {
        match msg {
            ConductorMessage::Message { content, .. } => self.transcript.push(content),
            ConductorMessage::TranscriptReset => self.transcript.clear(),
            ConductorMessage::Transcript { entries } => {
                self.transcript = entries.into_iter().map(|e| e.content).collect();
            }
            ConductorMessage::Notify {
                level: NotifyLevel::Warning,
                message,
                ..
            } => self.warnings.push(message),
            ConductorMessage::Notify {
                level: NotifyLevel::Error,
                message,
                ..
            } => self.errors.push(message),
            ConductorMessage::State { state } => self.state = Some(state),
            ConductorMessage::Quit { .. } => self.quit = true,
            _ => {}
        }
    }

    fn pump(&mut self, rx: &mut mpsc::Receiver<ConductorMessage>) {
        while let Ok(msg) = rx.try_recv() {
            self.apply(msg);
        }
    }
}

async fn started(config: ConductorConfig) -> (Conductor, mpsc::Receiver<ConductorMessage>) {
    let (tx, rx) = mpsc::channel(256);
    let mut conductor = Conductor::new(config, tx);
    let credential = ModelClientConfig::new(DEFAULT_MODEL, "test-key", "TEST_KEY");
    assert_ok!(conductor.start_with_credential(credential).await);
    assert_ok!(
        conductor
            .handle_event(SurfaceEvent::Connected {
                event_id: SurfaceEvent::new_event_id(),
                surface_type: SurfaceType::Headless,
                capabilities: SurfaceCapabilities::headless(),
            })
            .await
    );
    (conductor, rx)
}

async fn type_lines(conductor: &mut Conductor, lines: &[&str]) {
    for line in lines {
        assert_ok!(
            conductor
                .handle_event(SurfaceEvent::from_input_line(line))
                .await
        );
    }
}

// =============================================================================
// Conversation flow
// =============================================================================

#[tokio::test]
async fn test_complete_conversation_transcript() {
    let (mut conductor, mut rx) = started(ConductorConfig::default()).await;
    let mut screen = Screen::default();

    type_lines(&mut conductor, &["both", "two", "2", "500", "3", "2"]).await;
    screen.pump(&mut rx);

    assert_eq!(screen.warnings, vec!["Please enter a valid number.".to_string()]);
    assert_eq!(
        screen.transcript,
        vec![
            "What is the scope of your painting project? (type interior / exterior / both)",
            "both",
            "How many buildings do you plan to paint?",
            "2",
            "What is the average wall area (in m²) of each building?",
            "500",
            "How many floors does each building have on average?",
            "3",
            "How many coats of paint do you plan to apply?",
            "2",
            "Net area after excluding doors/windows: 12408 m²\n\
             Total liters required (2 coat(s)): 2482 L\n\
             You'll need approximately 131 buckets (20L each) to paint the entire city.",
            RESTART_PROMPT,
        ]
    );
    assert_eq!(screen.state, Some(ConductorState::AwaitingRestart));
}

#[tokio::test]
async fn test_restart_then_decline() {
    let (mut conductor, mut rx) = started(ConductorConfig::default()).await;
    let mut screen = Screen::default();

    type_lines(&mut conductor, &["interior", "1", "100", "1", "5"]).await;
    screen.pump(&mut rx);
    assert_eq!(
        screen.warnings,
        vec!["You don't need more than 3 coats. I'll use 3 as the maximum.".to_string()]
    );

    type_lines(&mut conductor, &["OK"]).await;
    screen.pump(&mut rx);
    assert_eq!(screen.transcript.len(), 1);
    assert_eq!(screen.state, Some(ConductorState::Asking));

    type_lines(&mut conductor, &["exterior", "1", "100", "1", "1", "nope"]).await;
    screen.pump(&mut rx);
    assert_eq!(screen.transcript.last().map(String::as_str), Some(CLOSING_MESSAGE));
    assert_eq!(screen.transcript[screen.transcript.len() - 2], "nope");
    assert_eq!(screen.state, Some(ConductorState::Ended));

    type_lines(&mut conductor, &["/quit"]).await;
    screen.pump(&mut rx);
    assert!(screen.quit);
}

#[tokio::test]
async fn test_oversized_message_is_screened() {
    let (mut conductor, mut rx) = started(ConductorConfig::default()).await;
    let mut screen = Screen::default();

    let huge = "9".repeat(10_000);
    type_lines(&mut conductor, &["both", &huge]).await;
    screen.pump(&mut rx);

    assert_eq!(screen.warnings.len(), 1);
    assert!(screen.warnings[0].starts_with("Invalid message: Message too large"));
    assert_eq!(conductor.session().cursor(), 1);
}

#[tokio::test]
async fn test_missing_credential_only_repeats_error() {
    let (tx, mut rx) = mpsc::channel(64);
    let config = ConductorConfig {
        api_key_var: "CITY_PAINT_ESTIMATOR_TEST_NEVER_SET".to_string(),
        ..ConductorConfig::default()
    };
    let mut conductor = Conductor::new(config, tx);
    assert_ok!(conductor.start().await);

    let mut screen = Screen::default();
    type_lines(&mut conductor, &["both", "/restart"]).await;
    screen.pump(&mut rx);

    assert!(screen.transcript.is_empty());
    assert_eq!(screen.errors.len(), 3);
    assert!(screen
        .errors
        .iter()
        .all(|e| e == "Missing API Key. Please set API key in your environment."));
    assert_eq!(conductor.state(), ConductorState::Blocked);
}

// =============================================================================
// Configuration feeding the estimate
// =============================================================================

#[tokio::test]
async fn test_config_file_changes_bucket_size() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[estimate]\ncan_volume = 10.0\n").unwrap();
    let config = load_config_from_path(Some(file.path()), |_| None).unwrap();

    let (mut conductor, mut rx) = started(config).await;
    let mut screen = Screen::default();
    type_lines(&mut conductor, &["both", "2", "500", "3", "2"]).await;
    screen.pump(&mut rx);

    let summary = &screen.transcript[screen.transcript.len() - 2];
    // 2605.68 L in 10 L cans
    assert!(summary.ends_with("approximately 261 buckets (10L each) to paint the entire city."));
}

// =============================================================================
// Session registry
// =============================================================================

#[test]
fn test_registry_interleaved_sessions() {
    let registry = SessionRegistry::default();
    let alice = registry.open();
    let bob = registry.open();

    for (a, b) in [("both", "interior"), ("2", "1"), ("500", "100")] {
        assert_ok!(registry.submit(&alice, a));
        assert_ok!(registry.submit(&bob, b));
    }
    assert_err!(registry.submit(&bob, "-1"));

    assert_ok!(registry.submit(&alice, "3"));
    let report = registry.submit(&alice, "2").unwrap();
    assert_eq!(report.estimate.map(|r| r.cans), Some(131));

    let bob_state = registry.get(&bob).unwrap();
    assert_eq!(bob_state.cursor(), 3);
    assert_eq!(bob_state.answers().len(), 3);

    registry.close(&alice);
    assert!(matches!(
        registry.submit(&alice, "yes"),
        Err(RegistryError::UnknownSession(_))
    ));
    assert_eq!(registry.len(), 1);
}
