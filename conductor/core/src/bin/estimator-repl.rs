//! Estimator REPL
//!
//! Line-mode surface for the City Paint Estimator. Reads answers from stdin
//! one line at a time and prints whatever the Conductor publishes.
//!
//! # Usage
//!
//! ```bash
//! GOOGLE_API_KEY=... estimator-repl
//!
//! # Scripted run
//! printf 'both\n2\n500\n3\n2\nno\n' | estimator-repl
//!
//! # With verbose logging (goes to stderr)
//! RUST_LOG=debug estimator-repl
//! ```
//!
//! # Environment Variables
//!
//! - `GOOGLE_API_KEY`: Required credential (variable name configurable)
//! - `PAINT_ESTIMATOR_CONFIG`: Path to a TOML config file
//! - `PAINT_CAN_VOLUME`, `PAINT_LOSS_RATE`, `PAINT_COVERAGE`, `PAINT_OPENINGS_RATE`
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)
//!
//! Any of these may also come from a `.env` file in the working directory.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};

use estimator_conductor::{
    load_config, load_dotenv, Conductor, ConductorMessage, MessageRole, NotifyLevel,
    SurfaceCapabilities, SurfaceEvent, SurfaceType, APP_CAPTION, APP_TITLE,
};

/// Read the next line of user input, `None` on EOF
async fn read_next_input(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Option<String>> {
    Ok(lines.next_line().await?)
}

/// Render a conductor message as terminal text
fn display_message(msg: &ConductorMessage) -> Option<String> {
    match msg {
        // the user's own lines are already on screen
        ConductorMessage::Message {
            role: MessageRole::Assistant,
            content,
            ..
        } => Some(content.clone()),
        ConductorMessage::TranscriptReset => Some(String::from("----")),
        ConductorMessage::Notify { level, message, .. } => Some(match level {
            NotifyLevel::Info => format!("[info] {message}"),
            NotifyLevel::Warning => format!("[warning] {message}"),
            NotifyLevel::Error => format!("[error] {message}"),
        }),
        ConductorMessage::Quit { message } => message.clone(),
        _ => None,
    }
}

/// Print everything published so far; returns true once the conductor asked to quit
async fn flush(rx: &mut mpsc::Receiver<ConductorMessage>) -> anyhow::Result<bool> {
    let mut out = tokio::io::stdout();
    let mut quit = false;
    while let Ok(msg) = rx.try_recv() {
        if let Some(text) = display_message(&msg) {
            out.write_all(text.as_bytes()).await?;
            out.write_all(b"\n").await?;
        }
        quit |= matches!(msg, ConductorMessage::Quit { .. });
    }
    out.flush().await?;
    Ok(quit)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = load_dotenv();

    // Logs go to stderr so stdout stays a clean transcript
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("estimator_repl=info".parse()?)
                .add_directive("estimator_conductor=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    if let Some(path) = dotenv {
        info!(path = %path.display(), "Loaded .env");
    }

    let config = load_config()?;
    info!(source = %config.source, model = %config.model, "Configuration loaded");

    let mut out = tokio::io::stdout();
    out.write_all(format!("{APP_TITLE}\n{APP_CAPTION}\n\n").as_bytes())
        .await?;
    out.flush().await?;

    let (tx, mut rx) = mpsc::channel::<ConductorMessage>(256);
    let mut conductor = Conductor::new(config, tx);
    conductor.start().await?;
    conductor
        .handle_event(SurfaceEvent::Connected {
            event_id: SurfaceEvent::new_event_id(),
            surface_type: SurfaceType::Repl,
            capabilities: SurfaceCapabilities::repl(),
        })
        .await?;
    flush(&mut rx).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let event = tokio::select! {
            line = read_next_input(&mut lines) => match line? {
                Some(line) => SurfaceEvent::from_input_line(&line),
                None => {
                    info!("End of input");
                    SurfaceEvent::QuitRequested { event_id: SurfaceEvent::new_event_id() }
                }
            },
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                SurfaceEvent::QuitRequested { event_id: SurfaceEvent::new_event_id() }
            }
        };

        if let Err(e) = conductor.handle_event(event).await {
            warn!(error = %e, "Failed to handle event");
        }
        if flush(&mut rx).await? {
            break;
        }
    }

    Ok(())
}
