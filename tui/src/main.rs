//! Estimator TUI entry point
//!
//! Sets up the terminal, runs the App, and always restores the terminal
//! before printing the goodbye line.
//!
//! A `.env` file is loaded first, so it can supply the API key and
//! `RUST_LOG`. Logging is off unless `RUST_LOG` is set, since stderr shares
//! the screen.

use std::io;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use estimator_conductor::{load_config, load_dotenv};
use estimator_tui::{App, ConductorClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("estimator_conductor=info".parse()?),
            )
            .with_writer(io::stderr)
            .init();
    }

    let config = load_config()?;
    let mut client = ConductorClient::new(config);
    client.start().await?;
    client.connect().await?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let size = terminal.size()?;
    let mut app = App::new(client, (size.width, size.height));
    let result = app.run(&mut terminal).await;

    // Restore terminal even if the app failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Some(goodbye) = app.goodbye() {
        println!("{goodbye}");
    }

    result
}
