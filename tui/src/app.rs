//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ConductorClient for orchestration
//! - DisplayState for rendering
//!
//! The App:
//! 1. Converts terminal events to SurfaceEvents
//! 2. Sends events to the embedded Conductor via ConductorClient
//! 3. Receives ConductorMessages and updates DisplayState
//! 4. Renders based on DisplayState
//!
//! Screen layout, top to bottom: header, transcript, notice line, input
//! box, status bar.

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::Terminal;
use unicode_width::UnicodeWidthChar;

use estimator_conductor::{ConductorState, APP_CAPTION, APP_TITLE};

use crate::conductor_client::ConductorClient;
use crate::display::{DisplayRole, DisplayState};
use crate::theme::{notice_style, status_style, DIM_GRAY, ESTIMATOR_TEAL, USER_GREEN};

/// Input box height (separator plus text lines)
const INPUT_HEIGHT: u16 = 3;

/// Title and caption rows above the transcript
const HEADER_HEIGHT: u16 = 2;

/// Rows below the transcript: notice line, input box, status bar
const FOOTER_HEIGHT: u16 = INPUT_HEIGHT + 2;

/// Lines scrolled per mouse wheel notch
const WHEEL_STEP: usize = 3;

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Conductor Integration ===
    /// Client for communicating with the embedded Conductor
    conductor: ConductorClient,
    /// Display state derived from ConductorMessages
    display: DisplayState,

    // === Input State ===
    /// User input buffer
    input_buffer: String,
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Total rendered lines (for scroll bounds)
    total_lines: usize,

    /// Terminal size
    size: (u16, u16),
}

impl App {
    /// Create an App around a started client
    pub fn new(conductor: ConductorClient, size: (u16, u16)) -> Self {
        let mut app = Self {
            running: true,
            conductor,
            display: DisplayState::new(),
            input_buffer: String::new(),
            scroll_offset: 0,
            total_lines: 0,
            size,
        };
        app.process_conductor_messages();
        app
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so user sees UI
        self.render(terminal)?;

        while self.running {
            match event_stream.next().await {
                Some(Ok(event)) => match event {
                    // Only handle Press events (not Release or Repeat)
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key).await;
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(w, h) => self.handle_resize(w, h).await,
                    _ => {}
                },
                Some(Err(e)) => {
                    tracing::warn!("Terminal event error: {}", e);
                }
                None => self.running = false,
            }

            self.process_conductor_messages();

            if matches!(self.display.conductor_state, ConductorState::ShuttingDown) {
                self.running = false;
            }

            self.render(terminal)?;
        }

        Ok(())
    }

    /// Process all pending messages from the Conductor
    fn process_conductor_messages(&mut self) {
        for msg in self.conductor.recv_all() {
            self.display.apply_message(msg);
        }
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc => self.quit().await,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit().await;
            }

            // Submit line
            KeyCode::Enter => {
                if !self.input_buffer.trim().is_empty() {
                    let line = std::mem::take(&mut self.input_buffer);
                    self.display.clear_notification();
                    if let Err(e) = self.conductor.send_input(&line).await {
                        tracing::warn!("Failed to send input: {}", e);
                    }
                    self.scroll_offset = 0;
                }
            }

            // Typing
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }

            // Transcript scrolling
            KeyCode::PageUp => {
                let page = self.page_size();
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + page).min(max_scroll);
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(self.page_size());
            }

            _ => {}
        }
        self.process_conductor_messages();
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + WHEEL_STEP).min(max_scroll);
            }
            MouseEventKind::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(WHEEL_STEP);
            }
            _ => {}
        }
    }

    /// Handle terminal resize
    async fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        if let Err(e) = self
            .conductor
            .resized(u32::from(width), u32::from(height))
            .await
        {
            tracing::warn!("Failed to report resize: {}", e);
        }
    }

    async fn quit(&mut self) {
        if let Err(e) = self.conductor.request_quit().await {
            tracing::warn!("Quit request failed: {}", e);
        }
        self.running = false;
    }

    fn page_size(&self) -> usize {
        usize::from(self.size.1.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT) / 2).max(1)
    }

    /// Whether the event loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Get the goodbye message for display after TUI closes
    pub fn goodbye(&self) -> Option<&str> {
        self.display.goodbye.as_deref()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render the UI
    pub fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            self.size = (area.width, area.height);
            let buf = frame.buffer_mut();

            let transcript_height = area
                .height
                .saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT);
            let notice_y = HEADER_HEIGHT + transcript_height;
            Self::render_header(buf, Rect::new(0, 0, area.width, HEADER_HEIGHT));
            self.render_transcript(
                buf,
                Rect::new(0, HEADER_HEIGHT, area.width, transcript_height),
            );
            self.render_notice(buf, Rect::new(0, notice_y, area.width, 1));
            self.render_input(
                buf,
                Rect::new(0, notice_y + 1, area.width, INPUT_HEIGHT),
            );
            self.render_status(
                buf,
                Rect::new(0, area.height.saturating_sub(1), area.width, 1),
            );
        })?;
        Ok(())
    }

    fn render_header(buf: &mut Buffer, area: Rect) {
        if area.height < HEADER_HEIGHT {
            return;
        }
        let width = usize::from(area.width);
        buf.set_string(
            area.x,
            area.y,
            fit(APP_TITLE, width),
            Style::default()
                .fg(ESTIMATOR_TEAL)
                .add_modifier(Modifier::BOLD),
        );
        buf.set_string(
            area.x,
            area.y + 1,
            fit(APP_CAPTION, width),
            Style::default().fg(DIM_GRAY),
        );
    }

    /// Render the transcript pane
    fn render_transcript(&mut self, buf: &mut Buffer, area: Rect) {
        let width = usize::from(area.width.saturating_sub(1));
        let height = usize::from(area.height);
        if width < 10 || height < 1 {
            return;
        }

        // Build wrapped lines from display messages
        let mut all_lines: Vec<(String, Style)> = Vec::new();
        for msg in &self.display.messages {
            let style = match msg.role {
                DisplayRole::User => Style::default().fg(USER_GREEN),
                DisplayRole::Assistant => Style::default().fg(ESTIMATOR_TEAL),
            };
            let content = format!("{}{}", msg.role.prefix(), msg.content);
            for line in textwrap::wrap(&content, width) {
                all_lines.push((line.into_owned(), style));
            }
            all_lines.push((String::new(), Style::default()));
        }

        self.total_lines = all_lines.len();

        // Clamp scroll offset
        let max_scroll = self.total_lines.saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_scroll);

        let visible_end = self.total_lines.saturating_sub(self.scroll_offset);
        let visible_start = visible_end.saturating_sub(height);

        for (row, (line, style)) in all_lines[visible_start..visible_end].iter().enumerate() {
            let Ok(y) = u16::try_from(row) else { break };
            buf.set_string(area.x, area.y + y, fit(line, width), *style);
        }

        if self.scroll_offset > 0 {
            buf.set_string(
                area.x + area.width.saturating_sub(1),
                area.y + area.height.saturating_sub(1),
                "v",
                Style::default().fg(Color::Yellow),
            );
        }
    }

    /// Render the notice line
    fn render_notice(&self, buf: &mut Buffer, area: Rect) {
        if let Some(ref notice) = self.display.notification {
            let text = match notice.title {
                Some(ref title) => format!(" {title}: {}", notice.message),
                None => format!(" {}", notice.message),
            };
            buf.set_string(
                area.x,
                area.y,
                fit(&text, usize::from(area.width)),
                notice_style(notice.level),
            );
        }
    }

    /// Render the input box
    fn render_input(&self, buf: &mut Buffer, area: Rect) {
        let separator = "-".repeat(usize::from(area.width));
        buf.set_string(area.x, area.y, &separator, Style::default().fg(DIM_GRAY));

        let text_height = usize::from(area.height.saturating_sub(1));
        let text_width = usize::from(area.width.saturating_sub(1));
        if text_width < 5 || text_height < 1 {
            return;
        }

        let accepting = self.display.conductor_state.accepts_input()
            || self.display.conductor_state == ConductorState::Ended;
        let style = if accepting {
            Style::default().fg(USER_GREEN)
        } else {
            Style::default().fg(DIM_GRAY)
        };

        let full_input = format!("You: {}_", self.input_buffer);
        let wrapped = textwrap::wrap(&full_input, text_width);
        let skip = wrapped.len().saturating_sub(text_height);
        for (row, line) in wrapped.iter().skip(skip).enumerate() {
            let Ok(y) = u16::try_from(row + 1) else { break };
            buf.set_string(area.x, area.y + y, line, style);
        }
    }

    /// Render status bar
    fn render_status(&self, buf: &mut Buffer, area: Rect) {
        let state = self.display.conductor_state;
        let progress = self
            .display
            .progress_label()
            .map(|p| format!(" | {p}"))
            .unwrap_or_default();
        let scroll_info = if self.scroll_offset > 0 {
            format!(" [^{} lines]", self.scroll_offset)
        } else {
            String::new()
        };

        let status = format!(
            " {}{progress} | /help | Esc to quit | PgUp/PgDn scroll{scroll_info}",
            state.description()
        );
        buf.set_string(
            area.x,
            area.y,
            fit(&status, usize::from(area.width)),
            status_style(state),
        );
    }
}

/// Truncate `line` to at most `width` terminal columns
fn fit(line: &str, width: usize) -> String {
    let mut used = 0;
    line.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_truncates_by_columns() {
        assert_eq!(fit("hello world", 5), "hello");
        assert_eq!(fit("12408 m²", 8), "12408 m²");
        assert_eq!(fit("short", 40), "short");
    }
}
