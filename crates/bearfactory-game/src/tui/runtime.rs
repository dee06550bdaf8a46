/*
[INPUT]:  Session handle, leaderboard store, log buffer, shutdown token
[OUTPUT]: Ratatui-based TUI run loop, frame layout, and log buffer utilities
[POS]:    TUI runtime loop and shared helpers
[UPDATE]: When changing TUI layout, keybindings, or runtime controls
[UPDATE]: 2026-09-06 Forward round events for feedback flashes
*/

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::fmt::MakeWriter;

use bearfactory_game::leaderboard::LeaderboardStore;
use bearfactory_game::round::Phase;
use bearfactory_game::session::SessionHandle;

use super::app::{AppState, Tab};
use super::events::handle_key_event;
use super::terminal::TerminalGuard;
use super::ui::*;

const UI_TICK_INTERVAL: Duration = Duration::from_millis(100);
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const LOG_BUFFER_CAPACITY: usize = 2000;

pub type LogBufferHandle = Arc<StdMutex<LogBuffer>>;

/// Ring of formatted log lines shown on the Logs tab.
#[derive(Debug, Default)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    pub fn handle(capacity: usize) -> LogBufferHandle {
        Arc::new(StdMutex::new(Self::new(capacity)))
    }

    pub fn push_line(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Last `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let start = self.lines.len().saturating_sub(count);
        self.lines.iter().skip(start).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// `MakeWriter` that splits formatted events into lines of a [`LogBuffer`].
#[derive(Clone)]
pub struct LogWriterFactory {
    buffer: LogBufferHandle,
}

impl LogWriterFactory {
    pub fn new(buffer: LogBufferHandle) -> Self {
        Self { buffer }
    }
}

pub struct LogWriter {
    buffer: LogBufferHandle,
    partial: String,
}

impl LogWriter {
    fn push(&self, line: String) {
        // A poisoned buffer only loses log lines.
        if let Ok(mut guard) = self.buffer.lock() {
            guard.push_line(line);
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let line = self.partial[..pos].trim_end_matches('\r').to_string();
            self.partial.drain(..=pos);
            self.push(line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.partial.is_empty() {
            let line = std::mem::take(&mut self.partial);
            self.push(line);
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: self.buffer.clone(),
            partial: String::new(),
        }
    }
}

enum UiEvent {
    Input(CrosstermEvent),
}

pub async fn run_tui_with_log(
    session: SessionHandle,
    leaderboard: Arc<dyn LeaderboardStore>,
    leaderboard_limit: usize,
    log_buffer: LogBufferHandle,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut terminal = TerminalGuard::new()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let input_shutdown = CancellationToken::new();
    let input_shutdown_clone = input_shutdown.clone();

    tokio::task::spawn_blocking(move || {
        while !input_shutdown_clone.is_cancelled() {
            if crossterm::event::poll(INPUT_POLL_INTERVAL).unwrap_or(false) {
                if let Ok(event) = crossterm::event::read() {
                    let _ = event_tx.send(UiEvent::Input(event));
                }
            }
        }
    });

    let mut round_events = session.subscribe();
    let mut app = AppState::new(session, leaderboard, leaderboard_limit, log_buffer);
    let mut tick = tokio::time::interval(UI_TICK_INTERVAL);
    let mut should_quit = false;

    while !should_quit {
        tokio::select! {
            _ = shutdown.cancelled() => {
                should_quit = true;
            }
            _ = tick.tick() => {}
            maybe_event = event_rx.recv() => {
                if let Some(UiEvent::Input(CrosstermEvent::Key(key))) = maybe_event {
                    if handle_key_event(&mut app, key).await {
                        should_quit = true;
                    }
                }
            }
            round_event = round_events.recv() => {
                match round_event {
                    Ok(event) => app.on_round_event(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "ui lagged behind round events");
                    }
                    Err(broadcast::error::RecvError::Closed) => should_quit = true,
                }
            }
        }

        app.refresh_snapshot();
        terminal.draw(|frame| draw_ui(frame, &app))?;
    }

    input_shutdown.cancel();
    Ok(())
}

fn draw_ui(frame: &mut ratatui::Frame, app: &AppState) {
    let area = frame.area();
    let [tabs_area, main_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(10),
        Constraint::Length(4),
    ])
    .areas(area);

    draw_tabs(frame, tabs_area, app.current_tab);

    match app.current_tab {
        Tab::Game => draw_game(frame, main_area, app),
        Tab::Leaderboard => draw_high_scores(frame, main_area, &app.high_scores),
        Tab::Logs => draw_logs(frame, main_area, &app.log_buffer),
    }

    draw_footer(frame, footer_area, app);
}

fn draw_footer(frame: &mut ratatui::Frame, area: Rect, app: &AppState) {
    let key_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let key = |label: &'static str| Span::styled(label, key_style);

    let game_keys = match (app.current_tab, app.phase()) {
        (Tab::Game, Phase::Input) => vec![key("[Enter]"), Span::raw(" Start round  ")],
        (Tab::Game, Phase::Generating) => vec![key("[Esc]"), Span::raw(" Cancel  ")],
        (Tab::Game, Phase::Playing) if app.snapshot.tour.is_active() => vec![
            key("[Enter]"),
            Span::raw(" Next  "),
            key("[s]"),
            Span::raw(" Skip tour  "),
        ],
        (Tab::Game, Phase::Playing) => vec![
            key("[k/Left]"),
            Span::raw(" Keep  "),
            key("[t/Right]"),
            Span::raw(" Toss  "),
            key("[Esc]"),
            Span::raw(" Quit round  "),
        ],
        (Tab::Game, Phase::Results) => vec![
            key("[Enter]"),
            Span::raw(" Save score  "),
            key("[Esc]"),
            Span::raw(" Play again  "),
        ],
        (Tab::Leaderboard, _) => vec![key("[r]"), Span::raw(" Refresh  ")],
        (Tab::Logs, _) => Vec::new(),
    };

    let mut line1 = vec![key("[Tab]"), Span::raw(" Switch  ")];
    line1.extend(game_keys);
    line1.push(key("[Ctrl-C]"));
    line1.push(Span::raw(" Quit"));
    let line2 = Line::from(Span::raw(format!("Status: {}", app.status_message)));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title("Hotkeys");
    let text = Text::from(vec![Line::from(line1), line2]);
    let widget = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

pub(crate) fn border_style() -> Style {
    Style::default().fg(Color::Magenta)
}

pub(crate) fn header_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn verdict_style(correct: bool) -> Style {
    if correct {
        Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::LightRed)
            .add_modifier(Modifier::BOLD)
    }
}

pub(crate) fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}
