// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for kidsynth.
//!
//! Provides a ratatui-based terminal interface with the transport line,
//! the bar grid, the pad grid and a status line. The UI only reads engine
//! snapshots and sends intents; it never touches engine state directly.

mod bars;
mod pads;
mod transport;

pub use bars::BarGridWidget;
pub use pads::{pad_color, PadGridWidget};
pub use transport::TransportWidget;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use crate::control::{format_shortcut, Category, ControlAction, KeyboardController};
use crate::engine::{Intent, Snapshot};
use crate::runtime::RuntimeHandle;
use crate::sequencer::BAR_COUNT;
use crate::timing::{MAX_BPM, MIN_BPM};

/// How long a pressed pad stays lit
const PAD_FLASH: Duration = Duration::from_millis(150);
/// How long a status message stays up
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// UI-local state
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Bar under the keyboard cursor
    pub cursor: usize,
    /// Help text visible
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
    /// Last pressed pad and when
    pub last_pad: Option<(usize, Instant)>,
}

impl UiState {
    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear expired status message
    pub fn clear_expired_status(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }

    /// Pad to draw lit, if one was pressed recently
    pub fn lit_pad(&self) -> Option<usize> {
        self.last_pad
            .filter(|(_, at)| at.elapsed() < PAD_FLASH)
            .map(|(pad, _)| pad)
    }

    /// Turn a control action into an engine intent. Cursor and help
    /// actions are handled here and produce no intent.
    pub fn resolve(&mut self, action: &ControlAction, snapshot: &Snapshot) -> Option<Intent> {
        match *action {
            ControlAction::Pad(pad) => {
                if pad >= snapshot.pad_labels.len() {
                    return None;
                }
                self.last_pad = Some((pad, Instant::now()));
                Some(Intent::PressPad(pad))
            }
            ControlAction::TogglePlay => Some(Intent::PressPlay),
            ControlAction::ToggleRecord => Some(Intent::PressRecord),
            ControlAction::ToggleLoop => Some(Intent::PressLoop),
            ControlAction::CancelCountIn => Some(Intent::CancelCountIn),
            ControlAction::AdjustTempo(delta) => Some(Intent::SetTempo(
                (snapshot.tempo + delta).clamp(MIN_BPM, MAX_BPM),
            )),
            ControlAction::AdjustVolume(delta) => Some(Intent::SetVolume(
                (snapshot.volume as i16 + delta).clamp(0, 100) as u8,
            )),
            ControlAction::NextBar => {
                self.cursor = (self.cursor + 1) % BAR_COUNT;
                None
            }
            ControlAction::PreviousBar => {
                self.cursor = (self.cursor + BAR_COUNT - 1) % BAR_COUNT;
                None
            }
            ControlAction::ClickBar => Some(Intent::ClickBar(self.cursor)),
            ControlAction::Reset => Some(Intent::Reset),
            ControlAction::LoadDemo => Some(Intent::LoadDemo),
            ControlAction::TogglePadSet => Some(Intent::TogglePadSet),
            ControlAction::ToggleHelp => {
                self.show_help = !self.show_help;
                None
            }
            ControlAction::Quit => Some(Intent::Quit),
        }
    }
}

/// Terminal UI application
pub struct App {
    state: UiState,
    keyboard: KeyboardController,
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Target frame rate
    frame_rate: u32,
    /// Whether to continue running
    running: bool,
    /// Last engine notice shown
    last_notice: Option<String>,
}

impl App {
    /// Create a new app and take over the terminal
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            state: UiState::default(),
            keyboard: KeyboardController::with_defaults(),
            terminal,
            frame_rate: 30,
            running: true,
            last_notice: None,
        })
    }

    /// Stop the app
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Handle a key event
    pub fn handle_key(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        snapshot: &Snapshot,
    ) -> Option<Intent> {
        let action = self.keyboard.get_action(code, modifiers)?.clone();
        let intent = self.state.resolve(&action, snapshot);
        if intent == Some(Intent::Quit) {
            self.quit();
        }
        intent
    }

    /// Poll for a pending event without blocking
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        if event::poll(Duration::ZERO)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Run the UI until quit, forwarding intents to the runtime
    pub async fn run(mut self, handle: RuntimeHandle) -> io::Result<()> {
        let frame = Duration::from_millis(1000 / self.frame_rate as u64);
        let mut frames = tokio::time::interval(frame);

        while self.running {
            frames.tick().await;
            let snapshot = handle.snapshot();

            while let Some(event) = self.poll_event()? {
                let Event::Key(key) = event else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(intent) = self.handle_key(key.code, key.modifiers, &snapshot) {
                    if !handle.send(intent).await {
                        self.quit();
                    }
                }
            }

            if snapshot.notice != self.last_notice {
                if let Some(notice) = &snapshot.notice {
                    self.state.set_status(notice.clone());
                }
                self.last_notice = snapshot.notice.clone();
            }
            self.state.clear_expired_status();
            self.draw(&snapshot)?;
        }
        Ok(())
    }

    /// Draw the UI
    pub fn draw(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        let state = self.state.clone();
        let keyboard = &self.keyboard;

        self.terminal.draw(|frame| {
            let area = frame.area();

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),  // Transport
                    Constraint::Length(8),  // Bars
                    Constraint::Min(6),     // Pads
                    Constraint::Length(1),  // Status bar
                ])
                .split(area);

            frame.render_widget(
                TransportWidget::new(snapshot)
                    .block(Block::default().borders(Borders::ALL).title(" Transport ")),
                chunks[0],
            );

            frame.render_widget(
                BarGridWidget::new(snapshot)
                    .cursor(Some(state.cursor))
                    .block(Block::default().borders(Borders::ALL).title(" Bars ")),
                chunks[1],
            );

            let pads_title = format!(" {} Pads ", snapshot.pad_set);
            frame.render_widget(
                PadGridWidget::new(snapshot.pad_set)
                    .lit(state.lit_pad())
                    .block(Block::default().borders(Borders::ALL).title(pads_title)),
                chunks[2],
            );

            render_status_bar(frame, chunks[3], &state);

            if state.show_help {
                render_help_overlay(frame, area, keyboard);
            }
        })?;

        Ok(())
    }

    /// Restore the terminal
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let text = if let Some(ref msg) = state.status_message {
        Span::styled(msg.as_str(), Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " Space: Play | r: Record | Tab/Enter: Bar | l: Loop | p: Demo | ?: Help | Q: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect, keyboard: &KeyboardController) {
    let width = 50.min(area.width.saturating_sub(4));
    let height = 30.min(area.height.saturating_sub(4));
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let heading = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();
    for (category, bindings) in keyboard.bindings_by_category() {
        lines.push(Line::from(Span::styled(category.title(), heading)));
        if category == Category::Pads {
            // Sixteen rows would not fit
            lines.push(Line::from("  1-8, a-k    Play pad"));
            continue;
        }
        for binding in bindings {
            lines.push(Line::from(format!(
                "  {:<10}  {}",
                format_shortcut(&binding.shortcut),
                binding.description
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
