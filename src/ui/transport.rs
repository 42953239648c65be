// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport display widget.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Paragraph, Widget},
};

use crate::engine::Snapshot;
use crate::sequencer::BAR_COUNT;

/// Transport widget for displaying playback state
pub struct TransportWidget<'a> {
    state: &'a Snapshot,
    block: Option<Block<'a>>,
}

impl<'a> TransportWidget<'a> {
    /// Create a new transport widget
    pub fn new(state: &'a Snapshot) -> Self {
        Self { state, block: None }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

/// Indicator text and style for the transport state
fn indicator(state: &Snapshot) -> (&'static str, Style) {
    if state.counting_in {
        ("◌ COUNT", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else if state.recording {
        ("● REC", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else if state.running {
        ("▶ PLAY", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        ("■ STOP", Style::default().fg(Color::Yellow))
    }
}

impl Widget for TransportWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(10), // State indicator
                Constraint::Length(11), // Bar
                Constraint::Length(10), // Tempo
                Constraint::Length(10), // Volume
                Constraint::Length(9),  // Loop
                Constraint::Min(0),     // Pad set
            ])
            .split(area);

        let (text, style) = indicator(self.state);
        Paragraph::new(text).style(style).render(chunks[0], buf);

        // Bars are 1-indexed for display
        let bar = format!("Bar {:02}/{}", self.state.current_bar + 1, BAR_COUNT);
        Paragraph::new(bar)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .render(chunks[1], buf);

        let tempo = format!("{:.0} BPM", self.state.tempo);
        Paragraph::new(tempo)
            .style(Style::default().fg(Color::Magenta))
            .render(chunks[2], buf);

        let volume = format!("Vol {}%", self.state.volume);
        Paragraph::new(volume)
            .style(Style::default().fg(Color::White))
            .render(chunks[3], buf);

        let (loop_text, loop_style) = if self.state.looping {
            ("Loop 4", Style::default().fg(Color::Green))
        } else {
            ("Loop 16", Style::default().fg(Color::DarkGray))
        };
        Paragraph::new(loop_text).style(loop_style).render(chunks[4], buf);

        Paragraph::new(format!("Pads: {}", self.state.pad_set))
            .style(Style::default().fg(Color::White))
            .render(chunks[5], buf);
    }
}
