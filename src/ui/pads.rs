// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pad grid widget.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::control::keyboard::PAD_KEYS;
use crate::music::{Pad, PadSet};

/// Pads per grid row
const PADS_PER_ROW: usize = 4;

/// Map a pad color name to a terminal color
pub fn pad_color(name: &str) -> Color {
    match name {
        "red" | "rose" => Color::Red,
        "pink" | "fuchsia" => Color::LightMagenta,
        "purple" | "violet" => Color::Magenta,
        "indigo" | "blue" => Color::Blue,
        "cyan" | "teal" => Color::Cyan,
        "green" | "emerald" => Color::Green,
        "lime" => Color::LightGreen,
        "yellow" | "amber" => Color::Yellow,
        "orange" => Color::LightRed,
        _ => Color::White,
    }
}

/// Widget showing the active pad set with key hints
pub struct PadGridWidget<'a> {
    pad_set: PadSet,
    lit: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> PadGridWidget<'a> {
    /// Create a new pad grid widget
    pub fn new(pad_set: PadSet) -> Self {
        Self {
            pad_set,
            lit: None,
            block: None,
        }
    }

    /// Highlight a recently pressed pad
    pub fn lit(mut self, pad: Option<usize>) -> Self {
        self.lit = pad;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

fn pad_cell(index: usize, pad: &Pad, lit: bool) -> Paragraph<'static> {
    let color = pad_color(pad.color);
    let style = if lit {
        Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };
    let key = PAD_KEYS.get(index).copied().unwrap_or(' ');
    let line = Line::from(vec![
        Span::styled(format!("{} ", key), Style::default().fg(Color::DarkGray)),
        Span::styled(pad.label, style),
    ]);
    Paragraph::new(line).block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)))
}

impl Widget for PadGridWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let pads = self.pad_set.pads();
        let row_count = pads.len().div_ceil(PADS_PER_ROW);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(3); row_count])
            .split(area);

        for (row, row_area) in rows.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![
                    Constraint::Ratio(1, PADS_PER_ROW as u32);
                    PADS_PER_ROW
                ])
                .split(*row_area);

            for (col, cell) in cells.iter().enumerate() {
                let index = row * PADS_PER_ROW + col;
                if let Some(pad) = pads.get(index) {
                    pad_cell(index, pad, self.lit == Some(index)).render(*cell, buf);
                }
            }
        }
    }
}
