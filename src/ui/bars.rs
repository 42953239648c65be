// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Bar grid widget.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::engine::Snapshot;
use crate::sequencer::BAR_COUNT;

/// Bars per grid row
const BARS_PER_ROW: usize = 8;

/// Widget showing the 16 bars with play head, selection and content
pub struct BarGridWidget<'a> {
    state: &'a Snapshot,
    cursor: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> BarGridWidget<'a> {
    /// Create a new bar grid widget
    pub fn new(state: &'a Snapshot) -> Self {
        Self {
            state,
            cursor: None,
            block: None,
        }
    }

    /// Set the keyboard cursor position
    pub fn cursor(mut self, bar: Option<usize>) -> Self {
        self.cursor = bar;
        self
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn cell_style(&self, bar: usize) -> Style {
        let state = self.state;
        let in_loop = !state.looping || bar < 4;

        let mut style = if state.selected_bar == Some(bar) {
            Style::default().fg(Color::Black).bg(Color::Red)
        } else if state.current_bar == bar {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else if state.has_content[bar] {
            Style::default().fg(Color::Black).bg(Color::Blue)
        } else {
            Style::default().fg(Color::Gray)
        };
        if !in_loop {
            style = style.add_modifier(Modifier::DIM);
        }
        style
    }
}

impl Widget for BarGridWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block.clone() {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(3);
                BAR_COUNT / BARS_PER_ROW
            ])
            .split(area);

        for (row, row_area) in rows.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![
                    Constraint::Ratio(1, BARS_PER_ROW as u32);
                    BARS_PER_ROW
                ])
                .split(*row_area);

            for (col, cell) in cells.iter().enumerate() {
                let bar = row * BARS_PER_ROW + col;
                let border_style = if self.cursor == Some(bar) {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Paragraph::new(format!("{}", bar + 1))
                    .style(self.cell_style(bar))
                    .block(Block::default().borders(Borders::ALL).border_style(border_style))
                    .render(*cell, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_styles() {
        let mut state = Snapshot::default();
        state.has_content = [false; BAR_COUNT];
        state.has_content[1] = true;
        state.current_bar = 2;
        state.selected_bar = Some(3);

        let grid = BarGridWidget::new(&state);
        assert_eq!(grid.cell_style(1).bg, Some(Color::Blue));
        assert_eq!(grid.cell_style(2).bg, Some(Color::Green));
        assert_eq!(grid.cell_style(3).bg, Some(Color::Red));
        assert_eq!(grid.cell_style(0).bg, None);
    }

    #[test]
    fn test_bars_outside_loop_dimmed() {
        let state = Snapshot::default();
        let grid = BarGridWidget::new(&state);
        assert!(!grid.cell_style(3).add_modifier.contains(Modifier::DIM));
        assert!(grid.cell_style(4).add_modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_render_grid_labels() {
        let state = Snapshot::default();
        let area = Rect::new(0, 0, 80, 6);
        let mut buf = Buffer::empty(area);
        BarGridWidget::new(&state).cursor(Some(0)).render(area, &mut buf);
        let text: String = buf.content.iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("16"));
        assert!(text.contains("9"));
    }
}
