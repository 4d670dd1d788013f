//! Coordinator log panel.
//!
//! Each record is shown as a single-line JSON dump, in the order received.

use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use relief_core::LogRecord;

use crate::theme::Theme;

pub struct LogPanel<'a> {
    logs: &'a [LogRecord],
    updated_at: Option<DateTime<Local>>,
    theme: &'a Theme,
    focused: bool,
    scroll: u16,
}

impl<'a> LogPanel<'a> {
    pub fn new(logs: &'a [LogRecord], theme: &'a Theme) -> Self {
        Self {
            logs,
            updated_at: None,
            theme,
            focused: false,
            scroll: 0,
        }
    }

    pub fn updated_at(mut self, at: Option<DateTime<Local>>) -> Self {
        self.updated_at = at;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        if self.logs.is_empty() {
            return vec![Line::from(Span::styled(
                "No logs yet",
                Style::default().fg(colors.text_dim),
            ))];
        }

        self.logs
            .iter()
            .map(|record| Line::from(Span::styled(record.dump(), Style::default().fg(colors.text))))
            .collect()
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let focus_icon = if self.focused { "▶" } else { "▪" };
        let (border_type, border_style) = if self.focused {
            (
                BorderType::Double,
                Style::default()
                    .fg(colors.focus_highlight)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            (BorderType::Plain, Style::default().fg(colors.border_dim))
        };
        let title = match self.updated_at {
            Some(at) => format!(" {} Logs ({}) @ {} ", focus_icon, self.logs.len(), at.format("%H:%M:%S")),
            None => format!(" {} Logs ", focus_icon),
        };

        Paragraph::new(self.build_lines())
            .scroll((self.scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(border_type)
                    .border_style(border_style)
                    .title(Span::styled(
                        title,
                        Style::default().fg(colors.header).add_modifier(Modifier::BOLD),
                    )),
            )
            .render(area, buf);
    }
}
