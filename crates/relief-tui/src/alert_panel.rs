//! Alert list panel.
//!
//! Renders the current alert collection in feed order with a risk badge per
//! alert. The selected row is the target of the "request plan" action.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use relief_core::{ScoredAlert, risk};

use crate::state::FeedStatus;
use crate::theme::Theme;

/// Lines used per alert row.
const LINES_PER_ALERT: usize = 2;

/// Alert list widget.
pub struct AlertPanel<'a> {
    alerts: &'a [ScoredAlert],
    feed_status: &'a FeedStatus,
    theme: &'a Theme,
    selected: Option<usize>,
    focused: bool,
}

impl<'a> AlertPanel<'a> {
    pub fn new(alerts: &'a [ScoredAlert], feed_status: &'a FeedStatus, theme: &'a Theme) -> Self {
        Self {
            alerts,
            feed_status,
            theme,
            selected: None,
            focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set the selected alert index.
    pub fn selected(mut self, index: Option<usize>) -> Self {
        self.selected = index;
        self
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let dim = Style::default().fg(colors.text_dim);
        let mut lines = Vec::new();

        lines.push(Line::from(vec![
            Span::styled(
                format!("Total: {}", self.alerts.len()),
                Style::default().fg(colors.header).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("   {}", self.feed_status.label()), dim),
        ]));
        lines.push(Line::raw(""));

        if self.alerts.is_empty() {
            let text = match self.feed_status {
                FeedStatus::Unavailable { .. } => "Alerts unavailable. Retrying on next poll.",
                _ => "No alerts yet",
            };
            lines.push(Line::from(Span::styled(text, dim)));
            return lines;
        }

        for (idx, scored) in self.alerts.iter().enumerate() {
            let alert = &scored.alert;
            let is_selected = self.selected == Some(idx);
            let marker = if is_selected { "▶ " } else { "  " };
            let row_style = if is_selected {
                Style::default()
                    .fg(colors.text)
                    .bg(colors.selection_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text)
            };
            let kind = if alert.kind.is_empty() { "alert" } else { alert.kind.as_str() };

            lines.push(Line::from(vec![
                Span::styled(marker, row_style),
                Span::styled(
                    format!("[{}]", risk::badge(scored.risk)),
                    Style::default()
                        .fg(self.theme.risk_color(scored.tier()))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" {} @ {}", kind, alert.location), row_style),
                Span::styled(format!("  {}", alert.display_time()), dim),
            ]));

            let mut detail = format!("    id: {}  confidence: {}", alert.id, alert.display_confidence());
            if let Some(source) = alert.source.as_deref().filter(|s| !s.is_empty()) {
                detail.push_str(&format!("  source: {source}"));
            }
            if alert.coordinates().is_none() {
                detail.push_str("  (no location fix)");
            }
            lines.push(Line::from(Span::styled(detail, dim)));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "[j/k] Navigate  [Enter] Request plan  [r] Refresh",
            Style::default().fg(colors.hotkey),
        )));

        lines
    }

    /// Vertical scroll keeping the selected row visible.
    fn scroll_offset(&self, inner_height: u16) -> u16 {
        let Some(selected) = self.selected else {
            return 0;
        };
        // Header takes two lines.
        let row_bottom = 2 + (selected + 1) * LINES_PER_ALERT;
        let height = inner_height as usize;
        if row_bottom > height {
            (row_bottom - height).min(u16::MAX as usize) as u16
        } else {
            0
        }
    }
}

impl Widget for AlertPanel<'_> {
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

        let scroll = self.scroll_offset(area.height.saturating_sub(2));
        let paragraph = Paragraph::new(self.build_lines())
            .scroll((scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(border_type)
                    .border_style(border_style)
                    .title(Span::styled(
                        format!(" {} Alerts ", focus_icon),
                        Style::default().fg(colors.header).add_modifier(Modifier::BOLD),
                    )),
            );

        paragraph.render(area, buf);
    }
}
