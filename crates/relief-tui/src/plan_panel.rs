//! Plan detail panel.
//!
//! Shows the selected plan: server-declared risk, the task sequence in order,
//! and the assignment structure dumped verbatim.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};
use relief_core::risk;

use crate::state::SelectedPlan;
use crate::theme::Theme;

/// Plan detail widget.
pub struct PlanPanel<'a> {
    plan: Option<&'a SelectedPlan>,
    pending: Option<&'a str>,
    theme: &'a Theme,
    focused: bool,
    scroll: u16,
}

impl<'a> PlanPanel<'a> {
    pub fn new(plan: Option<&'a SelectedPlan>, theme: &'a Theme) -> Self {
        Self {
            plan,
            pending: None,
            theme,
            focused: false,
            scroll: 0,
        }
    }

    /// Alert id of a request still in flight.
    pub fn pending(mut self, alert_id: Option<&'a str>) -> Self {
        self.pending = alert_id;
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
        let dim = Style::default().fg(colors.text_dim);
        let heading = Style::default().fg(colors.header).add_modifier(Modifier::BOLD);
        let mut lines = Vec::new();

        if let Some(alert_id) = self.pending {
            lines.push(Line::from(Span::styled(
                format!("⟳ Generating plan for {alert_id}..."),
                Style::default().fg(colors.status_warning),
            )));
            lines.push(Line::raw(""));
        }

        let Some(selected) = self.plan else {
            lines.push(Line::from(Span::styled("No plan selected", dim)));
            lines.push(Line::from(Span::styled(
                "Select an alert and press [Enter] to request a plan.",
                dim,
            )));
            return lines;
        };
        let plan = &selected.plan;

        lines.push(Line::from(vec![
            Span::styled("Alert: ", heading),
            Span::raw(selected.alert_id.clone()),
            Span::styled(
                format!("   received {}", selected.received_at.format("%H:%M:%S")),
                dim,
            ),
        ]));
        if let Some(event_id) = plan.event_id.as_deref() {
            lines.push(Line::from(vec![
                Span::styled("Event: ", heading),
                Span::raw(event_id.to_string()),
            ]));
        }

        let server_risk = plan.server_risk();
        lines.push(Line::from(vec![
            Span::styled("Risk: ", heading),
            Span::styled(
                risk::format_percent(server_risk),
                Style::default()
                    .fg(self.theme.risk_color(risk::RiskTier::from_risk(server_risk)))
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::raw(""));

        lines.push(Line::from(Span::styled(format!("Tasks ({})", plan.tasks.len()), heading)));
        if plan.tasks.is_empty() {
            lines.push(Line::from(Span::styled("  No tasks generated", dim)));
        }
        for (idx, task) in plan.tasks.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}. ", idx + 1), dim),
                Span::styled(
                    task.label().to_string(),
                    Style::default().fg(colors.text).add_modifier(Modifier::BOLD),
                ),
                Span::styled(": ", dim),
                Span::styled(task.detail(), Style::default().fg(colors.text)),
            ]));
        }
        lines.push(Line::raw(""));

        lines.push(Line::from(Span::styled("Assignment", heading)));
        match plan.assignment_dump() {
            Some(dump) => {
                for row in dump.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {row}"),
                        Style::default().fg(colors.text),
                    )));
                }
            }
            None => lines.push(Line::from(Span::styled("  No assignment", dim))),
        }

        lines
    }
}

impl Widget for PlanPanel<'_> {
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

        Paragraph::new(self.build_lines())
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(border_type)
                    .border_style(border_style)
                    .title(Span::styled(
                        format!(" {} Response Plan ", focus_icon),
                        Style::default().fg(colors.header).add_modifier(Modifier::BOLD),
                    )),
            )
            .render(area, buf);
    }
}
