//! Map panel.
//!
//! Plots every alert that carries both `lat` and `lon` on a world map,
//! colored by risk tier. Alerts without coordinates are simply not drawn.
//! The view is centred on the first located alert, falling back to a fixed
//! point over the Indian subcontinent when none is located, and widens until
//! every other located alert is in frame.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Paragraph, Widget, Wrap,
        canvas::{Canvas, Map, MapResolution},
    },
};
use relief_core::{RiskTier, ScoredAlert};

use crate::theme::Theme;

/// Map centre used when no alert is located, as (lat, lon).
pub const FALLBACK_CENTER: (f64, f64) = (20.5937, 78.9629);

/// Minimum half-width of the visible window in degrees of longitude.
const LON_SPAN: f64 = 30.0;
/// Minimum half-height of the visible window in degrees of latitude.
const LAT_SPAN: f64 = 18.0;
/// Margin kept between the outermost marker and the window edge.
const MARKER_PADDING: f64 = 5.0;

/// One plotted alert.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub alert_id: String,
    pub lat: f64,
    pub lon: f64,
    pub risk: f64,
    pub tier: RiskTier,
    /// Text shown when the marker is selected
    pub popup: String,
}

/// Markers for every alert carrying both coordinates, in feed order.
pub fn map_markers(alerts: &[ScoredAlert]) -> Vec<MapMarker> {
    alerts
        .iter()
        .filter_map(|scored| {
            let (lat, lon) = scored.alert.coordinates()?;
            Some(MapMarker {
                alert_id: scored.alert.id.clone(),
                lat,
                lon,
                risk: scored.risk,
                tier: scored.tier(),
                popup: popup_text(scored),
            })
        })
        .collect()
}

/// Centre of the map as (lat, lon).
pub fn map_center(alerts: &[ScoredAlert]) -> (f64, f64) {
    alerts
        .iter()
        .find_map(|scored| scored.alert.coordinates())
        .unwrap_or(FALLBACK_CENTER)
}

/// Popup text for a marker: type, location, risk and time.
pub fn popup_text(scored: &ScoredAlert) -> String {
    let alert = &scored.alert;
    format!(
        "{} - {} | Risk: {:.2} | {}",
        alert.kind,
        alert.location,
        scored.risk,
        alert.display_time()
    )
}

/// Visible bounds as (x_bounds, y_bounds).
///
/// The window is centred on `center` and grows until every marker fits with
/// some padding. It never extends past the world; when clamping moves it, it
/// shifts rather than shrinks, so every marker stays inside.
fn viewport(center: (f64, f64), markers: &[MapMarker]) -> ([f64; 2], [f64; 2]) {
    let (lat, lon) = center;
    let half_lon = markers
        .iter()
        .map(|m| (m.lon - lon).abs() + MARKER_PADDING)
        .fold(LON_SPAN, f64::max)
        .min(180.0);
    let half_lat = markers
        .iter()
        .map(|m| (m.lat - lat).abs() + MARKER_PADDING)
        .fold(LAT_SPAN, f64::max)
        .min(90.0);

    let lon = lon.clamp(-180.0 + half_lon, 180.0 - half_lon);
    let lat = lat.clamp(-90.0 + half_lat, 90.0 - half_lat);
    (
        [lon - half_lon, lon + half_lon],
        [lat - half_lat, lat + half_lat],
    )
}

/// Map widget.
pub struct MapPanel<'a> {
    alerts: &'a [ScoredAlert],
    theme: &'a Theme,
    selected: Option<usize>,
    focused: bool,
}

impl<'a> MapPanel<'a> {
    pub fn new(alerts: &'a [ScoredAlert], theme: &'a Theme) -> Self {
        Self {
            alerts,
            theme,
            selected: None,
            focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set the selected marker index (into [`map_markers`]).
    pub fn selected(mut self, index: Option<usize>) -> Self {
        self.selected = index;
        self
    }
}

impl Widget for MapPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let markers = map_markers(self.alerts);
        let (x_bounds, y_bounds) = viewport(map_center(self.alerts), &markers);

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
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(border_style)
            .title(Span::styled(
                format!(" {} Map ({} located) ", focus_icon, markers.len()),
                Style::default().fg(colors.header).add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(inner);

        let land = colors.map_land;
        let plotted: Vec<(f64, f64, Span<'static>)> = markers
            .iter()
            .enumerate()
            .map(|(idx, m)| {
                let color = self.theme.risk_color(m.tier);
                let span = if self.selected == Some(idx) {
                    Span::styled(
                        "◉",
                        Style::default().fg(color).add_modifier(Modifier::BOLD | Modifier::REVERSED),
                    )
                } else {
                    Span::styled("●", Style::default().fg(color))
                };
                (m.lon, m.lat, span)
            })
            .collect();

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                ctx.draw(&Map {
                    color: land,
                    resolution: MapResolution::High,
                });
                ctx.layer();
                for (x, y, span) in &plotted {
                    ctx.print(*x, *y, span.clone());
                }
            })
            .render(chunks[0], buf);

        let footer = match self.selected.and_then(|i| markers.get(i)) {
            Some(m) => Line::from(vec![
                Span::styled(
                    format!("{} ", m.alert_id),
                    Style::default().fg(self.theme.risk_color(m.tier)).add_modifier(Modifier::BOLD),
                ),
                Span::styled(m.popup.clone(), Style::default().fg(colors.text)),
            ]),
            None if markers.is_empty() => Line::from(Span::styled(
                "No located alerts",
                Style::default().fg(colors.text_dim),
            )),
            None => Line::from(Span::styled(
                "[j/k] Select marker  [Enter] Request plan",
                Style::default().fg(colors.hotkey),
            )),
        };
        Paragraph::new(footer)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);
    }
}
