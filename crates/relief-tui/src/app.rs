//! Main application state and logic for the relief console.
//!
//! The `App` struct owns the [`Console`] coordination layer, the current view
//! and the selection state, and draws everything each frame.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use relief_api::{HttpBackend, ReliefBackend};
use relief_core::ConsoleConfig;
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info};

use crate::alert_panel::AlertPanel;
use crate::console::Console;
use crate::event::{AppEvent, InputHandler};
use crate::feed::RefreshCause;
use crate::log_panel::LogPanel;
use crate::map_panel::{MapPanel, map_markers};
use crate::notify::NotificationLevel;
use crate::plan_panel::PlanPanel;
use crate::state::{BackendHealth, FeedStatus};
use crate::theme::ThemeManager;
use crate::view::{LayoutMode, SelectionTarget, View};

/// Result type for app operations.
pub type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Target frame rate (60 FPS = ~16.67ms per frame).
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_millis(1000 / TARGET_FPS);

/// Header timestamp cache duration (update every second).
const TIMESTAMP_CACHE_DURATION: Duration = Duration::from_secs(1);

/// Rows moved by PageUp/PageDown.
const PAGE_SIZE: usize = 10;

/// Main application state.
pub struct App {
    /// Coordination layer; declared before the runtime so it drops first
    console: Console,
    /// Runtime owned by the app when it created one itself
    runtime: Option<Runtime>,
    current_view: View,
    input_handler: InputHandler,
    should_quit: bool,
    show_help: bool,
    theme_manager: ThemeManager,
    /// Dirty flag - whether UI needs redraw
    dirty: bool,
    /// Selected row in the alert list
    alert_selected: usize,
    /// Selected marker on the map
    marker_selected: usize,
    plan_scroll: u16,
    log_scroll: u16,
    cached_timestamp: Option<String>,
    last_timestamp_update: Instant,
}

impl App {
    /// Create an app talking HTTP to the configured backend.
    ///
    /// Builds a multi-threaded runtime for backend calls; the terminal loop
    /// itself stays on the calling thread.
    pub fn new(config: &ConsoleConfig) -> AppResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("relief-io")
            .enable_all()
            .build()?;
        let backend: Arc<dyn ReliefBackend> = Arc::new(HttpBackend::from_config(config)?);

        let mut app = Self::with_backend(backend, config, runtime.handle().clone());
        app.runtime = Some(runtime);
        Ok(app)
    }

    /// Create an app on an existing runtime with any backend (used by tests).
    pub fn with_backend(
        backend: Arc<dyn ReliefBackend>,
        config: &ConsoleConfig,
        handle: Handle,
    ) -> Self {
        Self {
            console: Console::new(backend, handle, config),
            runtime: None,
            current_view: View::default(),
            input_handler: InputHandler::new(),
            should_quit: false,
            show_help: false,
            theme_manager: ThemeManager::from_config(config.theme.as_deref()),
            dirty: true,
            alert_selected: 0,
            marker_selected: 0,
            plan_scroll: 0,
            log_scroll: 0,
            cached_timestamp: None,
            last_timestamp_update: Instant::now(),
        }
    }

    pub fn current_view(&self) -> View {
        self.current_view
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Index of the selected alert in the list.
    pub fn selected_alert(&self) -> usize {
        self.alert_selected
    }

    /// Index of the selected map marker.
    pub fn selected_marker(&self) -> usize {
        self.marker_selected
    }

    /// Switch to a different view.
    pub fn switch_view(&mut self, view: View) {
        if self.current_view != view {
            debug!(from = %self.current_view, to = %view, "switching view");
            self.current_view = view;
            self.mark_dirty();
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Take the dirty flag, clearing it.
    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drive the console one step: fire due timers and apply finished work.
    pub fn tick(&mut self) -> bool {
        let changed = self.console.poll_updates();
        if changed {
            self.clamp_selection();
            self.mark_dirty();
        }
        changed
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let event = self.input_handler.handle_key(key);
        self.handle_app_event(event);
    }

    /// Handle an application event.
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SwitchView(view) => self.switch_view(view),
            AppEvent::NextView => self.switch_view(self.current_view.next()),
            AppEvent::PrevView => self.switch_view(self.current_view.prev()),
            AppEvent::ShowHelp => self.set_help(true),
            AppEvent::HideHelp | AppEvent::Cancel => self.set_help(false),
            AppEvent::Quit | AppEvent::ForceQuit => self.quit(),
            AppEvent::Refresh => {
                self.console.refresh_alerts(RefreshCause::Manual);
                self.mark_dirty();
            }
            AppEvent::RequestPlan => self.request_plan_for_selection(),
            AppEvent::DismissNotification => {
                if self.console.dismiss_notification() {
                    self.mark_dirty();
                }
            }
            AppEvent::CycleTheme => {
                let name = self.theme_manager.cycle_theme();
                debug!(theme = name.display_name(), "theme cycled");
                self.mark_dirty();
            }
            AppEvent::NavigateUp => self.navigate(|pos, _| pos.saturating_sub(1)),
            AppEvent::NavigateDown => self.navigate(|pos, _| pos.saturating_add(1)),
            AppEvent::PageUp => self.navigate(|pos, _| pos.saturating_sub(PAGE_SIZE)),
            AppEvent::PageDown => self.navigate(|pos, _| pos.saturating_add(PAGE_SIZE)),
            AppEvent::GoToTop => self.navigate(|_, _| 0),
            AppEvent::GoToBottom => self.navigate(|_, len| len.saturating_sub(1)),
            AppEvent::None => {}
        }
    }

    fn set_help(&mut self, visible: bool) {
        self.show_help = visible;
        self.input_handler.set_help_visible(visible);
        self.mark_dirty();
    }

    fn quit(&mut self) {
        info!("quit requested, disposing console");
        self.console.dispose();
        self.should_quit = true;
    }

    /// Apply a movement to whatever the current view navigates.
    fn navigate(&mut self, step: impl Fn(usize, usize) -> usize) {
        match self.current_view.selection_target() {
            SelectionTarget::AlertList => {
                let len = self.console.state().alerts().len();
                self.alert_selected = step(self.alert_selected, len).min(len.saturating_sub(1));
            }
            SelectionTarget::MapMarkers => {
                let len = map_markers(self.console.state().alerts()).len();
                self.marker_selected = step(self.marker_selected, len).min(len.saturating_sub(1));
            }
            SelectionTarget::Scroll => {
                let (scroll, len) = match self.current_view {
                    View::Logs => (&mut self.log_scroll, self.console.state().logs().len()),
                    _ => (&mut self.plan_scroll, usize::from(u16::MAX)),
                };
                let next = step(usize::from(*scroll), len).min(len.saturating_sub(1));
                *scroll = u16::try_from(next).unwrap_or(u16::MAX);
            }
        }
        self.mark_dirty();
    }

    /// Keep selections inside the current alert and marker counts.
    fn clamp_selection(&mut self) {
        let alerts = self.console.state().alerts();
        self.alert_selected = self.alert_selected.min(alerts.len().saturating_sub(1));
        let markers = map_markers(alerts).len();
        self.marker_selected = self.marker_selected.min(markers.saturating_sub(1));
        let logs = self.console.state().logs().len();
        self.log_scroll = self
            .log_scroll
            .min(u16::try_from(logs.saturating_sub(1)).unwrap_or(u16::MAX));
    }

    /// Alert id the "request plan" action applies to in the current view.
    fn plan_target(&self) -> Option<String> {
        let state = self.console.state();
        match self.current_view.selection_target() {
            SelectionTarget::AlertList => state
                .alerts()
                .get(self.alert_selected)
                .map(|scored| scored.alert.id.clone()),
            SelectionTarget::MapMarkers => map_markers(state.alerts())
                .into_iter()
                .nth(self.marker_selected)
                .map(|marker| marker.alert_id),
            // Re-request the plan on display
            SelectionTarget::Scroll => state.plan().map(|selected| selected.alert_id.clone()),
        }
    }

    fn request_plan_for_selection(&mut self) {
        match self.plan_target() {
            Some(alert_id) => {
                if self.console.request_plan(&alert_id).is_some() {
                    self.plan_scroll = 0;
                }
            }
            None => self
                .console
                .notify(NotificationLevel::Warning, "No alert selected"),
        }
        self.mark_dirty();
    }

    /// Run the main application loop.
    pub fn run(&mut self) -> AppResult<()> {
        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(
            stdout,
            crossterm::terminal::EnterAlternateScreen,
            crossterm::event::EnableMouseCapture
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.run_loop(&mut terminal);

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        self.console.dispose();
        if let Some(runtime) = self.runtime.take() {
            // In-flight requests are abandoned, not awaited.
            runtime.shutdown_background();
        }

        result
    }

    /// The inner event loop with frame-rate limiting.
    fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> AppResult<()> {
        while !self.should_quit {
            let frame_start = Instant::now();

            self.tick();

            let needs_redraw = self.take_dirty()
                || self.last_timestamp_update.elapsed() >= TIMESTAMP_CACHE_DURATION;
            if needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
            }

            let elapsed = frame_start.elapsed();
            let event_timeout = if elapsed < FRAME_DURATION {
                FRAME_DURATION - elapsed
            } else {
                // If frame took too long, use shorter timeout
                Duration::from_millis(10)
            };

            if event::poll(event_timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
                    Event::Resize(_, _) => self.mark_dirty(),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Draw the UI.
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: header, content, footer
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Content
                Constraint::Length(2), // Footer
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_content(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        if self.show_help {
            self.draw_help_overlay(frame, area);
        }
    }

    fn cached_timestamp(&mut self) -> String {
        if self.cached_timestamp.is_none()
            || self.last_timestamp_update.elapsed() >= TIMESTAMP_CACHE_DURATION
        {
            self.cached_timestamp = Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
            self.last_timestamp_update = Instant::now();
        }
        self.cached_timestamp.clone().unwrap_or_default()
    }

    /// Draw the header bar: title, busy indicator, feed status and backend health.
    fn draw_header(&mut self, frame: &mut Frame, area: Rect) {
        let now = self.cached_timestamp();
        let theme = self.theme_manager.current();
        let state = self.console.state();
        let title = format!(" Relief Console - {} ", self.current_view.title());

        let feed_color = match state.feed_status() {
            FeedStatus::Loading => theme.colors.status_warning,
            FeedStatus::Live { .. } => theme.colors.status_ok,
            FeedStatus::Unavailable { .. } => theme.colors.status_error,
        };
        let (health_text, health_color) = match state.health() {
            BackendHealth::Unknown => ("[Backend ?]".to_string(), theme.colors.text_dim),
            BackendHealth::Up => ("[Backend up]".to_string(), theme.colors.status_ok),
            BackendHealth::Down(_) => ("[Backend down]".to_string(), theme.colors.status_error),
        };
        let busy_text = if state.is_busy() {
            format!("⟳ Working ({})", state.busy_count())
        } else {
            String::new()
        };

        let mut spans = vec![
            Span::styled(
                title,
                Style::default().fg(theme.colors.header).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {} ", state.feed_status().label()), Style::default().fg(feed_color)),
        ];
        if !busy_text.is_empty() {
            spans.push(Span::styled(
                format!(" {busy_text} "),
                Style::default()
                    .fg(theme.colors.status_warning)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let right_len = now.chars().count() + 2 + health_text.chars().count();
        let spacing = usize::from(area.width).saturating_sub(used + right_len + 2);
        spans.push(Span::raw(" ".repeat(spacing)));
        spans.push(Span::styled(now, Style::default().fg(theme.colors.text_dim)));
        spans.push(Span::raw("  "));
        spans.push(Span::styled(health_text, Style::default().fg(health_color)));

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.colors.border_dim)),
        );

        frame.render_widget(header, area);
    }

    /// Draw the main content area based on current view.
    fn draw_content(&mut self, frame: &mut Frame, area: Rect) {
        match self.current_view {
            View::Overview => self.draw_overview(frame, area),
            View::Alerts => self.draw_alerts(frame, area, true),
            View::Map => self.draw_map(frame, area, true),
            View::Plan => self.draw_plan(frame, area, true),
            View::Logs => self.draw_logs(frame, area, true),
        }
    }

    /// Draw the footer with hotkey hints and the newest notification.
    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme_manager.current();
        let hotkey_style = Style::default().fg(theme.colors.hotkey);
        let mut hints = Vec::new();
        for view in View::ALL {
            hints.push(Span::styled(format!("[{}]", view.hotkey()), hotkey_style));
            hints.push(Span::raw(format!("{} ", view.title())));
        }
        hints.extend([
            Span::styled("[Enter]", hotkey_style),
            Span::raw("Plan "),
            Span::styled("[r]", hotkey_style),
            Span::raw("Refresh "),
            Span::styled("[?]", hotkey_style),
            Span::raw("Help "),
            Span::styled("[q]", hotkey_style),
            Span::raw("Quit"),
        ]);

        let mut block = Block::default().borders(Borders::TOP);
        if let Some(note) = self.console.state().notifications().current() {
            let color = match note.level {
                NotificationLevel::Info => theme.colors.status_ok,
                NotificationLevel::Warning => theme.colors.status_warning,
                NotificationLevel::Error => theme.colors.status_error,
            };
            block = block
                .title(Span::styled(
                    format!(" {} [x] ", note.format_compact()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
                .title_alignment(Alignment::Right);
        }

        let footer = Paragraph::new(Line::from(hints))
            .style(Style::default().fg(theme.colors.text_dim))
            .block(block);

        frame.render_widget(footer, area);
    }

    /// Draw the Overview view.
    ///
    /// Wide terminals get a 2x2 grid (alerts and map above, plan and logs
    /// below). Narrow terminals stack alerts, plan and logs.
    fn draw_overview(&mut self, frame: &mut Frame, area: Rect) {
        match LayoutMode::from_width(area.width) {
            LayoutMode::Wide => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                    .split(area);
                let top = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(rows[0]);
                let bottom = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(rows[1]);

                self.draw_alerts(frame, top[0], true);
                self.draw_map(frame, top[1], false);
                self.draw_plan(frame, bottom[0], false);
                self.draw_logs(frame, bottom[1], false);
            }
            LayoutMode::Narrow => {
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Percentage(45),
                        Constraint::Percentage(35),
                        Constraint::Percentage(20),
                    ])
                    .split(area);

                self.draw_alerts(frame, rows[0], true);
                self.draw_plan(frame, rows[1], false);
                self.draw_logs(frame, rows[2], false);
            }
        }
    }

    fn draw_alerts(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let state = self.console.state();
        let alerts = state.alerts();
        let selected = (!alerts.is_empty()).then_some(self.alert_selected);
        frame.render_widget(
            AlertPanel::new(alerts, state.feed_status(), self.theme_manager.current())
                .focused(focused)
                .selected(selected),
            area,
        );
    }

    fn draw_map(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let alerts = self.console.state().alerts();
        let has_markers = alerts.iter().any(|scored| scored.alert.coordinates().is_some());
        // Only the map view moves the marker selection.
        let selected = (focused && has_markers).then_some(self.marker_selected);
        frame.render_widget(
            MapPanel::new(alerts, self.theme_manager.current())
                .focused(focused)
                .selected(selected),
            area,
        );
    }

    fn draw_plan(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let state = self.console.state();
        frame.render_widget(
            PlanPanel::new(state.plan(), self.theme_manager.current())
                .pending(state.pending_plan())
                .focused(focused)
                .scroll(if focused { self.plan_scroll } else { 0 }),
            area,
        );
    }

    fn draw_logs(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let state = self.console.state();
        frame.render_widget(
            LogPanel::new(state.logs(), self.theme_manager.current())
                .updated_at(state.logs_updated_at())
                .focused(focused)
                .scroll(if focused { self.log_scroll } else { 0 }),
            area,
        );
    }

    fn draw_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let theme = self.theme_manager.current();
        let overlay_width = 60.min(area.width.saturating_sub(4));
        let overlay_height = 24.min(area.height.saturating_sub(4));
        let overlay_x = (area.width - overlay_width) / 2;
        let overlay_y = (area.height - overlay_height) / 2;

        let overlay_area = Rect::new(overlay_x, overlay_y, overlay_width, overlay_height);

        frame.render_widget(Clear, overlay_area);

        let help_text = "\
Relief Console Hotkey Reference

Views:
  o        Overview
  a        Alerts
  m        Map
  p        Response plan
  l        Coordinator logs
  Tab      Cycle views forward
  Shift+Tab Cycle views backward

Actions:
  Enter    Request plan for selected alert/marker
  r        Refresh alerts now
  x        Dismiss notification
  C        Cycle theme

General:
  ?  h     Show this help
  q        Quit
  Ctrl+C   Force quit
  ↑ k / ↓ j  Move selection or scroll

Press any key to close this help.";

        let help = Paragraph::new(help_text)
            .style(Style::default().fg(theme.colors.text))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.colors.header))
                    .title(Span::styled(
                        " Help ",
                        Style::default().fg(theme.colors.header).add_modifier(Modifier::BOLD),
                    ))
                    .style(Style::default().bg(Color::Black)),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(help, overlay_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use relief_api::ApiError;
    use relief_core::{Alert, HealthStatus, LogRecord, Plan};
    use serde_json::json;
    use std::sync::Mutex;

    /// Backend answering every call immediately with fixed data.
    struct FixedBackend {
        alerts: Mutex<Vec<Alert>>,
    }

    #[async_trait]
    impl ReliefBackend for FixedBackend {
        async fn poll_alerts(&self) -> relief_api::Result<Vec<Alert>> {
            Ok(self.alerts.lock().unwrap().clone())
        }

        async fn request_plan(&self, alert_id: &str) -> relief_api::Result<Plan> {
            if alert_id == "missing" {
                return Err(ApiError::Status {
                    status: 404,
                    body: "Alert not found".into(),
                });
            }
            Ok(serde_json::from_value(json!({
                "event_id": alert_id,
                "risk": 0.7,
                "tasks": [{"task": "evacuate"}],
                "assignment": {"team1": "zoneA"}
            }))
            .unwrap())
        }

        async fn fetch_logs(&self) -> relief_api::Result<Vec<LogRecord>> {
            Ok(vec![LogRecord(json!({"msg": "coordinator online"}))])
        }

        async fn health(&self) -> relief_api::Result<HealthStatus> {
            Ok(HealthStatus {
                status: "ok".into(),
                time: None,
            })
        }

        fn base_url(&self) -> &str {
            "http://fixed.test"
        }
    }

    fn sample_alerts() -> Vec<Alert> {
        vec![
            Alert::new("A1", "flood", "Chennai")
                .with_confidence(0.8)
                .with_severity("high")
                .with_coordinates(13.08, 80.27),
            Alert::new("A2", "quake", "Shimla").with_confidence(0.4),
        ]
    }

    fn test_app(alerts: Vec<Alert>) -> App {
        test_app_with(Arc::new(FixedBackend {
            alerts: Mutex::new(alerts),
        }))
    }

    fn test_app_with(backend: Arc<FixedBackend>) -> App {
        App::with_backend(backend, &ConsoleConfig::default(), Handle::current())
    }

    /// Tick until `done` holds, failing after a second.
    async fn settle(app: &mut App, done: impl Fn(&App) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(1);
        loop {
            app.tick();
            if done(app) {
                return;
            }
            assert!(Instant::now() < deadline, "app did not settle");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Helper to create a test terminal with specified dimensions
    fn test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Helper to render app and get the buffer
    fn render_app(app: &mut App, width: u16, height: u16) -> Buffer {
        let mut terminal = test_terminal(width, height);
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal.backend().buffer().clone()
    }

    /// Check if a buffer contains a specific string
    fn buffer_contains(buffer: &Buffer, text: &str) -> bool {
        buffer_to_string(buffer).contains(text)
    }

    /// Convert buffer to string for searching
    fn buffer_to_string(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut result = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                result.push(buffer[(x, y)].symbol().chars().next().unwrap_or(' '));
            }
            result.push('\n');
        }
        result
    }

    #[tokio::test]
    async fn test_overview_wide_renders_all_panels() {
        let mut app = test_app(vec![]);
        let buffer = render_app(&mut app, 140, 40);

        assert!(buffer_contains(&buffer, "Relief Console - Overview"));
        assert!(buffer_contains(&buffer, "Alerts"));
        assert!(buffer_contains(&buffer, "Map (0 located)"));
        assert!(buffer_contains(&buffer, "Response Plan"));
        assert!(buffer_contains(&buffer, "Logs"));
        assert!(buffer_contains(&buffer, "Loading alerts..."));
    }

    #[tokio::test]
    async fn test_overview_narrow_stacks_without_map() {
        let mut app = test_app(vec![]);
        let buffer = render_app(&mut app, 100, 40);

        assert!(buffer_contains(&buffer, "Alerts"));
        assert!(buffer_contains(&buffer, "Response Plan"));
        assert!(!buffer_contains(&buffer, "located)"));
    }

    #[tokio::test]
    async fn test_alerts_render_after_first_poll() {
        let mut app = test_app(sample_alerts());
        settle(&mut app, |a| a.console().state().alerts().len() == 2).await;

        let buffer = render_app(&mut app, 140, 40);
        assert!(buffer_contains(&buffer, "Total: 2"));
        assert!(buffer_contains(&buffer, "High (72%)"));
        assert!(buffer_contains(&buffer, "flood @ Chennai"));
        assert!(buffer_contains(&buffer, "Map (1 located)"));
    }

    #[tokio::test]
    async fn test_view_switching_via_keys() {
        let mut app = test_app(vec![]);
        assert_eq!(app.current_view(), View::Overview);

        app.handle_key_event(key(KeyCode::Char('m')));
        assert_eq!(app.current_view(), View::Map);
        app.handle_key_event(key(KeyCode::Tab));
        assert_eq!(app.current_view(), View::Plan);
        app.handle_key_event(key(KeyCode::BackTab));
        assert_eq!(app.current_view(), View::Map);

        let buffer = render_app(&mut app, 100, 30);
        assert!(buffer_contains(&buffer, "Relief Console - Map"));
        assert!(buffer_contains(&buffer, "No located alerts"));
    }

    #[tokio::test]
    async fn test_enter_requests_plan_for_selected_alert() {
        let mut app = test_app(sample_alerts());
        settle(&mut app, |a| a.console().state().alerts().len() == 2).await;

        app.handle_key_event(key(KeyCode::Char('j')));
        assert_eq!(app.selected_alert(), 1);
        app.handle_key_event(key(KeyCode::Enter));
        settle(&mut app, |a| a.console().state().plan().is_some()).await;

        let plan = app.console().state().plan().unwrap();
        assert_eq!(plan.alert_id, "A2");

        app.handle_key_event(key(KeyCode::Char('p')));
        let buffer = render_app(&mut app, 100, 30);
        assert!(buffer_contains(&buffer, "Risk: 70%"));
        assert!(buffer_contains(&buffer, "1. evacuate"));
    }

    #[tokio::test]
    async fn test_enter_on_map_uses_selected_marker() {
        let mut app = test_app(sample_alerts());
        settle(&mut app, |a| a.console().state().alerts().len() == 2).await;

        app.handle_key_event(key(KeyCode::Char('m')));
        // Only A1 is located; moving down stays on it.
        app.handle_key_event(key(KeyCode::Char('j')));
        assert_eq!(app.selected_marker(), 0);

        let buffer = render_app(&mut app, 100, 30);
        assert!(buffer_contains(&buffer, "flood - Chennai | Risk: 0.72"));

        app.handle_key_event(key(KeyCode::Enter));
        settle(&mut app, |a| a.console().state().plan().is_some()).await;
        assert_eq!(app.console().state().plan().unwrap().alert_id, "A1");
    }

    #[tokio::test]
    async fn test_failed_plan_shows_notification() {
        let mut app = test_app(vec![Alert::new("missing", "fire", "Nowhere")]);
        settle(&mut app, |a| a.console().state().alerts().len() == 1).await;

        app.handle_key_event(key(KeyCode::Enter));
        settle(&mut app, |a| !a.console().state().notifications().is_empty()).await;

        assert!(app.console().state().plan().is_none());
        let buffer = render_app(&mut app, 140, 40);
        assert!(buffer_contains(&buffer, "Plan request failed"));

        app.handle_key_event(key(KeyCode::Char('x')));
        assert!(app.console().state().notifications().is_empty());
    }

    #[tokio::test]
    async fn test_enter_without_alerts_warns() {
        let mut app = test_app(vec![]);
        app.handle_key_event(key(KeyCode::Enter));
        assert_eq!(app.console().outstanding_plans(), 0);
        let note = app.console().state().notifications().current().unwrap();
        assert_eq!(note.message, "No alert selected");
    }

    #[tokio::test]
    async fn test_help_overlay_toggle() {
        let mut app = test_app(vec![]);
        app.handle_key_event(key(KeyCode::Char('?')));
        assert!(app.show_help());

        let buffer = render_app(&mut app, 100, 40);
        assert!(buffer_contains(&buffer, "Relief Console Hotkey Reference"));

        app.handle_key_event(key(KeyCode::Char('m')));
        assert!(!app.show_help());
        assert_eq!(app.current_view(), View::Overview);
    }

    #[tokio::test]
    async fn test_quit_disposes_console() {
        let mut app = test_app(vec![]);
        app.handle_key_event(key(KeyCode::Char('q')));
        assert!(app.should_quit());
        assert!(app.console().is_disposed());
    }

    #[tokio::test]
    async fn test_refresh_during_fetch_starts_another_quietly() {
        let mut app = test_app(sample_alerts());
        app.tick();
        app.handle_key_event(key(KeyCode::Char('r')));
        app.handle_key_event(key(KeyCode::Char('r')));
        assert!(app.console().state().notifications().current().is_none());

        settle(&mut app, |a| !a.console().has_pending_work()).await;
        assert_eq!(app.console().state().alerts().len(), 2);
        assert!(app.console().state().notifications().current().is_none());
    }

    #[tokio::test]
    async fn test_selection_clamped_when_alerts_shrink() {
        let backend = Arc::new(FixedBackend {
            alerts: Mutex::new(sample_alerts()),
        });
        let mut app = test_app_with(Arc::clone(&backend));
        settle(&mut app, |a| a.console().state().alerts().len() == 2).await;
        app.handle_app_event(AppEvent::GoToBottom);
        assert_eq!(app.selected_alert(), 1);

        *backend.alerts.lock().unwrap() = vec![Alert::new("A9", "fire", "Pune")];
        app.handle_key_event(key(KeyCode::Char('r')));
        settle(&mut app, |a| a.console().state().alerts().len() == 1).await;
        assert_eq!(app.selected_alert(), 0);
    }
}
