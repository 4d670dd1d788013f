//! Event handling for the relief console.
//!
//! Maps keyboard input to application events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::view::View;

/// Application-level events that can trigger state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Switch to a specific view
    SwitchView(View),
    NextView,
    PrevView,
    ShowHelp,
    HideHelp,
    Quit,
    /// Ctrl+C
    ForceQuit,
    /// Manual alert refresh
    Refresh,
    /// Request a plan for the selected alert or marker
    RequestPlan,
    /// Dismiss the current notification
    DismissNotification,
    CycleTheme,
    Cancel,
    NavigateUp,
    NavigateDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    None,
}

/// Converts key events to app events.
#[derive(Debug, Default)]
pub struct InputHandler {
    help_visible: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tell the handler whether the help overlay is showing.
    pub fn set_help_visible(&mut self, visible: bool) {
        self.help_visible = visible;
    }

    /// Handle a key event and return the corresponding app event.
    pub fn handle_key(&mut self, key: KeyEvent) -> AppEvent {
        // Ctrl+C always force quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppEvent::ForceQuit;
        }

        // Any key closes the help overlay
        if self.help_visible {
            return match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => AppEvent::Quit,
                _ => AppEvent::HideHelp,
            };
        }

        match key.code {
            KeyCode::Esc => AppEvent::Cancel,
            KeyCode::Char('q') | KeyCode::Char('Q') => AppEvent::Quit,
            KeyCode::Char('?') | KeyCode::Char('h') => AppEvent::ShowHelp,

            KeyCode::Char('C') => AppEvent::CycleTheme,
            KeyCode::Char('r') | KeyCode::Char('R') => AppEvent::Refresh,
            KeyCode::Char('x') | KeyCode::Char('X') => AppEvent::DismissNotification,
            KeyCode::Enter => AppEvent::RequestPlan,

            KeyCode::Char(c) if View::from_hotkey(c).is_some() => {
                View::from_hotkey(c).map_or(AppEvent::None, AppEvent::SwitchView)
            }

            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    AppEvent::PrevView
                } else {
                    AppEvent::NextView
                }
            }
            KeyCode::BackTab => AppEvent::PrevView,

            KeyCode::Up | KeyCode::Char('k') => AppEvent::NavigateUp,
            KeyCode::Down | KeyCode::Char('j') => AppEvent::NavigateDown,
            KeyCode::PageUp => AppEvent::PageUp,
            KeyCode::PageDown => AppEvent::PageDown,
            KeyCode::Home | KeyCode::Char('g') => AppEvent::GoToTop,
            KeyCode::End | KeyCode::Char('G') => AppEvent::GoToBottom,

            _ => AppEvent::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn key_event_with_mods(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn test_view_hotkeys() {
        let mut handler = InputHandler::new();

        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('o'))),
            AppEvent::SwitchView(View::Overview)
        );
        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('a'))),
            AppEvent::SwitchView(View::Alerts)
        );
        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('m'))),
            AppEvent::SwitchView(View::Map)
        );
        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('p'))),
            AppEvent::SwitchView(View::Plan)
        );
        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('L'))),
            AppEvent::SwitchView(View::Logs)
        );
    }

    #[test]
    fn test_actions() {
        let mut handler = InputHandler::new();

        assert_eq!(handler.handle_key(key_event(KeyCode::Enter)), AppEvent::RequestPlan);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('r'))), AppEvent::Refresh);
        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('x'))),
            AppEvent::DismissNotification
        );
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('C'))), AppEvent::CycleTheme);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('q'))), AppEvent::Quit);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('?'))), AppEvent::ShowHelp);
    }

    #[test]
    fn test_ctrl_c_force_quit() {
        let mut handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppEvent::ForceQuit
        );

        handler.set_help_visible(true);
        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppEvent::ForceQuit
        );
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut handler = InputHandler::new();
        handler.set_help_visible(true);
        assert_eq!(handler.handle_key(key_event(KeyCode::Enter)), AppEvent::HideHelp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('q'))), AppEvent::Quit);
    }

    #[test]
    fn test_tab_cycling() {
        let mut handler = InputHandler::new();

        assert_eq!(handler.handle_key(key_event(KeyCode::Tab)), AppEvent::NextView);
        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Tab, KeyModifiers::SHIFT)),
            AppEvent::PrevView
        );
        assert_eq!(handler.handle_key(key_event(KeyCode::BackTab)), AppEvent::PrevView);
    }

    #[test]
    fn test_navigation_keys() {
        let mut handler = InputHandler::new();

        assert_eq!(handler.handle_key(key_event(KeyCode::Up)), AppEvent::NavigateUp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Down)), AppEvent::NavigateDown);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('j'))), AppEvent::NavigateDown);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('k'))), AppEvent::NavigateUp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('G'))), AppEvent::GoToBottom);
    }
}
