//! View types and navigation for the relief console.

use std::fmt;

/// Available views.
///
/// Views can be switched using hotkeys or the Tab key to cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Map, alerts, plan and logs together
    #[default]
    Overview,
    /// Full-height alert list
    Alerts,
    /// Full-size map
    Map,
    /// Selected plan detail
    Plan,
    /// Coordinator log stream
    Logs,
}

impl View {
    /// Returns the hotkey character for this view.
    pub fn hotkey(&self) -> char {
        match self {
            View::Overview => 'o',
            View::Alerts => 'a',
            View::Map => 'm',
            View::Plan => 'p',
            View::Logs => 'l',
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Alerts => "Alerts",
            View::Map => "Map",
            View::Plan => "Plan",
            View::Logs => "Logs",
        }
    }

    /// Returns the hotkey hint for status bar display.
    pub fn hotkey_hint(&self) -> String {
        format!("[{}] {}", self.hotkey(), self.title())
    }

    /// All views in display order (for Tab cycling).
    pub const ALL: [View; 5] = [View::Overview, View::Alerts, View::Map, View::Plan, View::Logs];

    /// Returns the next view in the cycle.
    pub fn next(&self) -> View {
        let idx = Self::ALL.iter().position(|v| v == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Returns the previous view in the cycle.
    pub fn prev(&self) -> View {
        let idx = Self::ALL.iter().position(|v| v == self).unwrap_or(0);
        if idx == 0 {
            Self::ALL[Self::ALL.len() - 1]
        } else {
            Self::ALL[idx - 1]
        }
    }

    /// Try to parse a view from a hotkey character.
    pub fn from_hotkey(key: char) -> Option<View> {
        Self::ALL
            .into_iter()
            .find(|v| v.hotkey() == key.to_ascii_lowercase())
    }

    /// Where list navigation (j/k) and Enter apply in this view.
    pub fn selection_target(&self) -> SelectionTarget {
        match self {
            View::Overview | View::Alerts => SelectionTarget::AlertList,
            View::Map => SelectionTarget::MapMarkers,
            View::Plan | View::Logs => SelectionTarget::Scroll,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// What navigation keys move in the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    /// Move through alerts in feed order
    AlertList,
    /// Move through located alerts
    MapMarkers,
    /// Scroll the panel
    Scroll,
}

/// Layout mode based on terminal dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// 120+ cols: overview shows a 2x2 grid
    Wide,
    /// Below 120 cols: overview stacks alerts over plan
    Narrow,
}

impl LayoutMode {
    pub fn from_width(width: u16) -> Self {
        if width >= 120 {
            LayoutMode::Wide
        } else {
            LayoutMode::Narrow
        }
    }

    /// Get the minimum terminal height for this layout mode.
    pub fn min_height(&self) -> u16 {
        match self {
            LayoutMode::Wide => 30,
            LayoutMode::Narrow => 20,
        }
    }
}
