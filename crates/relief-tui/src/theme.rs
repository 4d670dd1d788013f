//! Theme system for the relief console.
//!
//! Themes are picked from `theme` in the console config and can be cycled at
//! runtime with `C`. The choice is not written back anywhere.

use ratatui::style::Color;
use relief_core::RiskTier;

/// Theme name identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    #[default]
    Default,
    /// Enhanced contrast on dark terminals
    Dark,
    /// For bright environments (control rooms, daylight)
    Light,
    /// Maximum contrast, no mid-tones
    HighContrast,
}

impl ThemeName {
    /// All available themes in cycle order.
    pub fn all() -> &'static [ThemeName] {
        &[
            ThemeName::Default,
            ThemeName::Dark,
            ThemeName::Light,
            ThemeName::HighContrast,
        ]
    }

    /// Get the next theme in the cycle.
    pub fn next(&self) -> ThemeName {
        let themes = Self::all();
        let current_idx = themes.iter().position(|t| t == self).unwrap_or(0);
        themes[(current_idx + 1) % themes.len()]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeName::Default => "Default",
            ThemeName::Dark => "Dark",
            ThemeName::Light => "Light",
            ThemeName::HighContrast => "High Contrast",
        }
    }

    /// Parse a theme name (case-insensitive, `-`/`_` interchangeable).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "default" => Some(ThemeName::Default),
            "dark" => Some(ThemeName::Dark),
            "light" => Some(ThemeName::Light),
            "high_contrast" => Some(ThemeName::HighContrast),
            _ => None,
        }
    }
}

/// Color palette for a theme.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    /// Primary headers and focused borders
    pub header: Color,
    /// Hotkey hints
    pub hotkey: Color,
    pub text: Color,
    /// Secondary text (timestamps, dim info)
    pub text_dim: Color,
    /// Unfocused borders
    pub border_dim: Color,
    /// Focused panel borders/titles
    pub focus_highlight: Color,
    /// Selected list row background
    pub selection_bg: Color,
    pub status_ok: Color,
    pub status_warning: Color,
    pub status_error: Color,
    /// Risk tiers, lowest to highest
    pub risk_low: Color,
    pub risk_medium: Color,
    pub risk_high: Color,
    pub risk_critical: Color,
    /// Coastlines on the map
    pub map_land: Color,
}

/// Complete theme definition.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub colors: ThemeColors,
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            name: ThemeName::Default,
            colors: ThemeColors {
                header: Color::Cyan,
                hotkey: Color::Yellow,
                text: Color::White,
                text_dim: Color::Gray,
                border_dim: Color::DarkGray,
                focus_highlight: Color::Cyan,
                selection_bg: Color::Rgb(40, 40, 60),
                status_ok: Color::Green,
                status_warning: Color::Yellow,
                status_error: Color::Red,
                risk_low: Color::Green,
                risk_medium: Color::Yellow,
                risk_high: Color::Rgb(255, 140, 0),
                risk_critical: Color::Red,
                map_land: Color::DarkGray,
            },
        }
    }

    pub fn dark_theme() -> Self {
        Self {
            name: ThemeName::Dark,
            colors: ThemeColors {
                header: Color::LightBlue,
                hotkey: Color::LightYellow,
                text: Color::White,
                text_dim: Color::DarkGray,
                border_dim: Color::Black,
                focus_highlight: Color::LightYellow,
                selection_bg: Color::Rgb(30, 30, 30),
                status_ok: Color::LightGreen,
                status_warning: Color::LightYellow,
                status_error: Color::LightRed,
                risk_low: Color::LightGreen,
                risk_medium: Color::LightYellow,
                risk_high: Color::Rgb(255, 165, 0),
                risk_critical: Color::LightRed,
                map_land: Color::Rgb(70, 70, 70),
            },
        }
    }

    pub fn light_theme() -> Self {
        Self {
            name: ThemeName::Light,
            colors: ThemeColors {
                header: Color::Blue,
                hotkey: Color::DarkGray,
                text: Color::Black,
                text_dim: Color::DarkGray,
                border_dim: Color::Gray,
                focus_highlight: Color::Rgb(0, 100, 255),
                selection_bg: Color::Rgb(210, 220, 240),
                status_ok: Color::Green,
                status_warning: Color::Rgb(180, 120, 0),
                status_error: Color::Red,
                risk_low: Color::Green,
                risk_medium: Color::Rgb(180, 120, 0),
                risk_high: Color::Rgb(220, 90, 0),
                risk_critical: Color::Red,
                map_land: Color::Gray,
            },
        }
    }

    pub fn high_contrast_theme() -> Self {
        Self {
            name: ThemeName::HighContrast,
            colors: ThemeColors {
                header: Color::White,
                hotkey: Color::LightCyan,
                text: Color::White,
                text_dim: Color::White,
                border_dim: Color::White,
                focus_highlight: Color::LightYellow,
                selection_bg: Color::Blue,
                status_ok: Color::LightGreen,
                status_warning: Color::LightYellow,
                status_error: Color::LightRed,
                risk_low: Color::LightGreen,
                risk_medium: Color::LightYellow,
                risk_high: Color::LightMagenta,
                risk_critical: Color::LightRed,
                map_land: Color::Gray,
            },
        }
    }

    /// Get a theme by name.
    pub fn by_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Default => Self::default_theme(),
            ThemeName::Dark => Self::dark_theme(),
            ThemeName::Light => Self::light_theme(),
            ThemeName::HighContrast => Self::high_contrast_theme(),
        }
    }

    /// Color for a risk tier.
    pub fn risk_color(&self, tier: RiskTier) -> Color {
        match tier {
            RiskTier::Low => self.colors.risk_low,
            RiskTier::Medium => self.colors.risk_medium,
            RiskTier::High => self.colors.risk_high,
            RiskTier::Critical => self.colors.risk_critical,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

/// Holds the active theme.
#[derive(Debug, Default)]
pub struct ThemeManager {
    current: Theme,
}

impl ThemeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a configured theme name; unknown names fall back to default.
    pub fn from_config(name: Option<&str>) -> Self {
        let theme_name = match name {
            Some(raw) => ThemeName::parse(raw).unwrap_or_else(|| {
                tracing::warn!(theme = raw, "Unknown theme, using default");
                ThemeName::Default
            }),
            None => ThemeName::Default,
        };
        Self {
            current: Theme::by_name(theme_name),
        }
    }

    pub fn current(&self) -> &Theme {
        &self.current
    }

    /// Switch to the next theme in the cycle.
    pub fn cycle_theme(&mut self) -> ThemeName {
        let next_name = self.current.name.next();
        self.current = Theme::by_name(next_name);
        next_name
    }

    pub fn theme_name(&self) -> ThemeName {
        self.current.name
    }
}
