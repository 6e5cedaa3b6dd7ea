//! Colour schemes and shared styles for the TUI.
//!
//! The active [`Theme`] is owned by the `App` and handed to every render
//! function, so views never read global state.

use crate::matrix::CellTone;
use ratatui::prelude::*;

/// Semantic colours for UI elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub primary: Color,
    pub accent: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,
    pub background_alt: Color,
    pub text: Color,
    pub text_muted: Color,
    pub selection: Color,
    pub selection_bg: Color,
    pub highlight: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,

    /// Text on coloured badges
    pub badge_fg: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl ColorScheme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            primary: Color::Cyan,
            accent: Color::Yellow,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            background_alt: Color::Rgb(30, 30, 40),
            text: Color::White,
            text_muted: Color::Gray,
            selection: Color::DarkGray,
            selection_bg: Color::Rgb(60, 60, 80),
            highlight: Color::Yellow,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            badge_fg: Color::Black,
        }
    }

    pub fn light() -> Self {
        Self {
            primary: Color::Rgb(0, 90, 160),
            accent: Color::Rgb(180, 110, 0),
            muted: Color::Rgb(140, 140, 140),
            border: Color::Rgb(170, 170, 170),
            border_focused: Color::Rgb(0, 90, 160),
            background_alt: Color::Rgb(230, 230, 235),
            text: Color::Black,
            text_muted: Color::Rgb(90, 90, 90),
            selection: Color::Rgb(200, 200, 210),
            selection_bg: Color::Rgb(200, 215, 235),
            highlight: Color::Rgb(180, 110, 0),
            success: Color::Rgb(0, 128, 0),
            warning: Color::Rgb(180, 140, 0),
            error: Color::Rgb(200, 0, 0),
            badge_fg: Color::White,
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            primary: Color::LightCyan,
            accent: Color::LightYellow,
            muted: Color::Gray,
            border: Color::White,
            border_focused: Color::LightCyan,
            background_alt: Color::Rgb(20, 20, 20),
            text: Color::White,
            text_muted: Color::Gray,
            selection: Color::White,
            selection_bg: Color::Rgb(50, 50, 80),
            highlight: Color::LightYellow,
            success: Color::LightGreen,
            warning: Color::LightYellow,
            error: Color::LightRed,
            badge_fg: Color::Black,
        }
    }

    /// Colour of a matrix cell or detail line tone.
    pub fn tone(&self, tone: CellTone) -> Color {
        match tone {
            CellTone::Muted => self.muted,
            CellTone::Accent => self.accent,
            CellTone::Success => self.success,
            CellTone::Warning => self.warning,
            CellTone::Error => self.error,
        }
    }

    // Style presets

    pub fn title(&self) -> Style {
        Style::default().fg(self.primary).bold()
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn label(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn selected(&self) -> Style {
        Style::default().bg(self.selection_bg).fg(self.text).bold()
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn status_bar(&self) -> Style {
        Style::default().bg(self.background_alt)
    }

    pub fn shortcut_key(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn shortcut_desc(&self) -> Style {
        Style::default().fg(self.text_muted)
    }
}

/// A named colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub colors: ColorScheme,
    pub name: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            colors: ColorScheme::dark(),
            name: "dark",
        }
    }

    pub fn light() -> Self {
        Self {
            colors: ColorScheme::light(),
            name: "light",
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            colors: ColorScheme::high_contrast(),
            name: "high-contrast",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => Self::light(),
            "high-contrast" | "highcontrast" | "hc" => Self::high_contrast(),
            _ => Self::dark(),
        }
    }

    /// Get the next theme in the rotation
    pub fn next(&self) -> Self {
        match self.name {
            "dark" => Self::light(),
            "light" => Self::high_contrast(),
            _ => Self::dark(),
        }
    }
}

/// `label: value` badge for the filter bar.
pub fn filter_badge(scheme: &ColorScheme, label: &str, value: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!("{label}: "), scheme.muted_style()),
        Span::styled(
            format!(" {value} "),
            Style::default()
                .fg(scheme.badge_fg)
                .bg(scheme.accent)
                .bold(),
        ),
    ]
}

/// Footer key hints as spans.
pub fn render_footer_hints(scheme: &ColorScheme, hints: &[(&str, &str)]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(format!("[{key}]"), scheme.shortcut_key()));
        spans.push(Span::styled((*desc).to_string(), scheme.shortcut_desc()));
    }
    spans
}
