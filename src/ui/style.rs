//! Theming and color definitions.
//!
//! Uses ANSI colors that adapt to the terminal's color palette. A light
//! palette is picked when `COLORFGBG` reports a light background.

use ratatui::style::{Color, Modifier, Style};

/// Theme configuration for the entire application.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Highlighted field in the editable view and tokens in the field view
    pub field: Style,
    /// Field token with keyboard focus
    pub field_focused: Style,
    /// Inline input value
    pub input: Style,
    /// Inline input with keyboard focus
    pub input_focused: Style,
    /// Cursor cell in the editor and in inputs
    pub cursor: Style,
    /// Selected text in the editable view
    pub selection: Style,
    /// Line number gutter
    pub gutter: Style,
    /// Border of the focused pane
    pub border_focused: Style,
    /// Section titles in the panel and help
    pub heading: Style,
    /// Secondary text
    pub dim: Style,
    /// Status bar background
    pub status_bg: Color,
    /// Status bar foreground
    pub status_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            field: Style::default().bg(Color::Yellow).fg(Color::Black),
            field_focused: Style::default()
                .bg(Color::LightYellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            input: Style::default()
                .bg(Color::Indexed(238))
                .fg(Color::White)
                .add_modifier(Modifier::UNDERLINED),
            input_focused: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::UNDERLINED),
            cursor: Style::default().bg(Color::White).fg(Color::Black),
            selection: Style::default().bg(Color::DarkGray).fg(Color::White),
            gutter: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::Yellow),
            heading: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Indexed(245)),
            status_bg: Color::Indexed(236), // Dark gray that works on both
            status_fg: Color::Indexed(252), // Light gray
        }
    }
}

impl Theme {
    /// Create a theme optimized for dark terminals.
    pub fn dark() -> Self {
        Self::default()
    }

    /// Create a theme optimized for light terminals.
    pub fn light() -> Self {
        Self {
            field: Style::default().bg(Color::Indexed(229)).fg(Color::Black),
            field_focused: Style::default()
                .bg(Color::Indexed(220))
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            input: Style::default()
                .bg(Color::Indexed(254))
                .fg(Color::Black)
                .add_modifier(Modifier::UNDERLINED),
            input_focused: Style::default()
                .bg(Color::Indexed(153))
                .fg(Color::Black)
                .add_modifier(Modifier::UNDERLINED),
            cursor: Style::default().bg(Color::Black).fg(Color::White),
            selection: Style::default().bg(Color::Indexed(250)).fg(Color::Black),
            gutter: Style::default().fg(Color::Indexed(245)),
            border_focused: Style::default().fg(Color::Indexed(25)),
            heading: Style::default()
                .fg(Color::Indexed(136)) // Darker yellow/olive
                .add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Indexed(240)),
            status_bg: Color::Indexed(252),
            status_fg: Color::Indexed(235),
        }
    }

    /// Pick a palette for the running terminal.
    pub fn detect() -> Self {
        if is_light_background_from_env(std::env::var("COLORFGBG").ok().as_deref()) {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub const fn status(&self) -> Style {
        Style::new().bg(self.status_bg).fg(self.status_fg)
    }
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;x;bg`); backgrounds 7 and 9-15 are
/// light.
fn is_light_background_from_env(colorfgbg: Option<&str>) -> bool {
    let Some(bg) = colorfgbg.and_then(|value| value.rsplit(';').next()) else {
        return false;
    };
    matches!(bg.trim().parse::<u8>(), Ok(7 | 9..=15))
}
