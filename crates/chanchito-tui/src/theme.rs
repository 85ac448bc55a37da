//! Colors shared by every screen
//!
//! - Magenta: brand accent (titles, active sidebar entry)
//! - Cyan: focus (selected row, active input)
//! - Green / Yellow / Red: success, warning, error

use ratatui::style::{Color, Modifier, Style};

pub struct Palette;

impl Palette {
    pub const ACCENT: Color = Color::Magenta;
    pub const FG: Color = Color::White;
    pub const MUTED: Color = Color::DarkGray;
    pub const FOCUS: Color = Color::Cyan;
    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;
}

pub fn title() -> Style {
    Style::default()
        .fg(Palette::ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(Palette::MUTED)
}

/// Highlight for the selected row of a list or table
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Palette::FOCUS)
        .add_modifier(Modifier::BOLD)
}

pub fn border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Palette::FOCUS)
    } else {
        Style::default().fg(Palette::MUTED)
    }
}

/// Key hint as rendered in status bars: `[key] action`
pub fn key_hint() -> Style {
    Style::default()
        .fg(Palette::FOCUS)
        .add_modifier(Modifier::BOLD)
}
