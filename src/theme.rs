//! Theme system for the TUI.
//!
//! Semantic color roles map to ratatui `Style` values. `ThemeVariant`
//! selects the Dark or Light palette and `StyleMap` resolves role names.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Header --
    pub header_title: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub header_user: Style,
    pub search_box: Style,

    // -- Card --
    pub card_border: Style,
    pub card_title: Style,
    pub card_body: Style,
    pub card_meta: Style,
    pub card_saved: Style,
    pub card_hint: Style,

    // -- Saved library --
    pub saved_title: Style,
    pub saved_selected: Style,
    pub saved_summary: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub status_error: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub help_heading: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            header_title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            header_user: Style::default().fg(Color::Green),
            search_box: Style::default().fg(Color::Yellow),

            card_border: Style::default().fg(Color::DarkGray),
            card_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            card_body: Style::default(),
            card_meta: Style::default().fg(Color::DarkGray),
            card_saved: Style::default().fg(Color::Red),
            card_hint: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),

            saved_title: Style::default().add_modifier(Modifier::BOLD),
            saved_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            saved_summary: Style::default().fg(Color::Gray),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_error: Style::default().bg(Color::Red).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            help_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        }
    }

    fn light() -> Self {
        Self {
            header_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            header_user: Style::default().fg(Color::Green),
            search_box: Style::default().fg(Color::Magenta),

            card_border: Style::default().fg(Color::Gray),
            card_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            card_body: Style::default().fg(Color::Black),
            card_meta: Style::default().fg(Color::DarkGray),
            card_saved: Style::default().fg(Color::Red),
            card_hint: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),

            saved_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            saved_selected: Style::default().bg(Color::Blue).fg(Color::White),
            saved_summary: Style::default().fg(Color::DarkGray),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_error: Style::default().bg(Color::Red).fg(Color::White),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            help_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup, built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

const ROLE_NAMES: [&str; 19] = [
    "header_title",
    "tab_active",
    "tab_inactive",
    "header_user",
    "search_box",
    "card_border",
    "card_title",
    "card_body",
    "card_meta",
    "card_saved",
    "card_hint",
    "saved_title",
    "saved_selected",
    "saved_summary",
    "status_bar",
    "status_error",
    "panel_border",
    "panel_border_focused",
    "help_heading",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 19] = [
            p.header_title,
            p.tab_active,
            p.tab_inactive,
            p.header_user,
            p.search_box,
            p.card_border,
            p.card_title,
            p.card_body,
            p.card_meta,
            p.card_saved,
            p.card_hint,
            p.saved_title,
            p.saved_selected,
            p.saved_summary,
            p.status_bar,
            p.status_error,
            p.panel_border,
            p.panel_border_focused,
            p.help_heading,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name. Unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}
