//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme — change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── page faces ─────────────────────────────────────────────
    pub fn page_style() -> Style {
        Style::default().bg(Color::White).fg(Color::Black)
    }

    /// Rigid covers and sheets hardened for the current turn.
    pub fn hard_page_style() -> Style {
        Style::default()
            .bg(Color::LightYellow)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }

    /// Shading on the spine-side column of each page.
    pub fn page_edge_style() -> Style {
        Style::default().bg(Color::Gray).fg(Color::DarkGray)
    }

    pub fn page_title_style() -> Style {
        Style::default()
            .bg(Color::White)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }

    pub fn page_number_style() -> Style {
        Style::default().bg(Color::White).fg(Color::DarkGray)
    }

    // ── the turning sheet ──────────────────────────────────────
    /// Back face of a sheet mid-curl.
    pub fn sheet_back_style() -> Style {
        Style::default().bg(Color::Gray).fg(Color::DarkGray)
    }

    /// Crease and outline of the curling sheet.
    pub fn sheet_edge_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::Gray)
    }

    /// Band of shade the fold throws on the sheet beneath.
    pub fn shadow_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::Black)
    }

    pub fn shadow_soft_style() -> Style {
        Style::default().bg(Color::Gray).fg(Color::Black)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}
