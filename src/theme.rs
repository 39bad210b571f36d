//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette: semantic roles to Style
// ============================================================================

/// A complete color palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Page chrome --
    pub header_title: Style,
    pub header_subtitle: Style,
    pub footer: Style,
    pub status_bar: Style,

    // -- Cards --
    pub card_border: Style,
    pub card_border_selected: Style,
    pub card_title: Style,
    pub card_body: Style,
    pub card_image: Style,
    pub card_credits: Style,
    pub card_toggle: Style,

    // -- Overlays --
    pub overlay_backdrop: Style,
    pub overlay_border: Style,
    pub overlay_image: Style,
    pub overlay_close: Style,
    pub help_heading: Style,
    pub help_body: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            header_title: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            header_subtitle: Style::default().fg(Color::Gray),
            footer: Style::default().fg(Color::DarkGray),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),

            card_border: Style::default().fg(Color::DarkGray),
            card_border_selected: Style::default().fg(Color::Cyan),
            card_title: Style::default().add_modifier(Modifier::BOLD),
            card_body: Style::default(),
            card_image: Style::default().fg(Color::Blue),
            card_credits: Style::default().fg(Color::DarkGray),
            card_toggle: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED),

            overlay_backdrop: Style::default().bg(Color::Black).fg(Color::DarkGray),
            overlay_border: Style::default().fg(Color::Gray),
            overlay_image: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            overlay_close: Style::default().bg(Color::DarkGray).fg(Color::White),
            help_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            help_body: Style::default(),
        }
    }

    fn light() -> Self {
        Self {
            header_title: Style::default()
                .fg(Color::Indexed(54))
                .add_modifier(Modifier::BOLD),
            header_subtitle: Style::default().fg(Color::Black),
            footer: Style::default().fg(Color::DarkGray),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),

            card_border: Style::default().fg(Color::Gray),
            card_border_selected: Style::default().fg(Color::Blue),
            card_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            card_body: Style::default().fg(Color::Black),
            card_image: Style::default().fg(Color::Blue),
            card_credits: Style::default().fg(Color::DarkGray),
            card_toggle: Style::default()
                .fg(Color::Indexed(61))
                .add_modifier(Modifier::UNDERLINED),

            overlay_backdrop: Style::default().bg(Color::DarkGray).fg(Color::Gray),
            overlay_border: Style::default().fg(Color::White),
            overlay_image: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            overlay_close: Style::default().bg(Color::Black).fg(Color::White),
            help_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            help_body: Style::default().fg(Color::Black),
        }
    }
}

// ============================================================================
// Style Map: string-keyed lookup
// ============================================================================

/// String-keyed style lookup, resolving role names (e.g. `"card_title"`) to
/// their concrete `Style` at render time.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 17] = [
    "header_title",
    "header_subtitle",
    "footer",
    "status_bar",
    "card_border",
    "card_border_selected",
    "card_title",
    "card_body",
    "card_image",
    "card_credits",
    "card_toggle",
    "overlay_backdrop",
    "overlay_border",
    "overlay_image",
    "overlay_close",
    "help_heading",
    "help_body",
];

impl StyleMap {
    /// Build a `StyleMap` from a `ColorPalette`.
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 17] = [
            p.header_title,
            p.header_subtitle,
            p.footer,
            p.status_bar,
            p.card_border,
            p.card_border_selected,
            p.card_title,
            p.card_body,
            p.card_image,
            p.card_credits,
            p.card_toggle,
            p.overlay_backdrop,
            p.overlay_border,
            p.overlay_image,
            p.overlay_close,
            p.help_heading,
            p.help_body,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_selected_card_border_is_cyan() {
        let palette = ThemeVariant::Dark.palette();
        assert_eq!(
            palette.card_border_selected,
            Style::default().fg(Color::Cyan)
        );
    }

    #[test]
    fn dark_status_bar() {
        let palette = ThemeVariant::Dark.palette();
        assert_eq!(
            palette.status_bar,
            Style::default().bg(Color::DarkGray).fg(Color::White)
        );
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.card_border_selected, light.card_border_selected);
        assert_ne!(dark.status_bar, light.status_bar);
    }

    #[test]
    fn variant_from_str_name() {
        assert_eq!(
            ThemeVariant::from_str_name("dark"),
            Some(ThemeVariant::Dark)
        );
        assert_eq!(
            ThemeVariant::from_str_name("Light"),
            Some(ThemeVariant::Light)
        );
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn variant_cycles() {
        assert_eq!(ThemeVariant::Dark.next(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Light.next().name(), "Dark");
    }

    #[test]
    fn style_map_resolves_known_roles() {
        let palette = ThemeVariant::Dark.palette();
        let sm = StyleMap::from_palette(&palette);
        assert_eq!(sm.resolve("card_title"), palette.card_title);
        assert_eq!(sm.resolve("overlay_close"), palette.overlay_close);
        assert_eq!(sm.resolve("nonexistent_role"), Style::default());
    }

    #[test]
    fn style_map_has_all_roles() {
        let sm = StyleMap::from_palette(&ThemeVariant::Light.palette());
        assert_eq!(sm.map.len(), ROLE_NAMES.len());
        for name in ROLE_NAMES {
            assert!(sm.map.contains_key(name), "Role '{}' missing", name);
        }
    }
}
