//! Color theme and styling for the player TUI.

use ratatui::style::{Color, Modifier, Style};

/// UI color theme.
#[derive(Debug, Clone)]
pub struct Theme {
    pub foreground: Color,
    pub border: Color,
    pub accent: Color,

    pub narration_text: Color,
    pub dialogue_text: Color,
    pub system_text: Color,

    pub menu_selected: Color,
    pub menu_disabled: Color,

    pub stage_background: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            accent: Color::Magenta,

            narration_text: Color::Gray,
            dialogue_text: Color::White,
            system_text: Color::DarkGray,

            menu_selected: Color::Yellow,
            menu_disabled: Color::DarkGray,

            stage_background: Color::Blue,
        }
    }
}

impl Theme {
    /// Style for narration lines.
    pub fn narration_style(&self) -> Style {
        Style::default()
            .fg(self.narration_text)
            .add_modifier(Modifier::ITALIC)
    }

    /// Style for spoken dialogue.
    pub fn dialogue_style(&self) -> Style {
        Style::default().fg(self.dialogue_text)
    }

    /// Style for system messages in the status line.
    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    /// Style for borders.
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Style for a menu entry.
    pub fn menu_style(&self, selected: bool, enabled: bool) -> Style {
        if !enabled {
            Style::default()
                .fg(self.menu_disabled)
                .add_modifier(Modifier::DIM)
        } else if selected {
            Style::default()
                .fg(self.menu_selected)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.foreground)
        }
    }
}

/// Parse a `#rrggbb` character color into a terminal color.
///
/// Anything unparseable renders with the default foreground.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_hex_colors() {
        assert_eq!(parse_hex_color("#4a90e2"), Some(Color::Rgb(0x4a, 0x90, 0xe2)));
        assert_eq!(parse_hex_color("#ffffff"), Some(Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn rejects_malformed_colors() {
        assert_eq!(parse_hex_color("4a90e2"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }
}
