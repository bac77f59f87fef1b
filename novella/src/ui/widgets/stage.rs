//! Stage widget: the current background and the characters on it.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use novella_core::CharacterData;

use crate::ui::theme::{parse_hex_color, Theme};

/// Renders the scene backdrop as text: the background ref centered, the
/// staged characters spread beneath it in their metadata colors.
pub struct StageWidget<'a> {
    background: &'a str,
    characters: Vec<CharacterData>,
    theme: &'a Theme,
}

impl<'a> StageWidget<'a> {
    pub fn new(background: &'a str, characters: Vec<CharacterData>, theme: &'a Theme) -> Self {
        Self {
            background,
            characters,
            theme,
        }
    }
}

impl Widget for StageWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Stage ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();

        let backdrop = if self.background.is_empty() {
            "(no background)".to_string()
        } else {
            format!("[ {} ]", self.background)
        };
        lines.push(Line::from(Span::styled(
            backdrop,
            Style::default()
                .fg(self.theme.stage_background)
                .add_modifier(Modifier::DIM),
        )));
        lines.push(Line::from(""));

        if !self.characters.is_empty() {
            let mut spans: Vec<Span> = Vec::new();
            for (i, character) in self.characters.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw("    "));
                }
                let color = parse_hex_color(&character.color)
                    .unwrap_or(self.theme.foreground);
                spans.push(Span::styled(
                    character.name.clone(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ));
            }
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}
