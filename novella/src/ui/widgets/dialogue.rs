//! Dialogue box widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use novella_core::{CharacterData, NARRATOR};

use crate::ui::theme::{parse_hex_color, Theme};

/// The text box at the bottom of the playing screen.
///
/// Narration renders without a speaker label; spoken lines carry the
/// speaker's display name in their metadata color.
pub struct DialogueWidget<'a> {
    speaker_id: &'a str,
    speaker: &'a CharacterData,
    text: &'a str,
    theme: &'a Theme,
}

impl<'a> DialogueWidget<'a> {
    pub fn new(
        speaker_id: &'a str,
        speaker: &'a CharacterData,
        text: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            speaker_id,
            speaker,
            text,
            theme,
        }
    }

    fn is_narration(&self) -> bool {
        self.speaker_id.is_empty() || self.speaker_id == NARRATOR
    }
}

impl Widget for DialogueWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style());
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();

        if self.is_narration() {
            for line in self.text.lines() {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    self.theme.narration_style(),
                )));
            }
            if self.text.is_empty() {
                lines.push(Line::from(""));
            }
        } else {
            let color =
                parse_hex_color(&self.speaker.color).unwrap_or(self.theme.foreground);
            lines.push(Line::from(Span::styled(
                self.speaker.name.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for line in self.text.lines() {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    self.theme.dialogue_style(),
                )));
            }
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
