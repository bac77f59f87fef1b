//! Choice menu widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use novella_core::Choice;

use crate::ui::theme::Theme;

/// Numbered list of pending choices.
pub struct ChoiceMenuWidget<'a> {
    choices: &'a [Choice],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> ChoiceMenuWidget<'a> {
    pub fn new(choices: &'a [Choice], selected: usize, theme: &'a Theme) -> Self {
        Self {
            choices,
            selected,
            theme,
        }
    }
}

impl Widget for ChoiceMenuWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Choice [1-9 or j/k + Enter] ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self
            .choices
            .iter()
            .enumerate()
            .map(|(i, choice)| {
                let marker = if i == self.selected { "> " } else { "  " };
                Line::from(Span::styled(
                    format!("{marker}{}. {}", i + 1, choice.text),
                    self.theme.menu_style(i == self.selected, true),
                ))
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}
