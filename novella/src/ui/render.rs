//! Render orchestration for the player TUI.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use novella_core::EngineStatus;

use crate::app::{App, Overlay, Screen, MENU_ITEMS, PAUSE_ITEMS, SETTINGS_ROWS};
use crate::ui::widgets::{ChoiceMenuWidget, DialogueWidget, StageWidget};

/// Main render function.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    match app.screen {
        Screen::MainMenu => render_main_menu(frame, app, area),
        Screen::Playing => render_playing(frame, app, area),
    }

    if let Some(overlay) = app.overlay() {
        render_overlay(frame, app, overlay, area);
    }
}

// ============================================================================
// Main menu
// ============================================================================

fn render_main_menu(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style());
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "N O V E L L A",
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(""),
    ];

    for (i, item) in MENU_ITEMS.iter().enumerate() {
        let enabled = *item != "Continue" || app.has_save;
        let marker = if i == app.menu_selected { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{marker}{item}"),
            app.theme.menu_style(i == app.menu_selected, enabled),
        )));
        lines.push(Line::from(""));
    }

    let menu = centered_rect(area, 40, (lines.len() + 2) as u16);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        menu,
    );

    render_status_line(frame, app, bottom_line(area));
}

// ============================================================================
// Playing screen
// ============================================================================

fn render_playing(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.engine.state();
    let has_choices = !state.current_choices.is_empty();

    let choice_height = if has_choices {
        state.current_choices.len() as u16 + 2
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // title bar
            Constraint::Min(5),                // stage
            Constraint::Length(choice_height), // choices, if any
            Constraint::Length(6),             // dialogue box
            Constraint::Length(1),             // status line
        ])
        .split(area);

    render_title_bar(frame, app, chunks[0]);

    let characters: Vec<_> = state
        .characters
        .iter()
        .map(|id| app.engine.character_display(id))
        .collect();
    frame.render_widget(
        StageWidget::new(&state.background, characters, &app.theme),
        chunks[1],
    );

    if has_choices {
        frame.render_widget(
            ChoiceMenuWidget::new(&state.current_choices, app.choice_selected, &app.theme),
            chunks[2],
        );
    }

    let speaker = app.engine.character_display(&state.current_speaker);
    let visible = app.visible_dialogue();
    frame.render_widget(
        DialogueWidget::new(&state.current_speaker, &speaker, &visible, &app.theme),
        chunks[3],
    );

    render_status_line(frame, app, chunks[4]);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = app
        .engine
        .scene()
        .map(|scene| scene.title.clone())
        .unwrap_or_default();
    let progress = app.engine.scene_progress();

    let line = Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("({}/{})", progress.current, progress.total),
            app.theme.system_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.status_message() {
        Some(message) => message.to_string(),
        None => match app.screen {
            Screen::MainMenu => "j/k move | Enter select | q quit".to_string(),
            Screen::Playing => {
                if app.engine.status() == EngineStatus::Ended {
                    "The End | Esc menu".to_string()
                } else {
                    "Space advance | Esc pause | s save | l load".to_string()
                }
            }
        },
    };

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(text, app.theme.system_style()))),
        area,
    );
}

// ============================================================================
// Overlays
// ============================================================================

fn render_overlay(frame: &mut Frame, app: &App, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::Pause { selected } => render_pause(frame, app, *selected, area),
        Overlay::Settings { selected } => render_settings(frame, app, *selected, area),
    }
}

fn render_pause(frame: &mut Frame, app: &App, selected: usize, area: Rect) {
    let popup = centered_rect(area, 30, PAUSE_ITEMS.len() as u16 + 4);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Paused ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines: Vec<Line> = PAUSE_ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let marker = if i == selected { "> " } else { "  " };
            Line::from(Span::styled(
                format!("{marker}{item}"),
                app.theme.menu_style(i == selected, true),
            ))
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

fn render_settings(frame: &mut Frame, app: &App, selected: usize, area: Rect) {
    let popup = centered_rect(area, 44, SETTINGS_ROWS.len() as u16 + 5);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Settings [h/l adjust, Esc done] ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let settings = app
        .settings_draft
        .clone()
        .unwrap_or_else(|| app.engine.state().settings.clone());

    let values = [
        format!("{:>3.0}%", settings.volume.master * 100.0),
        format!("{:>3.0}%", settings.volume.music * 100.0),
        format!("{:>3.0}%", settings.volume.sfx * 100.0),
        if settings.display.fullscreen { "on" } else { "off" }.to_string(),
        settings.display.text_speed.to_string(),
    ];

    let lines: Vec<Line> = SETTINGS_ROWS
        .iter()
        .zip(values.iter())
        .enumerate()
        .map(|(i, (label, value))| {
            let marker = if i == selected { "> " } else { "  " };
            Line::from(Span::styled(
                format!("{marker}{label:<14} {value}"),
                app.theme.menu_style(i == selected, true),
            ))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

// ============================================================================
// Layout helpers
// ============================================================================

/// A fixed-size rect centered in `area`, clamped to fit.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// The bottom row of `area`.
fn bottom_line(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + area.height.saturating_sub(2),
        width: area.width.saturating_sub(2),
        height: 1,
    }
}
