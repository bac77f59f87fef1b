//! Input handling for the player TUI.
//!
//! Key events map to `AppAction`s; anything that touches the engine is
//! returned to the main loop, which performs it asynchronously. Pure UI
//! moves (selection changes, typewriter skip) mutate the app directly.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use novella_core::Settings;

use crate::app::{App, Overlay, Screen, MENU_ITEMS, PAUSE_ITEMS};

/// Engine-touching work requested by an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    None,
    Quit,
    StartNewGame,
    ContinueGame,
    Advance,
    Choose(String),
    Pause,
    Resume,
    Save,
    Load,
    ApplySettings(Settings),
    BackToMenu,
}

/// Handle a terminal event.
pub fn handle_event(app: &mut App, event: Event) -> AppAction {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        _ => AppAction::None,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> AppAction {
    // Ctrl-C always quits.
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return AppAction::Quit;
    }

    if app.overlay().is_some() {
        return handle_overlay_key(app, key);
    }

    match app.screen {
        Screen::MainMenu => handle_menu_key(app, key),
        Screen::Playing => handle_playing_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) -> AppAction {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.menu_move(false);
            AppAction::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.menu_move(true);
            AppAction::None
        }
        KeyCode::Enter => match MENU_ITEMS[app.menu_selected] {
            "New Game" => AppAction::StartNewGame,
            "Continue" => {
                if app.has_save {
                    AppAction::ContinueGame
                } else {
                    app.set_status("No save file found");
                    AppAction::None
                }
            }
            _ => AppAction::Quit,
        },
        KeyCode::Char('q') => AppAction::Quit,
        _ => AppAction::None,
    }
}

fn handle_playing_key(app: &mut App, key: KeyEvent) -> AppAction {
    let has_choices = !app.engine.state().current_choices.is_empty();

    match key.code {
        KeyCode::Esc => {
            app.open_pause();
            AppAction::Pause
        }

        // Advance, pick the highlighted choice, or finish the typewriter.
        KeyCode::Char(' ') | KeyCode::Enter => {
            if !app.reveal_complete() {
                app.complete_reveal();
                AppAction::None
            } else if has_choices {
                match app.selected_choice_id() {
                    Some(id) => AppAction::Choose(id),
                    None => AppAction::None,
                }
            } else {
                AppAction::Advance
            }
        }

        // Digit keys pick a choice directly.
        KeyCode::Char(c @ '1'..='9') if has_choices => {
            let position = c as usize - '1' as usize;
            match app.choice_id_at(position) {
                Some(id) => AppAction::Choose(id),
                None => AppAction::None,
            }
        }

        KeyCode::Up | KeyCode::Char('k') if has_choices => {
            app.choice_move(false);
            AppAction::None
        }
        KeyCode::Down | KeyCode::Char('j') if has_choices => {
            app.choice_move(true);
            AppAction::None
        }

        KeyCode::Char('s') => AppAction::Save,
        KeyCode::Char('l') => AppAction::Load,

        _ => AppAction::None,
    }
}

fn handle_overlay_key(app: &mut App, key: KeyEvent) -> AppAction {
    match app.overlay() {
        Some(Overlay::Pause { selected }) => {
            let selected = *selected;
            match key.code {
                KeyCode::Esc => {
                    app.close_overlay();
                    AppAction::Resume
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    app.overlay_move(false);
                    AppAction::None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    app.overlay_move(true);
                    AppAction::None
                }
                KeyCode::Enter => match PAUSE_ITEMS[selected] {
                    "Resume" => {
                        app.close_overlay();
                        AppAction::Resume
                    }
                    "Save" => AppAction::Save,
                    "Load" => AppAction::Load,
                    "Settings" => {
                        app.open_settings();
                        AppAction::None
                    }
                    "Main Menu" => {
                        app.close_overlay();
                        AppAction::BackToMenu
                    }
                    _ => AppAction::Quit,
                },
                _ => AppAction::None,
            }
        }

        Some(Overlay::Settings { .. }) => match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                app.close_overlay();
                match app.settings_draft.take() {
                    Some(draft) => AppAction::ApplySettings(draft),
                    None => AppAction::None,
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.overlay_move(false);
                AppAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.overlay_move(true);
                AppAction::None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                app.settings_adjust(false);
                AppAction::None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                app.settings_adjust(true);
                AppAction::None
            }
            _ => AppAction::None,
        },

        None => AppAction::None,
    }
}
