//! Main application state and logic.
//!
//! The app owns the engine and the UI-only state around it: which screen is
//! up, menu selections, the typewriter reveal, and the status line. All
//! narrative state lives in the engine's session snapshot; the app never
//! duplicates it.

use novella_core::{Engine, Settings};

use crate::ui::theme::Theme;

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    MainMenu,
    Playing,
}

/// Modal overlay above the current screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Pause { selected: usize },
    Settings { selected: usize },
}

/// Entries of the pause overlay, in display order.
pub const PAUSE_ITEMS: [&str; 6] = ["Resume", "Save", "Load", "Settings", "Main Menu", "Quit"];

/// Rows of the settings overlay, in display order.
pub const SETTINGS_ROWS: [&str; 5] =
    ["Master Volume", "Music Volume", "SFX Volume", "Fullscreen", "Text Speed"];

/// Entries of the main menu, in display order.
pub const MENU_ITEMS: [&str; 3] = ["New Game", "Continue", "Quit"];

/// Main application state.
pub struct App {
    pub engine: Engine,

    // UI state
    pub theme: Theme,
    pub screen: Screen,
    overlay: Option<Overlay>,
    pub menu_selected: usize,
    pub choice_selected: usize,
    pub has_save: bool,

    // Settings overlay edits a draft; applied on close.
    pub settings_draft: Option<Settings>,

    // Typewriter reveal over the current dialogue line
    revealed_chars: usize,
    revealed_line: String,

    // Status
    status_message: Option<String>,
    pub should_quit: bool,
}

impl App {
    /// Create an application around an engine.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            theme: Theme::default(),
            screen: Screen::MainMenu,
            overlay: None,
            menu_selected: 0,
            choice_selected: 0,
            has_save: false,
            settings_draft: None,
            revealed_chars: 0,
            revealed_line: String::new(),
            status_message: None,
            should_quit: false,
        }
    }

    /// Re-sync UI state after an engine operation: restart the typewriter
    /// when the line changed and keep the choice selection in range.
    pub fn sync(&mut self) {
        let line = &self.engine.state().current_dialogue;
        if *line != self.revealed_line {
            self.revealed_line = line.clone();
            self.revealed_chars = 0;
        }

        let choices = self.engine.state().current_choices.len();
        if choices == 0 {
            self.choice_selected = 0;
        } else if self.choice_selected >= choices {
            self.choice_selected = choices - 1;
        }
    }

    /// Advance animations; called on every poll timeout.
    pub fn tick(&mut self) {
        if self.screen != Screen::Playing || self.overlay.is_some() {
            return;
        }
        if self.revealed_chars >= self.revealed_line.chars().count() {
            return;
        }

        // textSpeed 10..=100 maps to 1..=10 characters per 100ms tick.
        let speed = self.engine.state().settings.display.text_speed;
        let step = (speed / 10).max(1) as usize;
        self.revealed_chars =
            (self.revealed_chars + step).min(self.revealed_line.chars().count());
    }

    /// The portion of the current line the typewriter has revealed.
    pub fn visible_dialogue(&self) -> String {
        self.revealed_line
            .chars()
            .take(self.revealed_chars)
            .collect()
    }

    /// Whether the whole line is on screen.
    pub fn reveal_complete(&self) -> bool {
        self.revealed_chars >= self.revealed_line.chars().count()
    }

    /// Skip the typewriter to the end of the line.
    pub fn complete_reveal(&mut self) {
        self.revealed_chars = self.revealed_line.chars().count();
    }

    /// Move the main menu selection by one step, wrapping.
    pub fn menu_move(&mut self, down: bool) {
        self.menu_selected = step_wrapped(self.menu_selected, MENU_ITEMS.len(), down);
    }

    /// Move the pending-choice selection by one step, wrapping.
    pub fn choice_move(&mut self, down: bool) {
        let count = self.engine.state().current_choices.len();
        if count > 0 {
            self.choice_selected = step_wrapped(self.choice_selected, count, down);
        }
    }

    /// Id of the highlighted pending choice.
    pub fn selected_choice_id(&self) -> Option<String> {
        self.engine
            .state()
            .current_choices
            .get(self.choice_selected)
            .map(|c| c.id.clone())
    }

    /// Id of a pending choice by display position (1-based digit keys).
    pub fn choice_id_at(&self, position: usize) -> Option<String> {
        self.engine
            .state()
            .current_choices
            .get(position)
            .map(|c| c.id.clone())
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn open_pause(&mut self) {
        self.overlay = Some(Overlay::Pause { selected: 0 });
    }

    /// Open the settings overlay, seeding the draft from current settings.
    pub fn open_settings(&mut self) {
        self.settings_draft = Some(self.engine.state().settings.clone());
        self.overlay = Some(Overlay::Settings { selected: 0 });
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    /// Move the selection inside the open overlay, wrapping.
    pub fn overlay_move(&mut self, down: bool) {
        match &mut self.overlay {
            Some(Overlay::Pause { selected }) => {
                *selected = step_wrapped(*selected, PAUSE_ITEMS.len(), down);
            }
            Some(Overlay::Settings { selected }) => {
                *selected = step_wrapped(*selected, SETTINGS_ROWS.len(), down);
            }
            None => {}
        }
    }

    /// Adjust the settings-draft row under the cursor.
    pub fn settings_adjust(&mut self, increase: bool) {
        let Some(Overlay::Settings { selected }) = self.overlay.as_ref() else {
            return;
        };
        let selected = *selected;
        let Some(draft) = self.settings_draft.as_mut() else {
            return;
        };

        let volume_step = if increase { 0.1 } else { -0.1 };
        match selected {
            0 => draft.volume.master = (draft.volume.master + volume_step).clamp(0.0, 1.0),
            1 => draft.volume.music = (draft.volume.music + volume_step).clamp(0.0, 1.0),
            2 => draft.volume.sfx = (draft.volume.sfx + volume_step).clamp(0.0, 1.0),
            3 => draft.display.fullscreen = !draft.display.fullscreen,
            4 => {
                let speed = draft.display.text_speed as i16 + if increase { 10 } else { -10 };
                draft.display.text_speed = speed.clamp(
                    novella_core::TEXT_SPEED_MIN as i16,
                    novella_core::TEXT_SPEED_MAX as i16,
                ) as u8;
            }
            _ => {}
        }
    }

    /// Set status message (always overwrites).
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear status message.
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Get the current status message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

fn step_wrapped(current: usize, count: usize, down: bool) -> usize {
    if down {
        (current + 1) % count
    } else {
        (current + count - 1) % count
    }
}
