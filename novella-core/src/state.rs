//! Session state: the single mutable, persistable snapshot of a playthrough.
//!
//! There is exactly one writer (the engine); the presentation layer and the
//! persistence serializer only read. Serialized field names match the
//! on-disk save format, so this struct IS the save payload (wrapped with a
//! timestamp and version tag by the persistence layer).

use crate::persist::SaveFile;
use crate::scene::Choice;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lowest selectable text speed.
pub const TEXT_SPEED_MIN: u8 = 10;
/// Highest selectable text speed.
pub const TEXT_SPEED_MAX: u8 = 100;

/// The canonical mutable snapshot the presentation layer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Id of the scene being played.
    pub current_scene: String,

    /// Cursor position within the current scene.
    pub current_event_index: usize,

    /// Dialogue line on screen.
    pub current_dialogue: String,

    /// Speaker of the line on screen.
    pub current_speaker: String,

    /// Pending options; empty when no choice is on screen.
    pub current_choices: Vec<Choice>,

    /// Current background ref, empty until a scene or event sets one.
    pub background: String,

    /// Character ids currently on stage, in staging order, no duplicates.
    pub characters: Vec<String>,

    pub is_playing: bool,
    pub is_paused: bool,
    pub is_loading: bool,

    pub settings: Settings,
    pub progress: Progress,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_scene: "scene01".to_string(),
            current_event_index: 0,
            current_dialogue: String::new(),
            current_speaker: String::new(),
            current_choices: Vec::new(),
            background: String::new(),
            characters: Vec::new(),
            is_playing: false,
            is_paused: false,
            is_loading: false,
            settings: Settings::default(),
            progress: Progress::default(),
        }
    }
}

impl SessionState {
    /// Revert to defaults, preserving settings.
    pub fn reset(&mut self) {
        let settings = std::mem::take(&mut self.settings);
        *self = Self {
            settings,
            ..Self::default()
        };
    }

    /// Stage a character; no-op if already present.
    pub fn show_character(&mut self, id: &str) {
        if !self.characters.iter().any(|c| c == id) {
            self.characters.push(id.to_string());
        }
    }

    /// Unstage a character; no-op if absent.
    pub fn hide_character(&mut self, id: &str) {
        self.characters.retain(|c| c != id);
    }

    /// Apply a loaded save: scene, cursor index, stage, background, and
    /// progress. Dialogue, speaker, and choices are intentionally not
    /// restored; they are re-derived by re-interpreting the event at the
    /// restored index when the scene is re-loaded. Settings travel in their
    /// own blob and are untouched here.
    pub fn restore_from(&mut self, save: &SaveFile) {
        self.current_scene = save.state.current_scene.clone();
        self.current_event_index = save.state.current_event_index;
        self.characters = save.state.characters.clone();
        self.background = save.state.background.clone();
        self.progress = save.state.progress.clone();
        self.is_playing = true;
    }
}

/// Player-tunable settings, persisted independently of game progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub volume: VolumeSettings,
    pub display: DisplaySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: VolumeSettings {
                master: 0.8,
                music: 0.7,
                sfx: 0.8,
            },
            display: DisplaySettings {
                fullscreen: false,
                text_speed: 50,
            },
        }
    }
}

impl Settings {
    /// Force every field into its documented range.
    pub fn clamped(mut self) -> Self {
        self.volume.master = self.volume.master.clamp(0.0, 1.0);
        self.volume.music = self.volume.music.clamp(0.0, 1.0);
        self.volume.sfx = self.volume.sfx.clamp(0.0, 1.0);
        self.display.text_speed = self
            .display
            .text_speed
            .clamp(TEXT_SPEED_MIN, TEXT_SPEED_MAX);
        self
    }
}

/// Mixer levels, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeSettings {
    pub master: f32,
    pub music: f32,
    pub sfx: f32,
}

/// Display preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    pub fullscreen: bool,
    /// Dialogue reveal rate, within [`TEXT_SPEED_MIN`]..=[`TEXT_SPEED_MAX`].
    pub text_speed: u8,
}

/// Long-lived playthrough record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Scenes played to their end.
    pub completed_scenes: BTreeSet<String>,

    /// Unlocked gallery/extra content ids.
    pub unlocked_content: BTreeSet<String>,

    /// Cumulative play time in seconds.
    pub play_time: u64,

    /// Unix timestamp of the most recent save, 0 if never saved.
    pub last_save_time: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let state = SessionState::default();

        assert_eq!(state.current_scene, "scene01");
        assert_eq!(state.current_event_index, 0);
        assert!(!state.is_playing);
        assert_eq!(state.settings.volume.master, 0.8);
        assert_eq!(state.settings.volume.music, 0.7);
        assert_eq!(state.settings.volume.sfx, 0.8);
        assert!(!state.settings.display.fullscreen);
        assert_eq!(state.settings.display.text_speed, 50);
        assert_eq!(state.progress, Progress::default());
    }

    #[test]
    fn reset_preserves_settings_only() {
        let mut state = SessionState::default();
        state.current_scene = "chapter3_scene02".to_string();
        state.current_dialogue = "...".to_string();
        state.characters.push("ayu".to_string());
        state.is_playing = true;
        state.settings.volume.master = 0.2;
        state.progress.play_time = 900;

        state.reset();

        assert_eq!(state.settings.volume.master, 0.2);
        assert_eq!(state.current_scene, "scene01");
        assert!(state.current_dialogue.is_empty());
        assert!(state.characters.is_empty());
        assert!(!state.is_playing);
        assert_eq!(state.progress.play_time, 0);
    }

    #[test]
    fn staging_is_duplicate_free_and_ordered() {
        let mut state = SessionState::default();
        state.show_character("ayu");
        state.show_character("rin");
        state.show_character("ayu");

        assert_eq!(state.characters, vec!["ayu", "rin"]);

        state.hide_character("ayu");
        assert_eq!(state.characters, vec!["rin"]);

        // Hiding an absent character is a no-op.
        state.hide_character("ayu");
        assert_eq!(state.characters, vec!["rin"]);
    }

    #[test]
    fn snapshot_serializes_with_save_format_field_names() {
        let state = SessionState::default();
        let value = serde_json::to_value(&state).expect("serialize");

        assert!(value.get("currentScene").is_some());
        assert!(value.get("currentEventIndex").is_some());
        assert!(value.get("currentDialogue").is_some());
        assert!(value.get("isPlaying").is_some());
        assert!(value["settings"]["display"].get("textSpeed").is_some());
        assert!(value["progress"].get("completedScenes").is_some());
        assert!(value["progress"].get("lastSaveTime").is_some());
    }

    #[test]
    fn clamping_forces_documented_ranges() {
        let mut settings = Settings::default();
        settings.volume.master = 1.7;
        settings.volume.music = -0.3;
        settings.display.text_speed = 3;

        let clamped = settings.clamped();
        assert_eq!(clamped.volume.master, 1.0);
        assert_eq!(clamped.volume.music, 0.0);
        assert_eq!(clamped.display.text_speed, TEXT_SPEED_MIN);

        let mut settings = Settings::default();
        settings.display.text_speed = 255;
        assert_eq!(settings.clamped().display.text_speed, TEXT_SPEED_MAX);
    }
}
