//! The playback engine: turns script events into session-state mutations
//! and player choices into continuation or scene transitions.
//!
//! Engine lifecycle: `Uninitialized → Initialized → Playing ⇄ Paused →
//! Ended`. Initialization pushes the persisted settings into the audio
//! collaborator exactly once, before any event executes. `Ended` is reached
//! only through an `end` event and is terminal for the playthrough; a fresh
//! `start_new_game` leaves it.
//!
//! Every mutating operation takes `&mut self`, so session-state writes are
//! serialized by construction: a second mutation cannot begin while one is
//! in flight across its await points.

use crate::audio::AudioSink;
use crate::cursor::{EventCursor, SceneProgress};
use crate::persist::{self, BlobStore};
use crate::scene::{CharacterData, Event, Scene, NARRATOR};
use crate::script::{SceneSource, ScriptError};
use crate::state::{SessionState, Settings};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

/// Scene loaded by a new game.
pub const FIRST_SCENE: &str = "chapter1_scene01";

/// Errors from engine operations.
///
/// Persistence failures never appear here; they are reported as boolean
/// results by the save/load operations themselves. Audio failures are
/// logged and swallowed.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("no saved game to restore")]
    NoSave,
}

/// Engine-level playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineStatus {
    #[default]
    Uninitialized,
    Initialized,
    Playing,
    Paused,
    Ended,
}

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Scene id loaded by `start_new_game`.
    pub start_scene: String,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            start_scene: FIRST_SCENE.to_string(),
        }
    }

    /// Override the scene a new game starts in.
    pub fn with_start_scene(mut self, scene: impl Into<String>) -> Self {
        self.start_scene = scene.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The narrative playback engine.
///
/// Collaborators are injected at construction; the engine is the sole
/// writer of its [`SessionState`], which the presentation layer reads
/// between inputs.
pub struct Engine {
    config: EngineConfig,
    scenes: Arc<dyn SceneSource>,
    audio: Arc<dyn AudioSink>,
    store: Arc<dyn BlobStore>,
    state: SessionState,
    cursor: Option<EventCursor>,
    status: EngineStatus,
    /// When the current play stretch began; folded into
    /// `progress.play_time` on every save.
    session_started: Option<Instant>,
}

impl Engine {
    /// Create an engine over the given collaborators.
    pub fn new(
        scenes: Arc<dyn SceneSource>,
        audio: Arc<dyn AudioSink>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            config: EngineConfig::new(),
            scenes,
            audio,
            store,
            state: SessionState::default(),
            cursor: None,
            status: EngineStatus::Uninitialized,
            session_started: None,
        }
    }

    /// Replace the default configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Load persisted settings and push the volume levels into the audio
    /// collaborator. Runs once; later calls are no-ops.
    pub async fn initialize(&mut self) {
        if self.status != EngineStatus::Uninitialized {
            return;
        }

        self.state.settings = persist::load_settings(self.store.as_ref()).await;
        self.apply_volumes();
        self.status = EngineStatus::Initialized;
        debug!("engine initialized");
    }

    /// Reset all session state and progress (settings persist) and load the
    /// configured first scene.
    pub async fn start_new_game(&mut self) -> Result<(), EngineError> {
        self.initialize().await;

        self.state.reset();
        self.state.is_playing = true;
        self.status = EngineStatus::Playing;
        self.session_started = Some(Instant::now());

        let start = self.config.start_scene.clone();
        self.load_scene(&start).await
    }

    /// Restore the autosave and resume exactly where the player left off.
    ///
    /// The saved scene is re-loaded and the cursor jumped to the saved
    /// index, re-interpreting the event there; dialogue, speaker, and
    /// choices are re-derived rather than restored. An out-of-range saved
    /// index (scene content changed since the save) leaves the cursor at
    /// the scene start instead of failing.
    pub async fn continue_game(&mut self) -> Result<(), EngineError> {
        self.initialize().await;

        self.state.is_loading = true;
        let Some(save) = persist::load_game(self.store.as_ref()).await else {
            self.state.is_loading = false;
            return Err(EngineError::NoSave);
        };

        self.state.restore_from(&save);
        let scene_id = self.state.current_scene.clone();
        let saved_index = save.state.current_event_index;

        self.status = EngineStatus::Playing;
        let loaded = self.load_scene(&scene_id).await;
        if let Err(err) = loaded {
            self.state.is_loading = false;
            return Err(err);
        }

        if saved_index != 0 {
            let jumped = self.cursor.as_mut().and_then(|cursor| {
                let event = cursor.jump_to(saved_index).cloned();
                (cursor.index() == saved_index).then_some(event)
            });
            // A failed jump (scene shrank since the save) leaves the cursor
            // at the scene start set by load_scene.
            if let Some(event) = jumped {
                self.state.current_event_index = saved_index;
                if let Some(event) = event {
                    self.interpret(event).await;
                }
            }
        }

        if self.status != EngineStatus::Ended {
            self.state.is_playing = true;
            self.state.is_paused = false;
        }
        self.state.is_loading = false;
        self.session_started = Some(Instant::now());
        Ok(())
    }

    /// Replace the current scene wholesale and synchronously interpret its
    /// first event; a scene is never left positioned before its script.
    pub async fn load_scene(&mut self, id: &str) -> Result<(), EngineError> {
        let scene = self.scenes.load_scene(id).await?;

        self.state.current_scene = id.to_string();
        if let Some(background) = &scene.background {
            self.state.background = background.clone();
        }
        if let Some(track) = scene.music.clone() {
            self.request_music(&track).await;
        }

        let cursor = EventCursor::new(scene);
        let first = cursor.current().cloned();
        self.state.current_event_index = 0;
        self.cursor = Some(cursor);

        match first {
            Some(event) => self.interpret(event).await,
            // An empty script is scene-end on arrival.
            None => self.scene_end().await,
        }

        Ok(())
    }

    /// Advance to the next event and interpret it.
    ///
    /// No-op unless the engine is playing. Cursor exhaustion runs the
    /// scene-end policy (one autosave write) and stops; it is not an `end`
    /// event and does not end the playthrough.
    pub async fn next_event(&mut self) {
        if self.status != EngineStatus::Playing {
            return;
        }
        self.advance_and_run().await;
    }

    /// Resolve a choice by id within the current choice event.
    ///
    /// An unknown id is silently ignored. A matched option either branches
    /// to its target scene (cursor reset to the scene start) or, without a
    /// target, advances the current scene by one event. Pending choices are
    /// cleared before the follow-up event executes, so a back-to-back
    /// choice event keeps its own fresh options.
    pub async fn make_choice(&mut self, choice_id: &str) -> Result<(), EngineError> {
        let Some(cursor) = &self.cursor else {
            return Ok(());
        };
        let Some(Event::Choice { choices }) = cursor.current() else {
            return Ok(());
        };
        let Some(choice) = choices.iter().find(|c| c.id == choice_id).cloned() else {
            debug!("ignoring unknown choice id: {choice_id}");
            return Ok(());
        };

        self.state.current_choices.clear();

        match choice.next_scene {
            Some(target) => self.load_scene(&target).await?,
            None => self.advance_and_run().await,
        }

        Ok(())
    }

    /// Suspend playback and music. Only a playing engine can pause; session
    /// state content other than the pause flag is untouched.
    pub async fn pause(&mut self) {
        if self.status != EngineStatus::Playing {
            return;
        }

        self.status = EngineStatus::Paused;
        self.state.is_paused = true;
        if let Err(err) = self.audio.pause_music().await {
            warn!("failed to pause music: {err}");
        }
    }

    /// Resume from pause.
    pub async fn resume(&mut self) {
        if self.status != EngineStatus::Paused {
            return;
        }

        self.status = EngineStatus::Playing;
        self.state.is_paused = false;
        if let Err(err) = self.audio.resume_music().await {
            warn!("failed to resume music: {err}");
        }
    }

    /// Write the session snapshot to the autosave slot, folding elapsed
    /// play time into the progress record. Reports success; never throws.
    pub async fn save_game(&mut self) -> bool {
        if let Some(started) = self.session_started {
            self.state.progress.play_time += started.elapsed().as_secs();
            self.session_started = Some(Instant::now());
        }
        self.state.progress.last_save_time = persist::unix_timestamp();

        persist::save_game(self.store.as_ref(), &self.state).await
    }

    /// Remove the autosave slot. Idempotent.
    pub async fn delete_save(&self) -> bool {
        persist::delete_save(self.store.as_ref()).await
    }

    /// Whether an autosave exists to continue from.
    pub async fn has_save(&self) -> bool {
        persist::has_save(self.store.as_ref()).await
    }

    /// Clamp, apply, and persist new settings, pushing volume levels into
    /// the audio collaborator. Reports persistence success.
    pub async fn update_settings(&mut self, settings: Settings) -> bool {
        self.state.settings = settings.clamped();
        self.apply_volumes();
        persist::save_settings(self.store.as_ref(), &self.state.settings).await
    }

    /// The snapshot the presentation layer reads.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Engine-level playback state.
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// The scene being played, if any.
    pub fn scene(&self) -> Option<&Scene> {
        self.cursor.as_ref().map(EventCursor::scene)
    }

    /// Position within the current scene.
    pub fn scene_progress(&self) -> SceneProgress {
        self.cursor
            .as_ref()
            .map(EventCursor::progress)
            .unwrap_or(SceneProgress { current: 0, total: 0 })
    }

    /// Display metadata for a character id; unknown ids fall back to the
    /// raw id with the default color.
    pub fn character_display(&self, id: &str) -> CharacterData {
        self.scenes
            .character(id)
            .cloned()
            .unwrap_or_else(|| CharacterData::fallback(id))
    }

    // ========================================================================
    // Event interpretation
    // ========================================================================

    /// Step the cursor forward and run what it lands on.
    async fn advance_and_run(&mut self) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };

        let event = cursor.advance().cloned();
        self.state.current_event_index = cursor.index();

        match event {
            Some(event) => self.interpret(event).await,
            None => self.scene_end().await,
        }
    }

    /// Apply one event to session state, exactly one branch per kind.
    async fn interpret(&mut self, event: Event) {
        match event {
            Event::Dialogue {
                speaker,
                text,
                background_change,
            } => {
                // A dialogue event may carry a simultaneous background
                // change, applied before the line is shown. Standalone
                // changeBackground events are the other path; the two are
                // deliberately not unified.
                if let Some(background) = background_change {
                    self.state.background = background;
                }
                self.state.current_dialogue = text.unwrap_or_default();
                self.state.current_speaker =
                    speaker.unwrap_or_else(|| NARRATOR.to_string());
            }
            Event::Choice { choices } => {
                self.state.current_choices = choices;
            }
            Event::ShowCharacter { character, .. } => {
                self.state.show_character(&character);
            }
            Event::HideCharacter { character } => {
                self.state.hide_character(&character);
            }
            Event::ChangeBackground { background } => {
                self.state.background = background;
            }
            Event::PlayMusic { music } => {
                self.request_music(&music).await;
            }
            Event::PlaySfx { sfx } => {
                if let Err(err) = self.audio.play_sfx(&sfx).await {
                    warn!("sfx playback failed for {sfx}: {err}");
                }
            }
            Event::End => {
                self.state.is_playing = false;
                self.status = EngineStatus::Ended;
            }
        }
    }

    /// Scene-end policy: record the finished scene and write one autosave.
    /// Running off the end of a script is not an `end` event; playback
    /// stays in its current engine state.
    async fn scene_end(&mut self) {
        debug!("scene ended: {}", self.state.current_scene);

        let scene_id = self.state.current_scene.clone();
        if !scene_id.is_empty() {
            self.state.progress.completed_scenes.insert(scene_id);
        }

        self.save_game().await;
    }

    async fn request_music(&self, track: &str) {
        if let Err(err) = self.audio.play_music(track, true).await {
            warn!("music playback failed for {track}: {err}");
        }
    }

    fn apply_volumes(&self) {
        let volume = self.state.settings.volume;
        self.audio.set_master_volume(volume.master);
        self.audio.set_music_volume(volume.music);
        self.audio.set_sfx_volume(volume.sfx);
    }
}
