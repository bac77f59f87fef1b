//! Testing utilities.
//!
//! This module provides deterministic fakes for every collaborator seam:
//! - `StaticScripts` in place of the filesystem script store
//! - `MemoryStore` in place of the filesystem blob store
//! - `RecordingAudio` in place of a real audio backend
//! - `TestHarness` wiring the three into an engine, with assertion helpers

use crate::audio::{AudioError, AudioSink};
use crate::engine::{Engine, EngineConfig, EngineStatus};
use crate::persist::{BlobStore, PersistError};
use crate::scene::{CharacterData, Scene};
use crate::script::{SceneSource, ScriptError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// An in-memory scene source with a fixed set of scenes.
#[derive(Default)]
pub struct StaticScripts {
    scenes: HashMap<String, Scene>,
    characters: HashMap<String, CharacterData>,
}

impl StaticScripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scene under its own id.
    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scenes.insert(scene.id.clone(), scene);
        self
    }

    /// Register character metadata.
    pub fn with_character(mut self, character: CharacterData) -> Self {
        self.characters.insert(character.id.clone(), character);
        self
    }
}

#[async_trait]
impl SceneSource for StaticScripts {
    async fn load_scene(&self, id: &str) -> Result<Scene, ScriptError> {
        self.scenes
            .get(id)
            .cloned()
            .ok_or_else(|| ScriptError::SceneNotFound(id.to_string()))
    }

    fn character(&self, id: &str) -> Option<&CharacterData> {
        self.characters.get(id)
    }
}

/// An in-memory blob store that counts writes per key and can be told to
/// fail on demand.
#[derive(Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, String>>,
    write_counts: Mutex<HashMap<String, usize>>,
    fail: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with an IO error.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Current content of a key.
    pub fn blob(&self, key: &str) -> Option<String> {
        self.blobs.lock().expect("lock").get(key).cloned()
    }

    /// Seed a key directly, bypassing the gateway.
    pub fn put_blob(&self, key: &str, json: impl Into<String>) {
        self.blobs
            .lock()
            .expect("lock")
            .insert(key.to_string(), json.into());
    }

    /// How many times a key has been written through the gateway.
    pub fn write_count(&self, key: &str) -> usize {
        self.write_counts
            .lock()
            .expect("lock")
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    fn check(&self) -> Result<(), PersistError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(PersistError::Io(std::io::Error::other("simulated failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn save_blob(&self, key: &str, json: &str) -> Result<(), PersistError> {
        self.check()?;
        self.blobs
            .lock()
            .expect("lock")
            .insert(key.to_string(), json.to_string());
        *self
            .write_counts
            .lock()
            .expect("lock")
            .entry(key.to_string())
            .or_insert(0) += 1;
        Ok(())
    }

    async fn load_blob(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.check()?;
        Ok(self.blobs.lock().expect("lock").get(key).cloned())
    }

    async fn delete_blob(&self, key: &str) -> Result<(), PersistError> {
        self.check()?;
        self.blobs.lock().expect("lock").remove(key);
        Ok(())
    }
}

/// One call observed by [`RecordingAudio`].
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    PlayMusic { track: String, fade_in: bool },
    StopMusic,
    PlaySfx(String),
    PauseMusic,
    ResumeMusic,
    MasterVolume(f32),
    MusicVolume(f32),
    SfxVolume(f32),
}

/// An audio sink that records every request it receives.
#[derive(Default)]
pub struct RecordingAudio {
    calls: Mutex<Vec<AudioCall>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything requested so far, in order.
    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn clear(&self) {
        self.calls.lock().expect("lock").clear();
    }

    fn record(&self, call: AudioCall) {
        self.calls.lock().expect("lock").push(call);
    }
}

#[async_trait]
impl AudioSink for RecordingAudio {
    async fn play_music(&self, track: &str, fade_in: bool) -> Result<(), AudioError> {
        self.record(AudioCall::PlayMusic {
            track: track.to_string(),
            fade_in,
        });
        Ok(())
    }

    async fn stop_music(&self) -> Result<(), AudioError> {
        self.record(AudioCall::StopMusic);
        Ok(())
    }

    async fn play_sfx(&self, sfx: &str) -> Result<(), AudioError> {
        self.record(AudioCall::PlaySfx(sfx.to_string()));
        Ok(())
    }

    async fn pause_music(&self) -> Result<(), AudioError> {
        self.record(AudioCall::PauseMusic);
        Ok(())
    }

    async fn resume_music(&self) -> Result<(), AudioError> {
        self.record(AudioCall::ResumeMusic);
        Ok(())
    }

    fn set_master_volume(&self, volume: f32) {
        self.record(AudioCall::MasterVolume(volume));
    }

    fn set_music_volume(&self, volume: f32) {
        self.record(AudioCall::MusicVolume(volume));
    }

    fn set_sfx_volume(&self, volume: f32) {
        self.record(AudioCall::SfxVolume(volume));
    }
}

/// An engine wired to fakes, with handles kept for inspection.
pub struct TestHarness {
    pub engine: Engine,
    pub store: Arc<MemoryStore>,
    pub audio: Arc<RecordingAudio>,
}

impl TestHarness {
    /// Build a harness over the given scripts.
    pub fn new(scripts: StaticScripts) -> Self {
        Self::with_config(scripts, EngineConfig::new())
    }

    /// Build a harness with an explicit engine configuration.
    pub fn with_config(scripts: StaticScripts, config: EngineConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let audio = Arc::new(RecordingAudio::new());
        let engine = Engine::new(Arc::new(scripts), audio.clone(), store.clone())
            .with_config(config);

        Self {
            engine,
            store,
            audio,
        }
    }

    /// Dialogue line currently on screen.
    pub fn dialogue(&self) -> &str {
        &self.engine.state().current_dialogue
    }

    /// Speaker of the line currently on screen.
    pub fn speaker(&self) -> &str {
        &self.engine.state().current_speaker
    }

    /// Pending choice texts.
    pub fn choice_texts(&self) -> Vec<&str> {
        self.engine
            .state()
            .current_choices
            .iter()
            .map(|c| c.text.as_str())
            .collect()
    }

    /// How many autosave writes the store has seen.
    pub fn autosave_writes(&self) -> usize {
        self.store.write_count(crate::persist::AUTOSAVE_KEY)
    }
}

/// Assert the line and speaker currently on screen.
#[track_caller]
pub fn assert_dialogue(harness: &TestHarness, speaker: &str, text: &str) {
    assert_eq!(
        (harness.speaker(), harness.dialogue()),
        (speaker, text),
        "expected {speaker:?} saying {text:?}"
    );
}

/// Assert the engine's playback state.
#[track_caller]
pub fn assert_status(harness: &TestHarness, status: EngineStatus) {
    assert_eq!(harness.engine.status(), status);
}

/// Assert the current scene id and cursor position.
#[track_caller]
pub fn assert_position(harness: &TestHarness, scene: &str, index: usize) {
    let state = harness.engine.state();
    assert_eq!(
        (state.current_scene.as_str(), state.current_event_index),
        (scene, index),
        "expected position {scene}:{index}"
    );
}
