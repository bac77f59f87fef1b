//! Audio collaborator contract.
//!
//! The engine only requests playback and pushes volume levels; mixing, fade
//! curves, and decoding belong to the implementation behind this trait.
//! Audio failures are logged by the engine and never interrupt narrative
//! progression.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the audio backend.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Playback sink the engine drives.
///
/// Volume setters take levels in `[0, 1]`; implementations clamp.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Start a music track, superseding whatever is playing.
    async fn play_music(&self, track: &str, fade_in: bool) -> Result<(), AudioError>;

    /// Stop the current music track.
    async fn stop_music(&self) -> Result<(), AudioError>;

    /// Fire a one-shot sound effect.
    async fn play_sfx(&self, sfx: &str) -> Result<(), AudioError>;

    /// Suspend music playback, keeping position.
    async fn pause_music(&self) -> Result<(), AudioError>;

    /// Resume suspended music playback.
    async fn resume_music(&self) -> Result<(), AudioError>;

    fn set_master_volume(&self, volume: f32);
    fn set_music_volume(&self, volume: f32);
    fn set_sfx_volume(&self, volume: f32);
}

/// A sink that plays nothing, for front ends without audio output.
pub struct NullAudio;

#[async_trait]
impl AudioSink for NullAudio {
    async fn play_music(&self, _track: &str, _fade_in: bool) -> Result<(), AudioError> {
        Ok(())
    }

    async fn stop_music(&self) -> Result<(), AudioError> {
        Ok(())
    }

    async fn play_sfx(&self, _sfx: &str) -> Result<(), AudioError> {
        Ok(())
    }

    async fn pause_music(&self) -> Result<(), AudioError> {
        Ok(())
    }

    async fn resume_music(&self) -> Result<(), AudioError> {
        Ok(())
    }

    fn set_master_volume(&self, _volume: f32) {}
    fn set_music_volume(&self, _volume: f32) {}
    fn set_sfx_volume(&self, _volume: f32) {}
}
