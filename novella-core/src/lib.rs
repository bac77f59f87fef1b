//! Visual novel scene scripting and playback engine.
//!
//! This crate provides:
//! - A canonical scene/event data model with loaders for both on-disk shapes
//! - The event-interpreter state machine that advances through a script,
//!   including choice-driven branching between scenes
//! - A single persistable session snapshot with autosave and settings blobs
//! - Narrow collaborator contracts for storage and audio, with in-memory
//!   fakes for testing
//!
//! # Quick Start
//!
//! ```ignore
//! use novella_core::{Engine, FileStore, FsScriptStore, NullAudio};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scripts = FsScriptStore::open("content").await;
//!     let mut engine = Engine::new(
//!         Arc::new(scripts),
//!         Arc::new(NullAudio),
//!         Arc::new(FileStore::new("saves")),
//!     );
//!
//!     engine.start_new_game().await?;
//!     println!("{}", engine.state().current_dialogue);
//!
//!     engine.next_event().await;
//!     engine.save_game().await;
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cursor;
pub mod engine;
pub mod persist;
pub mod scene;
pub mod script;
pub mod state;
pub mod testing;

// Primary public API
pub use audio::{AudioError, AudioSink, NullAudio};
pub use cursor::{EventCursor, SceneProgress};
pub use engine::{Engine, EngineConfig, EngineError, EngineStatus, FIRST_SCENE};
pub use persist::{
    BlobStore, FileStore, PersistError, SaveFile, AUTOSAVE_KEY, SETTINGS_KEY,
};
pub use scene::{
    CharacterData, Choice, Event, Scene, StagePosition, DEFAULT_CHARACTER_COLOR, NARRATOR,
};
pub use script::{FsScriptStore, SceneSource, ScriptError};
pub use state::{
    DisplaySettings, Progress, SessionState, Settings, VolumeSettings, TEXT_SPEED_MAX,
    TEXT_SPEED_MIN,
};
