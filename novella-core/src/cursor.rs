//! Positional bookkeeping over one scene's event sequence.

use crate::scene::{Event, Scene};
use serde::{Deserialize, Serialize};

/// Cursor over the current scene's events.
///
/// Invariant: `0 <= index <= events.len()`, where `index == events.len()`
/// denotes scene-end (no current event). A fresh cursor starts at 0.
#[derive(Debug, Clone)]
pub struct EventCursor {
    scene: Scene,
    index: usize,
}

/// Position within a scene, for saves and the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneProgress {
    pub current: usize,
    pub total: usize,
}

impl EventCursor {
    /// Take ownership of a scene, positioned at its first event.
    pub fn new(scene: Scene) -> Self {
        Self { scene, index: 0 }
    }

    /// The scene being played.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Current position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The event at the current position, or none at scene-end.
    pub fn current(&self) -> Option<&Event> {
        self.scene.events.get(self.index)
    }

    /// Step forward and return the event now under the cursor.
    ///
    /// Saturates at scene-end so the index invariant holds under repeated
    /// advancement.
    pub fn advance(&mut self) -> Option<&Event> {
        self.index = (self.index + 1).min(self.scene.events.len());
        self.current()
    }

    /// Move to an absolute position and return the event there.
    ///
    /// Fails silently for an index outside `[0, len]`: no state change,
    /// none returned. Jumping exactly to `len` is valid and lands on
    /// scene-end.
    pub fn jump_to(&mut self, index: usize) -> Option<&Event> {
        if index > self.scene.events.len() {
            return None;
        }
        self.index = index;
        self.current()
    }

    /// Whether the cursor is past the last event.
    pub fn is_at_end(&self) -> bool {
        self.index >= self.scene.events.len()
    }

    /// Position report for saves and the UI.
    pub fn progress(&self) -> SceneProgress {
        SceneProgress {
            current: self.index,
            total: self.scene.events.len(),
        }
    }
}
