//! Scene and event data model.
//!
//! A scene is an ordered script of typed events sharing one background and
//! music context. Scenes arrive on disk in two shapes: the canonical shape
//! deserializes directly, while the structured authoring shape carries a
//! nested scene header plus a separate script list and is converted
//! event-by-event into canonical form. `SceneFile` is the format detector
//! that produces one canonical `Scene` from either.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Speaker id used when an event names nobody.
pub const NARRATOR: &str = "narrator";

/// Display color for characters with no metadata entry.
pub const DEFAULT_CHARACTER_COLOR: &str = "#ffffff";

/// A scene: an ordered script of events with a shared presentation context.
///
/// Immutable once loaded; replaced wholesale on scene change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene identifier, e.g. `chapter1_scene01`.
    pub id: String,

    /// Human-readable scene title.
    pub title: String,

    /// Background shown when the scene is entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    /// Music track requested when the scene is entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,

    /// The event script, interpreted in order.
    #[serde(default)]
    pub events: Vec<Event>,
}

/// One typed instruction within a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Show a line of dialogue, optionally switching the background first.
    #[serde(rename = "dialogue")]
    Dialogue {
        /// Speaker id; [`NARRATOR`] when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speaker: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        /// Background applied immediately, before the dialogue is shown.
        /// Only dialogue events carry this merge.
        #[serde(
            rename = "backgroundChange",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        background_change: Option<String>,
    },

    /// Present a set of options and wait for the player to pick one.
    #[serde(rename = "choice")]
    Choice {
        #[serde(default)]
        choices: Vec<Choice>,
    },

    /// Put a character on stage.
    #[serde(rename = "showCharacter")]
    ShowCharacter {
        character: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<StagePosition>,
    },

    /// Take a character off stage.
    #[serde(rename = "hideCharacter")]
    HideCharacter { character: String },

    /// Replace the background.
    #[serde(rename = "changeBackground")]
    ChangeBackground { background: String },

    /// Start a music track.
    #[serde(rename = "playMusic")]
    PlayMusic { music: String },

    /// Fire a one-shot sound effect.
    #[serde(rename = "playSfx")]
    PlaySfx { sfx: String },

    /// End the playthrough.
    #[serde(rename = "end")]
    End,
}

impl Event {
    /// A dialogue line from a named speaker.
    pub fn dialogue(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Dialogue {
            speaker: Some(speaker.into()),
            text: Some(text.into()),
            background_change: None,
        }
    }

    /// An unattributed narration line.
    pub fn narration(text: impl Into<String>) -> Self {
        Self::dialogue(NARRATOR, text)
    }

    /// A choice event over the given options.
    pub fn choice(choices: Vec<Choice>) -> Self {
        Self::Choice { choices }
    }
}

/// One selectable option within a choice event.
///
/// Ids are stable and unique within their event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,

    /// Scene to branch to; continuing the current scene when absent.
    #[serde(rename = "nextScene", default, skip_serializing_if = "Option::is_none")]
    pub next_scene: Option<String>,
}

impl Choice {
    /// An option that continues the current scene.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            next_scene: None,
        }
    }

    /// An option that branches to another scene.
    pub fn leading_to(
        id: impl Into<String>,
        text: impl Into<String>,
        scene: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            next_scene: Some(scene.into()),
        }
    }
}

/// Where a character stands on stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StagePosition {
    Left,
    #[default]
    Center,
    Right,
}

/// Display metadata for one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterData {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl CharacterData {
    /// Fallback shown for an id with no metadata entry: the raw id as the
    /// name, with the default color.
    pub fn fallback(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            color: DEFAULT_CHARACTER_COLOR.to_string(),
            avatar: None,
        }
    }
}

// ============================================================================
// On-disk format detection
// ============================================================================

/// Detector over the two on-disk scene shapes.
///
/// The structured shape is tried first; it requires the `scene`/`script`
/// pair a canonical file never has.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SceneFile {
    Structured(StructuredScene),
    Canonical(Scene),
}

impl SceneFile {
    /// Produce the canonical in-memory representation.
    pub fn into_scene(self) -> Scene {
        match self {
            Self::Canonical(scene) => scene,
            Self::Structured(structured) => structured.into_scene(),
        }
    }
}

/// Structured authoring shape: `{ "scene": {...}, "script": [...] }`.
#[derive(Debug, Deserialize)]
pub struct StructuredScene {
    scene: SceneHeader,
    script: Vec<ScriptItem>,
}

#[derive(Debug, Deserialize)]
struct SceneHeader {
    id: String,
    title: String,
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    music: Option<String>,
}

/// One raw item of a structured script list.
#[derive(Debug, Deserialize)]
struct ScriptItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    speaker: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    character: Option<String>,
    #[serde(default)]
    position: Option<StagePosition>,
    #[serde(default)]
    asset: Option<String>,
    #[serde(default)]
    options: Vec<ScriptOption>,
}

#[derive(Debug, Deserialize)]
struct ScriptOption {
    text: String,
    #[serde(default)]
    next_scene: Option<String>,
}

impl StructuredScene {
    fn into_scene(self) -> Scene {
        Scene {
            id: self.scene.id,
            title: self.scene.title,
            background: self.scene.background,
            music: self.scene.music,
            events: self.script.into_iter().map(ScriptItem::into_event).collect(),
        }
    }
}

impl ScriptItem {
    /// Map one structured item into its canonical event.
    ///
    /// Unrecognized item types degrade to a narrator dialogue carrying the
    /// item's raw text (or an empty line) rather than failing the load.
    fn into_event(self) -> Event {
        match self.kind.as_str() {
            "dialogue" => Event::Dialogue {
                speaker: self.speaker,
                text: self.text,
                background_change: None,
            },
            "choice" => Event::Choice {
                choices: self
                    .options
                    .into_iter()
                    .enumerate()
                    .map(|(index, option)| Choice {
                        id: format!("choice_{index}"),
                        text: option.text,
                        next_scene: option.next_scene,
                    })
                    .collect(),
            },
            "character_show" => Event::ShowCharacter {
                character: self.character.unwrap_or_default(),
                position: self.position,
            },
            "character_hide" => Event::HideCharacter {
                character: self.character.unwrap_or_default(),
            },
            "background" => Event::ChangeBackground {
                background: self.asset.unwrap_or_default(),
            },
            "sound_effect" => Event::PlaySfx {
                sfx: self.asset.unwrap_or_default(),
            },
            _ => Event::Dialogue {
                speaker: Some(NARRATOR.to_string()),
                text: Some(self.text.unwrap_or_default()),
                background_change: None,
            },
        }
    }
}

// ============================================================================
// Character file shapes
// ============================================================================

/// Detector over the two character container shapes: an object keyed by id,
/// or a flat array of records that carry their own ids.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CharacterFile {
    Keyed { characters: HashMap<String, CharacterRecord> },
    Flat(Vec<CharacterData>),
}

/// A character record whose id lives in the containing map key.
#[derive(Debug, Deserialize)]
pub struct CharacterRecord {
    name: String,
    color: String,
    #[serde(default)]
    avatar: Option<String>,
}

impl CharacterFile {
    /// Flatten either shape into an id-keyed mapping.
    pub fn into_map(self) -> HashMap<String, CharacterData> {
        match self {
            Self::Keyed { characters } => characters
                .into_iter()
                .map(|(id, record)| {
                    let data = CharacterData {
                        id: id.clone(),
                        name: record.name,
                        color: record.color,
                        avatar: record.avatar,
                    };
                    (id, data)
                })
                .collect(),
            Self::Flat(records) => records
                .into_iter()
                .map(|data| (data.id.clone(), data))
                .collect(),
        }
    }
}
