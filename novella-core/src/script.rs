//! Script store: resolves scene and character identifiers to content.
//!
//! `FsScriptStore` reads JSON content from a directory tree laid out as
//! `<root>/<chapter>/<scene>.json` plus `<root>/characters.json`. The
//! `SceneSource` trait is the seam the engine pulls scenes through, so tests
//! can substitute an in-memory source.

use crate::scene::{CharacterData, CharacterFile, Scene, SceneFile};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::warn;

/// Chapter used for scene ids that carry no chapter segment.
pub const DEFAULT_CHAPTER: &str = "chapter1";

/// Character metadata file name, relative to the content root.
const CHARACTERS_FILE: &str = "characters.json";

/// Errors from script content resolution.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("scene not found: {0}")]
    SceneNotFound(String),

    #[error("malformed scene content for {id}: {source}")]
    Malformed {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of scenes and character metadata.
///
/// Implementations never touch session state; they only return data.
#[async_trait]
pub trait SceneSource: Send + Sync {
    /// Resolve a scene id to canonical scene data.
    async fn load_scene(&self, id: &str) -> Result<Scene, ScriptError>;

    /// Look up character metadata by id. Callers apply the
    /// raw-id-plus-default-color fallback for unknown ids.
    fn character(&self, id: &str) -> Option<&CharacterData>;
}

/// Filesystem-backed script store.
pub struct FsScriptStore {
    root: PathBuf,
    characters: HashMap<String, CharacterData>,
}

impl FsScriptStore {
    /// Open a store over a content directory, loading character metadata.
    ///
    /// A missing or unreadable character file leaves the mapping empty; an
    /// unknown character degrades to its raw id at display time, not to a
    /// hard error here.
    pub async fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let characters = load_characters(&root.join(CHARACTERS_FILE)).await;
        Self { root, characters }
    }

    /// The loaded character mapping.
    pub fn characters(&self) -> &HashMap<String, CharacterData> {
        &self.characters
    }

    fn scene_path(&self, id: &str) -> PathBuf {
        self.root.join(scene_rel_path(id))
    }
}

#[async_trait]
impl SceneSource for FsScriptStore {
    async fn load_scene(&self, id: &str) -> Result<Scene, ScriptError> {
        let path = self.scene_path(id);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ScriptError::SceneNotFound(id.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let file: SceneFile =
            serde_json::from_str(&content).map_err(|source| ScriptError::Malformed {
                id: id.to_string(),
                source,
            })?;

        Ok(file.into_scene())
    }

    fn character(&self, id: &str) -> Option<&CharacterData> {
        self.characters.get(id)
    }
}

/// Map a scene id to its path under the content root.
///
/// An id containing `_` splits into a chapter segment and a scene segment;
/// anything after a second separator is not part of the scene segment. Ids
/// without a separator live under the default chapter.
pub fn scene_rel_path(id: &str) -> PathBuf {
    if id.contains('_') {
        let mut parts = id.split('_');
        let chapter = parts.next().unwrap_or_default();
        let scene = parts.next().unwrap_or_default();
        PathBuf::from(chapter).join(format!("{scene}.json"))
    } else {
        PathBuf::from(DEFAULT_CHAPTER).join(format!("{id}.json"))
    }
}

async fn load_characters(path: &Path) -> HashMap<String, CharacterData> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) => {
            warn!("failed to read character data from {}: {err}", path.display());
            return HashMap::new();
        }
    };

    match serde_json::from_str::<CharacterFile>(&content) {
        Ok(file) => file.into_map(),
        Err(err) => {
            warn!("malformed character data in {}: {err}", path.display());
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Event;
    use tempfile::TempDir;

    #[test]
    fn chaptered_id_splits_into_chapter_and_scene_segments() {
        assert_eq!(
            scene_rel_path("chapter2_scene05"),
            PathBuf::from("chapter2").join("scene05.json")
        );
    }

    #[test]
    fn bare_id_resolves_under_default_chapter() {
        assert_eq!(
            scene_rel_path("intro"),
            PathBuf::from("chapter1").join("intro.json")
        );
    }

    #[test]
    fn extra_separators_stay_out_of_the_scene_segment() {
        assert_eq!(
            scene_rel_path("chapter3_scene01_alt"),
            PathBuf::from("chapter3").join("scene01.json")
        );
    }

    async fn store_with(files: &[(&str, &str)]) -> (TempDir, FsScriptStore) {
        let dir = TempDir::new().expect("temp dir");
        for (rel, content) in files {
            let path = dir.path().join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("mkdir");
            }
            std::fs::write(path, content).expect("write");
        }
        let store = FsScriptStore::open(dir.path()).await;
        (dir, store)
    }

    #[tokio::test]
    async fn loads_canonical_scene_from_disk() {
        let (_dir, store) = store_with(&[(
            "chapter1/intro.json",
            r#"{"id": "intro", "title": "Intro", "events": [{"type": "end"}]}"#,
        )])
        .await;

        let scene = store.load_scene("intro").await.expect("load");
        assert_eq!(scene.id, "intro");
        assert_eq!(scene.events, vec![Event::End]);
    }

    #[tokio::test]
    async fn loads_structured_scene_from_chaptered_path() {
        let (_dir, store) = store_with(&[(
            "chapter2/scene05.json",
            r#"{"scene": {"id": "chapter2_scene05", "title": "T"},
                "script": [{"type": "dialogue", "speaker": "ayu", "text": "Hi"}]}"#,
        )])
        .await;

        let scene = store.load_scene("chapter2_scene05").await.expect("load");
        assert_eq!(scene.events, vec![Event::dialogue("ayu", "Hi")]);
    }

    #[tokio::test]
    async fn missing_scene_reports_not_found() {
        let (_dir, store) = store_with(&[]).await;

        match store.load_scene("nowhere").await {
            Err(ScriptError::SceneNotFound(id)) => assert_eq!(id, "nowhere"),
            other => panic!("expected SceneNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_scene_is_surfaced() {
        let (_dir, store) =
            store_with(&[("chapter1/bad.json", "{ this is not json")]).await;

        assert!(matches!(
            store.load_scene("bad").await,
            Err(ScriptError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn unreadable_character_file_leaves_mapping_empty() {
        let (_dir, store) = store_with(&[]).await;
        assert!(store.characters().is_empty());
        assert!(store.character("ayu").is_none());
    }

    #[tokio::test]
    async fn keyed_character_file_loads() {
        let (_dir, store) = store_with(&[(
            "characters.json",
            r##"{"characters": {"ayu": {"name": "Ayu", "color": "#4a90e2"}}}"##,
        )])
        .await;

        let ayu = store.character("ayu").expect("present");
        assert_eq!(ayu.name, "Ayu");
    }

    #[tokio::test]
    async fn flat_character_file_loads() {
        let (_dir, store) = store_with(&[(
            "characters.json",
            r##"[{"id": "rin", "name": "Rin", "color": "#8b5a3c"}]"##,
        )])
        .await;

        assert_eq!(store.character("rin").expect("present").name, "Rin");
    }
}
