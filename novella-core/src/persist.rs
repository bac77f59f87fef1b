//! Save and settings persistence.
//!
//! The engine talks to storage through the `BlobStore` gateway: opaque
//! key-to-JSON reads and writes. Two keys exist — the autosave slot and the
//! settings blob. Persistence failures are reported as `bool`/`Option`
//! results and never propagate past this module; settings in particular
//! degrade to hardcoded defaults so they are never unrecoverable.

use crate::state::{SessionState, Settings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// The sole game save slot.
pub const AUTOSAVE_KEY: &str = "autosave";

/// Key for the settings blob, independent of game saves.
pub const SETTINGS_KEY: &str = "settings";

/// Save format version tag written into every autosave.
pub const SAVE_VERSION: &str = "1.0.0";

/// Errors from blob storage operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque key-blob storage gateway.
///
/// Absence is not an error: loading a missing key yields `None` and
/// deleting one succeeds.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn save_blob(&self, key: &str, json: &str) -> Result<(), PersistError>;
    async fn load_blob(&self, key: &str) -> Result<Option<String>, PersistError>;
    async fn delete_blob(&self, key: &str) -> Result<(), PersistError>;
}

/// Filesystem blob store: one `<key>.json` file per key under a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl BlobStore for FileStore {
    async fn save_blob(&self, key: &str, json: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.blob_path(key), json).await?;
        Ok(())
    }

    async fn load_blob(&self, key: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.blob_path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_blob(&self, key: &str) -> Result<(), PersistError> {
        match fs::remove_file(self.blob_path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// An autosave at rest: the session snapshot stamped with a timestamp and a
/// format version. Readers tolerate unknown extra fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    #[serde(flatten)]
    pub state: SessionState,
    pub timestamp: String,
    pub version: String,
}

/// The settings blob at rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(flatten)]
    pub settings: Settings,
    pub timestamp: String,
}

/// Write the session snapshot to the autosave slot. Never throws; a failed
/// write is logged and reported as `false`.
pub async fn save_game(store: &dyn BlobStore, state: &SessionState) -> bool {
    let save = SaveFile {
        state: state.clone(),
        timestamp: unix_timestamp().to_string(),
        version: SAVE_VERSION.to_string(),
    };

    let json = match serde_json::to_string_pretty(&save) {
        Ok(json) => json,
        Err(err) => {
            warn!("failed to serialize save: {err}");
            return false;
        }
    };

    match store.save_blob(AUTOSAVE_KEY, &json).await {
        Ok(()) => true,
        Err(err) => {
            warn!("failed to write autosave: {err}");
            false
        }
    }
}

/// Read the autosave slot. Absence and failure both yield `None`; failure
/// is logged.
pub async fn load_game(store: &dyn BlobStore) -> Option<SaveFile> {
    let json = match store.load_blob(AUTOSAVE_KEY).await {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(err) => {
            warn!("failed to read autosave: {err}");
            return None;
        }
    };

    match serde_json::from_str(&json) {
        Ok(save) => Some(save),
        Err(err) => {
            warn!("malformed autosave: {err}");
            None
        }
    }
}

/// Whether an autosave blob exists.
pub async fn has_save(store: &dyn BlobStore) -> bool {
    matches!(store.load_blob(AUTOSAVE_KEY).await, Ok(Some(_)))
}

/// Remove the autosave slot. Idempotent; absence is success.
pub async fn delete_save(store: &dyn BlobStore) -> bool {
    match store.delete_blob(AUTOSAVE_KEY).await {
        Ok(()) => true,
        Err(err) => {
            warn!("failed to delete autosave: {err}");
            false
        }
    }
}

/// Persist settings under their own key, independent of game saves.
pub async fn save_settings(store: &dyn BlobStore, settings: &Settings) -> bool {
    let file = SettingsFile {
        settings: settings.clone(),
        timestamp: unix_timestamp().to_string(),
    };

    let json = match serde_json::to_string_pretty(&file) {
        Ok(json) => json,
        Err(err) => {
            warn!("failed to serialize settings: {err}");
            return false;
        }
    };

    match store.save_blob(SETTINGS_KEY, &json).await {
        Ok(()) => true,
        Err(err) => {
            warn!("failed to write settings: {err}");
            false
        }
    }
}

/// Read settings, falling back to the hardcoded defaults on absence or any
/// failure. Settings must never be unrecoverable.
pub async fn load_settings(store: &dyn BlobStore) -> Settings {
    let json = match store.load_blob(SETTINGS_KEY).await {
        Ok(Some(json)) => json,
        Ok(None) => {
            debug!("no settings blob, using defaults");
            return Settings::default();
        }
        Err(err) => {
            warn!("failed to read settings, using defaults: {err}");
            return Settings::default();
        }
    };

    match serde_json::from_str::<SettingsFile>(&json) {
        Ok(file) => file.settings,
        Err(err) => {
            warn!("malformed settings, using defaults: {err}");
            Settings::default()
        }
    }
}

/// Seconds since the Unix epoch.
pub(crate) fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn file_store_round_trips_a_blob() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path());

        store
            .save_blob("autosave", r#"{"k": 1}"#)
            .await
            .expect("save");

        let loaded = store.load_blob("autosave").await.expect("load");
        assert_eq!(loaded.as_deref(), Some(r#"{"k": 1}"#));
    }

    #[tokio::test]
    async fn missing_blob_loads_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path());

        assert!(store.load_blob("autosave").await.expect("load").is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path());

        store.save_blob("autosave", "{}").await.expect("save");
        assert!(delete_save(&store).await);
        assert!(delete_save(&store).await);
        assert!(!has_save(&store).await);
    }

    #[tokio::test]
    async fn save_file_carries_version_and_timestamp_at_top_level() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path());

        let state = SessionState::default();
        assert!(save_game(&store, &state).await);

        let raw = store
            .load_blob(AUTOSAVE_KEY)
            .await
            .expect("load")
            .expect("present");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");

        assert_eq!(value["version"], SAVE_VERSION);
        assert!(value.get("timestamp").is_some());
        assert!(value.get("currentScene").is_some());
    }

    #[tokio::test]
    async fn load_tolerates_unknown_extra_fields() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path());

        let mut value =
            serde_json::to_value(&SessionState::default()).expect("serialize");
        value["timestamp"] = "0".into();
        value["version"] = SAVE_VERSION.into();
        value["someFutureField"] = serde_json::json!({"x": 1});
        store
            .save_blob(AUTOSAVE_KEY, &value.to_string())
            .await
            .expect("save");

        assert!(load_game(&store).await.is_some());
    }

    #[tokio::test]
    async fn settings_degrade_to_exact_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path());

        let settings = load_settings(&store).await;
        assert_eq!(settings.volume.master, 0.8);
        assert_eq!(settings.volume.music, 0.7);
        assert_eq!(settings.volume.sfx, 0.8);
        assert!(!settings.display.fullscreen);
        assert_eq!(settings.display.text_speed, 50);
    }

    #[tokio::test]
    async fn settings_round_trip_independently_of_saves() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path());

        let mut settings = Settings::default();
        settings.volume.music = 0.25;
        settings.display.fullscreen = true;
        assert!(save_settings(&store, &settings).await);

        assert_eq!(load_settings(&store).await, settings);
        assert!(!has_save(&store).await);
    }
}
