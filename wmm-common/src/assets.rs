//! Local asset store
//!
//! Song audio, PDF charts and song manifests live as files under
//! `<root>/assets`. Assets are addressed by a relative key such as
//! `songs/Amazing_Grace_1700000000000/song.json`, which is what the
//! `audio_path`, `pdf_path` and `json_path` song columns hold.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// File-backed store for song assets
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for an asset key
    ///
    /// Keys must be relative and stay inside the store: absolute paths and
    /// `..` components are rejected.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let key = key.trim().trim_start_matches('/');
        if key.is_empty() {
            return Err(Error::InvalidInput("Empty asset key".to_string()));
        }

        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(Error::InvalidInput(format!("Invalid asset key: {}", key)));
        }

        Ok(self.root.join(relative))
    }

    /// Serialize `value` as pretty JSON at `key`, creating parent folders
    pub async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<PathBuf> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&path, bytes).await?;
        debug!("Wrote asset {}", path.display());
        Ok(path)
    }

    /// Read and deserialize the JSON asset at `key`
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let path = self.path_for(key)?;
        let bytes = tokio::fs::read(&path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    /// Remove the asset at `key`
    ///
    /// Returns `false` when there was nothing to remove. An emptied parent
    /// folder is removed as well.
    pub async fn release(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        debug!("Released asset {}", path.display());

        if let Some(parent) = path.parent() {
            if parent != self.root {
                // Fails harmlessly when other files remain
                let _ = tokio::fs::remove_dir(parent).await;
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_path_for_rejects_escapes() {
        let store = AssetStore::new("/srv/assets");
        assert_eq!(
            store.path_for("songs/a/song.json").unwrap(),
            PathBuf::from("/srv/assets/songs/a/song.json")
        );
        assert_eq!(
            store.path_for("/songs/a.mp3").unwrap(),
            PathBuf::from("/srv/assets/songs/a.mp3")
        );
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("songs/../../x").is_err());
        assert!(store.path_for("  ").is_err());
    }

    #[tokio::test]
    async fn test_write_and_release() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::new(dir.path());

        store
            .write_json("songs/Test_1/song.json", &json!({"title": "Test"}))
            .await
            .unwrap();
        assert!(store.exists("songs/Test_1/song.json").await.unwrap());

        let written = std::fs::read_to_string(dir.path().join("songs/Test_1/song.json")).unwrap();
        assert!(written.contains("\"title\": \"Test\""));
        let read: serde_json::Value = store.read_json("songs/Test_1/song.json").await.unwrap();
        assert_eq!(read, json!({"title": "Test"}));

        assert!(store.release("songs/Test_1/song.json").await.unwrap());
        assert!(!dir.path().join("songs/Test_1").exists());
        assert!(!store.release("songs/Test_1/song.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_json_errors() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::new(dir.path());

        let missing = store.read_json::<serde_json::Value>("songs/none.json").await;
        assert!(matches!(missing, Err(Error::Io(_))));

        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let invalid = store.read_json::<serde_json::Value>("bad.json").await;
        assert!(matches!(invalid, Err(Error::Json(_))));
    }
}
