use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::storage::Storage;

const EXTENSION: &str = ".json";
const STAGING_SUFFIX: &str = ".tmp";

/// One pretty-printed JSON file per key path under `root`.
///
/// `["users", "alice"]` lives at `<root>/users/alice.json`. Writes go to a
/// sibling temp file first and are renamed into place, so a reader never
/// sees a half-written document.
#[derive(Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn build_path(&self, keys: &[&str]) -> CoreResult<PathBuf> {
        if keys.is_empty() {
            return Err(CoreError::BadRequest("storage keys empty".to_string()));
        }
        let mut path = self.root.clone();
        for key in &keys[..keys.len() - 1] {
            validate_key(key)?;
            path.push(key);
        }
        let last = keys[keys.len() - 1];
        validate_key(last)?;
        // unconditional, so `x` and `x.json` never share a file
        path.push(format!("{last}{EXTENSION}"));
        Ok(path)
    }

    async fn ensure_parent_dir(path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| {
                    CoreError::Storage(format!(
                        "failed to create storage directory {}: {error}",
                        parent.display()
                    ))
                })?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn write(&self, keys: &[&str], data: &Value) -> CoreResult<()> {
        let path = self.build_path(keys)?;
        Self::ensure_parent_dir(&path).await?;
        let serialized = serde_json::to_vec_pretty(data)
            .map_err(|error| CoreError::Internal(format!("storage serialize error: {error}")))?;
        let mut staging = path.clone().into_os_string();
        staging.push(STAGING_SUFFIX);
        let staging = PathBuf::from(staging);
        tokio::fs::write(&staging, serialized)
            .await
            .map_err(|error| {
                CoreError::Storage(format!(
                    "failed to write storage file {}: {error}",
                    staging.display()
                ))
            })?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|error| {
                CoreError::Storage(format!(
                    "failed to replace storage file {}: {error}",
                    path.display()
                ))
            })?;
        Ok(())
    }

    async fn read(&self, keys: &[&str]) -> CoreResult<Option<Value>> {
        let path = self.build_path(keys)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(CoreError::Storage(format!(
                    "failed to read storage file {}: {error}",
                    path.display()
                )))
            }
        };
        let value = serde_json::from_slice(&bytes)
            .map_err(|error| CoreError::Storage(format!("storage parse error: {error}")))?;
        Ok(Some(value))
    }
}

fn validate_key(key: &str) -> CoreResult<()> {
    if key.is_empty() || key == "." || key == ".." {
        return Err(CoreError::BadRequest(format!("invalid storage key {key}")));
    }
    if key.contains('/') || key.contains('\\') {
        return Err(CoreError::BadRequest(format!("invalid storage key {key}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_and_reads_json() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf());
        let value = serde_json::json!({ "username": "alice", "rootDir": "[]" });
        storage
            .write(&["users", "alice"], &value)
            .await
            .expect("write");
        let loaded = storage
            .read(&["users", "alice"])
            .await
            .expect("read")
            .expect("value");
        assert_eq!(value, loaded);
        assert!(dir.path().join("users/alice.json").exists());
        assert!(!dir.path().join("users/alice.json.tmp").exists());
    }

    #[tokio::test]
    async fn extension_in_key_gets_its_own_file() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf());
        storage
            .write(&["users", "alice"], &serde_json::json!({ "id": "alice" }))
            .await
            .expect("write alice");

        assert!(storage
            .read(&["users", "alice.json"])
            .await
            .expect("read")
            .is_none());
        storage
            .write(&["users", "alice.json"], &serde_json::json!({ "id": "alice.json" }))
            .await
            .expect("write alice.json");
        let alice = storage
            .read(&["users", "alice"])
            .await
            .expect("read")
            .expect("value");
        assert_eq!(alice["id"], "alice");
        assert!(dir.path().join("users/alice.json.json").exists());
    }

    #[tokio::test]
    async fn missing_file_returns_none() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf());
        let loaded = storage.read(&["users", "missing"]).await.expect("read");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn invalid_key_rejected() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf());
        let value = serde_json::json!({ "ok": true });
        let err = storage
            .write(&["..", "bad"], &value)
            .await
            .expect_err("invalid key");
        match err {
            CoreError::BadRequest(_) => {}
            _ => panic!("expected bad request"),
        }
    }
}
