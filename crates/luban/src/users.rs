//! User records and the store holding them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::storage::SharedStorage;

const USERS: &str = "users";
const EMPTY_TREE: &str = "[]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Serialized entry tree. Opaque to the store.
    #[serde(default)]
    pub root_dir: Option<String>,
    /// Bumped on every tree write.
    #[serde(default)]
    pub tree_version: u64,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            avatar_url: None,
            root_dir: Some(EMPTY_TREE.to_string()),
            tree_version: 0,
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`CoreError::UserNotFound`] when there is no such user.
    async fn get(&self, id: &str) -> CoreResult<UserRecord>;

    /// Stores `user` unless a record with the same id exists. Returns the
    /// record that is stored afterwards.
    async fn insert(&self, user: UserRecord) -> CoreResult<UserRecord>;

    /// Replaces the tree blob only if the stored version still equals
    /// `expected_version`; otherwise fails with [`CoreError::Conflict`].
    /// Returns the new version.
    async fn update_tree(&self, id: &str, blob: String, expected_version: u64) -> CoreResult<u64>;
}

/// [`UserStore`] over a [`crate::storage::Storage`], one document per user.
pub struct StorageUserStore {
    storage: SharedStorage,
    write_lock: Mutex<()>,
}

impl StorageUserStore {
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self, id: &str) -> CoreResult<Option<UserRecord>> {
        let Some(value) = self.storage.read(&[USERS, id]).await? else {
            return Ok(None);
        };
        let user: UserRecord = serde_json::from_value(value)
            .map_err(|error| CoreError::Storage(format!("failed to parse user {id}: {error}")))?;
        if user.id != id {
            return Err(CoreError::Storage(format!(
                "record for user {id} belongs to {}",
                user.id
            )));
        }
        Ok(Some(user))
    }

    async fn store(&self, user: &UserRecord) -> CoreResult<()> {
        let value = serde_json::to_value(user)
            .map_err(|error| CoreError::Internal(format!("failed to encode user: {error}")))?;
        self.storage.write(&[USERS, &user.id], &value).await
    }
}

#[async_trait]
impl UserStore for StorageUserStore {
    async fn get(&self, id: &str) -> CoreResult<UserRecord> {
        self.load(id)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(id.to_string()))
    }

    async fn insert(&self, user: UserRecord) -> CoreResult<UserRecord> {
        let _guard = self.write_lock.lock().await;
        if let Some(existing) = self.load(&user.id).await? {
            return Ok(existing);
        }
        self.store(&user).await?;
        Ok(user)
    }

    async fn update_tree(&self, id: &str, blob: String, expected_version: u64) -> CoreResult<u64> {
        let _guard = self.write_lock.lock().await;
        let mut user = self
            .load(id)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(id.to_string()))?;
        if user.tree_version != expected_version {
            return Err(CoreError::Conflict(id.to_string()));
        }
        user.root_dir = Some(blob);
        user.tree_version += 1;
        self.store(&user).await?;
        Ok(user.tree_version)
    }
}
