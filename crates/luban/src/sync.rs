//! Whole-tree load and save against the user store.
//!
//! Every mutation is a read-modify-write of the full tree. Writers for the
//! same user are serialized by a per-user lock, and each save carries the
//! version seen at load so the store can refuse a write based on stale data.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use entries::Tree;
use tokio::sync::OwnedMutexGuard;

use crate::error::{CoreError, CoreResult};
use crate::users::{UserRecord, UserStore};

/// A tree together with the record and version it was read from.
#[derive(Debug, Clone)]
pub struct LoadedTree {
    pub user: UserRecord,
    pub tree: Tree,
    pub version: u64,
}

#[derive(Default)]
struct UserLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    async fn acquire(&self, user_id: &str) -> CoreResult<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|_| CoreError::Internal("user lock table poisoned".to_string()))?;
            // drop locks nobody holds or waits on
            locks.retain(|id, lock| id == user_id || Arc::strong_count(lock) > 1);
            locks.entry(user_id.to_string()).or_default().clone()
        };
        Ok(lock.lock_owned().await)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }
}

pub struct TreeSynchronizer {
    users: Arc<dyn UserStore>,
    locks: UserLocks,
}

impl TreeSynchronizer {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self {
            users,
            locks: UserLocks::default(),
        }
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Holds off other writers for `user_id` until the guard is dropped.
    pub async fn lock(&self, user_id: &str) -> CoreResult<OwnedMutexGuard<()>> {
        self.locks.acquire(user_id).await
    }

    /// Reads the user's tree. A missing or empty blob is an empty tree.
    pub async fn load(&self, user_id: &str) -> CoreResult<LoadedTree> {
        let user = self.users.get(user_id).await?;
        let tree = Tree::from_blob(user.root_dir.as_deref())?;
        Ok(LoadedTree {
            version: user.tree_version,
            tree,
            user,
        })
    }

    /// Overwrites the stored tree. Fails with [`CoreError::Conflict`] if the
    /// stored version is no longer `expected_version`.
    pub async fn save(&self, user_id: &str, tree: &Tree, expected_version: u64) -> CoreResult<u64> {
        let blob = tree.to_blob()?;
        let version = self
            .users
            .update_tree(user_id, blob, expected_version)
            .await?;
        tracing::debug!(user = user_id, version, "saved entry tree");
        Ok(version)
    }
}
