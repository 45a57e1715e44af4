//! Operations on the current user's entry tree.

use std::sync::Arc;

use entries::{validate_entry_name, AppId, DirPath, Entry, NewEntry, NewEntryKind, Tree};
use serde::Serialize;
use serde_json::Value;

use crate::apps::{AppStore, LoadType, SaveOp};
use crate::error::{CoreError, CoreResult};
use crate::sync::{LoadedTree, TreeSynchronizer};
use crate::users::{UserRecord, UserStore};

/// The authenticated caller, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub avatar_url: Option<String>,
    pub root_dir: Tree,
}

pub struct EntryService {
    sync: TreeSynchronizer,
    apps: Arc<dyn AppStore>,
    auto_provision: bool,
}

impl EntryService {
    pub fn new(users: Arc<dyn UserStore>, apps: Arc<dyn AppStore>) -> Self {
        Self {
            sync: TreeSynchronizer::new(users),
            apps,
            auto_provision: false,
        }
    }

    pub fn with_auto_provision(mut self, enabled: bool) -> Self {
        self.auto_provision = enabled;
        self
    }

    /// Returns the caller's record, creating an empty one first when
    /// auto-provisioning is on.
    pub async fn ensure_user(&self, user: &CurrentUser) -> CoreResult<UserRecord> {
        match self.sync.users().get(&user.id).await {
            Err(CoreError::UserNotFound(_)) if self.auto_provision => {
                let record = self
                    .sync
                    .users()
                    .insert(UserRecord::new(&user.id, &user.name))
                    .await?;
                tracing::info!(user = %user.id, "provisioned user record");
                Ok(record)
            }
            found => found,
        }
    }

    async fn load(&self, user: &CurrentUser) -> CoreResult<LoadedTree> {
        match self.sync.load(&user.id).await {
            Err(CoreError::UserNotFound(_)) if self.auto_provision => {
                self.ensure_user(user).await?;
                self.sync.load(&user.id).await
            }
            loaded => loaded,
        }
    }

    /// Creates `entry` inside `dir`. Applications get a new app record owned
    /// by `user`.
    #[tracing::instrument(skip_all, fields(user = %user.id, dir = dir, entry = %entry.name))]
    pub async fn create_entry(
        &self,
        user: &CurrentUser,
        dir: &str,
        entry: NewEntry,
    ) -> CoreResult<Entry> {
        let dir = DirPath::parse("dir", dir)?;
        validate_entry_name("entry.name", &entry.name)?;

        let _guard = self.sync.lock(&user.id).await?;
        let LoadedTree {
            mut tree, version, ..
        } = self.load(user).await?;
        let slot = tree.reserve(&dir, &entry.name)?;

        let app_id = match entry.kind {
            NewEntryKind::Application => Some(self.apps.create(&user.id).await?),
            NewEntryKind::Directory => None,
        };
        let entry = entry.into_entry(app_id)?;
        tree.insert(slot, entry.clone())?;

        if let Err(error) = self.sync.save(&user.id, &tree, version).await {
            if let Some(app_id) = app_id {
                tracing::warn!(app_id, "tree not saved, app record is unreferenced");
            }
            return Err(error);
        }
        tracing::info!(kind = %entry.entry_type(), "created entry");
        Ok(entry)
    }

    /// Removes `name` from `dir`. Absent names succeed without a write.
    #[tracing::instrument(skip_all, fields(user = %user.id, dir = dir, entry = name))]
    pub async fn delete_entry(&self, user: &CurrentUser, dir: &str, name: &str) -> CoreResult<()> {
        let dir = DirPath::parse("dir", dir)?;
        validate_entry_name("entryName", name)?;

        let _guard = self.sync.lock(&user.id).await?;
        let LoadedTree {
            mut tree, version, ..
        } = self.load(user).await?;
        let Some(removed) = tree.delete_entry(&dir, name)? else {
            tracing::debug!("no such entry, nothing to delete");
            return Ok(());
        };

        self.sync.save(&user.id, &tree, version).await?;
        if let Some(app_id) = removed.app_id() {
            // app records outlive their entries
            tracing::info!(app_id, "deleted application entry, app record kept");
        } else {
            tracing::info!(kind = %removed.entry_type(), "deleted entry");
        }
        Ok(())
    }

    pub async fn get_tree(&self, user: &CurrentUser) -> CoreResult<Tree> {
        Ok(self.load(user).await?.tree)
    }

    pub async fn list_directory(&self, user: &CurrentUser, dir: &str) -> CoreResult<Vec<Entry>> {
        let dir = DirPath::parse("dir", dir)?;
        let loaded = self.load(user).await?;
        Ok(loaded.tree.directory(&dir)?.to_vec())
    }

    pub async fn profile(&self, user: &CurrentUser) -> CoreResult<UserProfile> {
        let LoadedTree { user, tree, .. } = self.load(user).await?;
        Ok(UserProfile {
            username: user.username,
            avatar_url: user.avatar_url,
            root_dir: tree,
        })
    }

    pub async fn load_app(
        &self,
        user: &CurrentUser,
        app_id: AppId,
        load: LoadType,
    ) -> CoreResult<Option<Value>> {
        let app = self.apps.find(&user.id, app_id).await?;
        Ok(app.content_for(load).cloned())
    }

    #[tracing::instrument(skip(self, user, content), fields(user = %user.id))]
    pub async fn save_app(
        &self,
        user: &CurrentUser,
        app_id: AppId,
        op: SaveOp,
        content: Value,
    ) -> CoreResult<()> {
        self.apps.update(&user.id, app_id, op, content).await?;
        tracing::info!("saved app content");
        Ok(())
    }
}
