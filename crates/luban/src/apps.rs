//! Application records referenced by application entries.
//!
//! A record is created when its entry is created and is never removed by
//! entry deletion.

use async_trait::async_trait;
use entries::AppId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{CoreError, CoreResult};
use crate::storage::SharedStorage;

const APPS: &str = "apps";
const SEQUENCE: &str = "sequence";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    pub id: AppId,
    pub owner_id: String,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub last_published_content: Option<Value>,
}

/// Which copy of an application's content to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadType {
    View,
    Preview,
    Edit,
}

impl LoadType {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        match raw {
            "view" => Ok(LoadType::View),
            "preview" => Ok(LoadType::Preview),
            "edit" => Ok(LoadType::Edit),
            other => Err(CoreError::BadRequest(format!("unrecognized loadType({other})"))),
        }
    }
}

/// How to store new application content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOp {
    Save,
    Publish,
}

impl SaveOp {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        match raw {
            "save" => Ok(SaveOp::Save),
            "publish" => Ok(SaveOp::Publish),
            other => Err(CoreError::BadRequest(format!("unrecognized op({other})"))),
        }
    }
}

impl AppRecord {
    /// View shows what was last published; edit and preview show the
    /// working copy.
    pub fn content_for(&self, load: LoadType) -> Option<&Value> {
        match load {
            LoadType::View => self.last_published_content.as_ref(),
            LoadType::Preview | LoadType::Edit => self.content.as_ref(),
        }
    }
}

#[async_trait]
pub trait AppStore: Send + Sync {
    /// Creates an empty record owned by `owner_id` and returns its id.
    async fn create(&self, owner_id: &str) -> CoreResult<AppId>;

    /// Fails with [`CoreError::AppNotFound`] unless `owner_id` owns `id`.
    async fn find(&self, owner_id: &str, id: AppId) -> CoreResult<AppRecord>;

    async fn update(&self, owner_id: &str, id: AppId, op: SaveOp, content: Value)
        -> CoreResult<()>;
}

/// [`AppStore`] over a [`crate::storage::Storage`]. Ids come from a counter
/// document and start at 1.
pub struct StorageAppStore {
    storage: SharedStorage,
    write_lock: Mutex<()>,
}

impl StorageAppStore {
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self, id: AppId) -> CoreResult<Option<AppRecord>> {
        let key = id.to_string();
        let Some(value) = self.storage.read(&[APPS, &key]).await? else {
            return Ok(None);
        };
        let app = serde_json::from_value(value)
            .map_err(|error| CoreError::Storage(format!("failed to parse app {id}: {error}")))?;
        Ok(Some(app))
    }

    async fn store(&self, app: &AppRecord) -> CoreResult<()> {
        let value = serde_json::to_value(app)
            .map_err(|error| CoreError::Internal(format!("failed to encode app: {error}")))?;
        self.storage.write(&[APPS, &app.id.to_string()], &value).await
    }

    async fn next_id(&self) -> CoreResult<AppId> {
        let current = match self.storage.read(&[APPS, SEQUENCE]).await? {
            Some(value) => value.as_u64().ok_or_else(|| {
                CoreError::Storage(format!("app sequence is not a number: {value}"))
            })?,
            None => 0,
        };
        let next = AppId::try_from(current + 1)
            .map_err(|_| CoreError::Storage("app id space exhausted".to_string()))?;
        self.storage.write(&[APPS, SEQUENCE], &Value::from(next)).await?;
        Ok(next)
    }
}

#[async_trait]
impl AppStore for StorageAppStore {
    async fn create(&self, owner_id: &str) -> CoreResult<AppId> {
        let _guard = self.write_lock.lock().await;
        let id = self.next_id().await?;
        self.store(&AppRecord {
            id,
            owner_id: owner_id.to_string(),
            content: None,
            last_published_content: None,
        })
        .await?;
        tracing::debug!(app_id = id, owner = owner_id, "created app record");
        Ok(id)
    }

    async fn find(&self, owner_id: &str, id: AppId) -> CoreResult<AppRecord> {
        match self.load(id).await? {
            Some(app) if app.owner_id == owner_id => Ok(app),
            _ => Err(CoreError::AppNotFound(id)),
        }
    }

    async fn update(
        &self,
        owner_id: &str,
        id: AppId,
        op: SaveOp,
        content: Value,
    ) -> CoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut app = self.find(owner_id, id).await?;
        match op {
            SaveOp::Save => app.content = Some(content),
            SaveOp::Publish => app.last_published_content = Some(content),
        }
        self.store(&app).await
    }
}
