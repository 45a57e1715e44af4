//! In-memory storage, used by tests and when no data directory is configured.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::storage::Storage;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<BTreeMap<Vec<String>, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn owned_keys(keys: &[&str]) -> CoreResult<Vec<String>> {
    if keys.is_empty() {
        return Err(CoreError::BadRequest("storage keys empty".to_string()));
    }
    Ok(keys.iter().map(|key| key.to_string()).collect())
}

fn poisoned() -> CoreError {
    CoreError::Storage("memory storage lock poisoned".to_string())
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn write(&self, keys: &[&str], data: &Value) -> CoreResult<()> {
        let keys = owned_keys(keys)?;
        self.data
            .write()
            .map_err(|_| poisoned())?
            .insert(keys, data.clone());
        Ok(())
    }

    async fn read(&self, keys: &[&str]) -> CoreResult<Option<Value>> {
        let keys = owned_keys(keys)?;
        Ok(self.data.read().map_err(|_| poisoned())?.get(&keys).cloned())
    }
}
