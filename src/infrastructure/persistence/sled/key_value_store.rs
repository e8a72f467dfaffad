//! Sled-based Key-Value Store Implementation
//!
//! 本地存储的持久化实现，键值均为 UTF-8 字符串，每次写入后 flush

use sled::Db;
use std::path::Path;

use crate::application::ports::{KeyValueStorePort, StoreError};

/// Sled 存储配置
#[derive(Debug, Clone)]
pub struct SledStoreConfig {
    /// 数据库路径
    pub db_path: String,
}

impl Default for SledStoreConfig {
    fn default() -> Self {
        Self {
            db_path: "data/promptscore.sled".to_string(),
        }
    }
}

/// Sled 键值存储
pub struct SledKeyValueStore {
    db: Db,
}

impl SledKeyValueStore {
    /// 创建新的存储实例
    pub fn new(config: &SledStoreConfig) -> Result<Self, StoreError> {
        let db = sled::open(&config.db_path).map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        tracing::info!(
            db_path = %config.db_path,
            entries = db.len(),
            "SledKeyValueStore initialized"
        );

        Ok(Self { db })
    }

    /// 打开现有存储
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let config = SledStoreConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
        };
        Self::new(&config)
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map(|_| ())
            .map_err(|e| StoreError::DatabaseError(e.to_string()))
    }
}

impl KeyValueStorePort for SledKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let Some(value) = self
            .db
            .get(key)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?
        else {
            return Ok(None);
        };

        String::from_utf8(value.to_vec())
            .map(Some)
            .map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.db
            .insert(key, value.as_bytes())
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        self.flush()?;
        tracing::debug!(key = %key, size_bytes = value.len(), "Stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.db
            .remove(key)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_store_set_get_remove() {
        let dir = tempdir().unwrap();
        let store = SledKeyValueStore::open(dir.path().join("test.sled")).unwrap();

        assert_eq!(store.get("promptHistory").unwrap(), None);

        store.set("promptHistory", r#"[{"prompt":"Explain sepsis","score":77}]"#).unwrap();
        assert_eq!(
            store.get("promptHistory").unwrap().as_deref(),
            Some(r#"[{"prompt":"Explain sepsis","score":77}]"#)
        );

        store.set("promptHistory", "[]").unwrap();
        assert_eq!(store.get("promptHistory").unwrap().as_deref(), Some("[]"));

        store.remove("promptHistory").unwrap();
        assert_eq!(store.get("promptHistory").unwrap(), None);
    }

    #[test]
    fn test_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.sled");

        {
            let store = SledKeyValueStore::open(&path).unwrap();
            store.set("darkMode", "enabled").unwrap();
        }

        let store = SledKeyValueStore::open(&path).unwrap();
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("enabled"));
    }
}
