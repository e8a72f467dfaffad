//! History Repository - 历史记录与主题偏好的持久化
//!
//! 存储布局:
//! - "promptHistory": `[{"prompt": ..., "score": ...}, ...]`（最近优先）
//! - "darkMode": "enabled" / "disabled"
//!
//! 读取到损坏的值时记录警告并视为默认值（空历史 / 浅色主题）

use std::sync::Arc;

use crate::application::ports::{KeyValueStorePort, StoreError};
use crate::domain::history::{HistoryEntry, PromptHistory, Theme};

pub const HISTORY_KEY: &str = "promptHistory";
pub const THEME_KEY: &str = "darkMode";

/// 历史记录仓储
#[derive(Clone)]
pub struct HistoryRepository {
    store: Arc<dyn KeyValueStorePort>,
    capacity: usize,
}

impl HistoryRepository {
    pub fn new(store: Arc<dyn KeyValueStorePort>, capacity: usize) -> Self {
        Self { store, capacity }
    }

    /// 加载历史记录
    pub fn load_history(&self) -> Result<PromptHistory, StoreError> {
        let Some(raw) = self.store.get(HISTORY_KEY)? else {
            return Ok(PromptHistory::new(self.capacity));
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => Ok(PromptHistory::from_entries(entries, self.capacity)),
            Err(e) => {
                tracing::warn!(key = HISTORY_KEY, error = %e, "Stored history is corrupt, starting empty");
                Ok(PromptHistory::new(self.capacity))
            }
        }
    }

    /// 保存历史记录
    pub fn save_history(&self, history: &PromptHistory) -> Result<(), StoreError> {
        let json = serde_json::to_string(&history.to_entries())
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        self.store.set(HISTORY_KEY, &json)?;
        tracing::debug!(entries = history.len(), "History saved");
        Ok(())
    }

    /// 清空已保存的历史记录
    pub fn clear_history(&self) -> Result<(), StoreError> {
        self.store.remove(HISTORY_KEY)
    }

    pub fn load_theme(&self) -> Result<Theme, StoreError> {
        let Some(raw) = self.store.get(THEME_KEY)? else {
            return Ok(Theme::default());
        };

        Ok(Theme::from_stored(&raw).unwrap_or_else(|| {
            tracing::warn!(key = THEME_KEY, value = %raw, "Unknown theme preference, using default");
            Theme::default()
        }))
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.store.set(THEME_KEY, theme.as_stored())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryKeyValueStore;

    fn repo() -> (Arc<InMemoryKeyValueStore>, HistoryRepository) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let repo = HistoryRepository::new(store.clone(), 10);
        (store, repo)
    }

    #[test]
    fn test_history_round_trip() {
        let (store, repo) = repo();

        let mut history = PromptHistory::new(10);
        history.record("Explain metformin dosing", 72);
        history.record("Describe sepsis triage steps", 91);
        repo.save_history(&history).unwrap();

        let raw = store.get(HISTORY_KEY).unwrap().unwrap();
        assert_eq!(
            raw,
            r#"[{"prompt":"Describe sepsis triage steps","score":91},{"prompt":"Explain metformin dosing","score":72}]"#
        );

        let loaded = repo.load_history().unwrap();
        assert_eq!(loaded, history);
        assert_eq!(loaded.get(0).unwrap().prompt, "Describe sepsis triage steps");
        assert_eq!(loaded.get(0).unwrap().score, 91);
    }

    #[test]
    fn test_missing_and_corrupt_history() {
        let (store, repo) = repo();
        assert!(repo.load_history().unwrap().is_empty());

        store.set(HISTORY_KEY, "{not json").unwrap();
        assert!(repo.load_history().unwrap().is_empty());
    }

    #[test]
    fn test_clear_history() {
        let (store, repo) = repo();
        let mut history = PromptHistory::new(10);
        history.record("Explain ACE inhibitors", 80);
        repo.save_history(&history).unwrap();

        repo.clear_history().unwrap();
        assert!(store.get(HISTORY_KEY).unwrap().is_none());
        assert!(repo.load_history().unwrap().is_empty());
    }

    #[test]
    fn test_theme_persistence() {
        let (store, repo) = repo();
        assert_eq!(repo.load_theme().unwrap(), Theme::Light);

        repo.save_theme(Theme::Dark).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("enabled"));
        assert_eq!(repo.load_theme().unwrap(), Theme::Dark);

        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(repo.load_theme().unwrap(), Theme::Light);
    }
}
