//! History Context - Aggregate Root

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::domain::evaluation::HistoryTier;

/// 默认保留的历史条数
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// 历史记录条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub prompt: String,
    pub score: i64,
}

impl HistoryEntry {
    pub fn new(prompt: impl Into<String>, score: i64) -> Self {
        Self {
            prompt: prompt.into(),
            score,
        }
    }

    pub fn tier(&self) -> HistoryTier {
        HistoryTier::from_score(self.score)
    }
}

/// 评估历史聚合根
///
/// 不变量:
/// - 最新的条目在最前
/// - 条目数不超过 capacity，超出时静默淘汰最旧条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl PromptHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 从已有条目恢复（按最新在前的顺序），超出容量的部分丢弃
    pub fn from_entries(entries: Vec<HistoryEntry>, capacity: usize) -> Self {
        let mut entries: VecDeque<HistoryEntry> = entries.into();
        entries.truncate(capacity);
        Self { entries, capacity }
    }

    /// 记录一次成功的评估
    pub fn record(&mut self, prompt: impl Into<String>, score: i64) {
        self.entries.push_front(HistoryEntry::new(prompt, score));
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 持久化用的条目列表
    pub fn to_entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for PromptHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
