//! History Context - 评估历史限界上下文
//!
//! 职责:
//! - 最近评估记录（环形缓冲）
//! - 界面主题偏好

mod aggregate;
mod theme;

pub use aggregate::{HistoryEntry, PromptHistory, DEFAULT_HISTORY_CAPACITY};
pub use theme::Theme;
