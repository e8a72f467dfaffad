//! Event Publisher Implementation
//!
//! 将界面调用转换为事件并广播（`--json` 模式与测试使用）

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::application::ports::EvaluationViewPort;
use crate::domain::evaluation::{EvaluationResult, Rating};
use crate::domain::history::{HistoryEntry, PromptHistory, Theme};

/// 界面事件类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ViewEvent {
    /// 忙碌状态变更
    Busy { busy: bool },
    /// 清除上一次的展示
    Cleared,
    /// 评估通过
    Accepted {
        result: EvaluationResult,
        rating: Rating,
        display_score: i64,
    },
    /// 评估被拒绝或出错
    Rejected { title: String, message: String },
    /// 输入校验提示
    Alert { message: String },
    /// 历史记录刷新
    History { entries: Vec<HistoryEntry> },
    /// 改写后的提示词
    Improved { prompt: String },
    /// 主题变更
    Theme { theme: Theme },
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<ViewEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { channel: tx }
    }

    /// 订阅界面事件
    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.channel.subscribe()
    }

    fn publish(&self, event: ViewEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::debug!(error = %e, "Failed to publish view event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationViewPort for EventPublisher {
    fn set_busy(&self, busy: bool) {
        self.publish(ViewEvent::Busy { busy });
    }

    fn clear(&self) {
        self.publish(ViewEvent::Cleared);
    }

    fn render_accepted(&self, result: &EvaluationResult) {
        self.publish(ViewEvent::Accepted {
            result: result.clone(),
            rating: result.rating(),
            display_score: result.display_score(),
        });
    }

    fn render_rejected(&self, message: &str, title: &str) {
        self.publish(ViewEvent::Rejected {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn alert(&self, message: &str) {
        self.publish(ViewEvent::Alert {
            message: message.to_string(),
        });
    }

    fn render_history(&self, history: &PromptHistory) {
        self.publish(ViewEvent::History {
            entries: history.to_entries(),
        });
    }

    fn render_improved(&self, improved: &str) {
        self.publish(ViewEvent::Improved {
            prompt: improved.to_string(),
        });
    }

    fn render_theme(&self, theme: Theme) {
        self.publish(ViewEvent::Theme { theme });
    }
}
