//! Evaluation View Port - 展示层抽象
//!
//! 评估流程只通过此接口与界面交互（渲染结果、展示错误、禁用/启用控件）

use crate::domain::evaluation::EvaluationResult;
use crate::domain::history::{PromptHistory, Theme};

/// Evaluation View Port
pub trait EvaluationViewPort: Send + Sync {
    /// 禁用/启用输入与操作按钮，并显示/隐藏加载提示
    fn set_busy(&self, busy: bool);

    /// 清除上一次的结果和错误
    fn clear(&self);

    /// 展示评估结果
    fn render_accepted(&self, result: &EvaluationResult);

    /// 展示拒绝或错误信息
    fn render_rejected(&self, message: &str, title: &str);

    /// 阻塞式提示（用于输入校验失败）
    fn alert(&self, message: &str);

    /// 刷新历史记录
    fn render_history(&self, _history: &PromptHistory) {}

    /// 展示改写后的提示词
    fn render_improved(&self, _improved: &str) {}

    /// 主题变更
    fn render_theme(&self, _theme: Theme) {}
}
