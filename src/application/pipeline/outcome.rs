//! Task Outcome - 任务结果
//!
//! 轮询边界之后不再出现未校验的动态对象，只有强类型的 TaskOutcome

use crate::application::ports::{GradingError, PolicyRejection, TaskStatus};
use crate::domain::evaluation::EvaluationResult;

/// 任务结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// 尚未结束，继续轮询
    Pending,
    /// 评估完成
    Completed(EvaluationResult),
    /// 任务失败
    Failed(String),
    /// 服务端拒绝了提示词（422 或 completed 内嵌 error）
    RejectedByPolicy(PolicyRejection),
    /// 网络或 HTTP 层错误
    TransportError(String),
    /// 成功状态码但响应体无法解析或违反契约
    Malformed(String),
    /// 轮询次数耗尽
    TimedOut,
}

impl TaskOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskOutcome::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOutcome::Pending => "pending",
            TaskOutcome::Completed(_) => "completed",
            TaskOutcome::Failed(_) => "failed",
            TaskOutcome::RejectedByPolicy(_) => "rejected_by_policy",
            TaskOutcome::TransportError(_) => "transport_error",
            TaskOutcome::Malformed(_) => "malformed",
            TaskOutcome::TimedOut => "timed_out",
        }
    }

    /// 提交阶段的任何错误都视为传输错误
    pub fn from_submit_error(err: GradingError) -> Self {
        TaskOutcome::TransportError(err.to_string())
    }
}

impl From<TaskStatus> for TaskOutcome {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Pending => TaskOutcome::Pending,
            TaskStatus::Completed(result) => TaskOutcome::Completed(result),
            TaskStatus::Failed(reason) => TaskOutcome::Failed(reason),
            TaskStatus::Rejected(rejection) => TaskOutcome::RejectedByPolicy(rejection),
        }
    }
}

impl From<GradingError> for TaskOutcome {
    fn from(err: GradingError) -> Self {
        match err {
            GradingError::InvalidResponse(detail) => TaskOutcome::Malformed(detail),
            other => TaskOutcome::TransportError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            TaskOutcome::from(GradingError::InvalidResponse("bad json".into())),
            TaskOutcome::Malformed("bad json".into())
        );
        assert_eq!(
            TaskOutcome::from(GradingError::Timeout),
            TaskOutcome::TransportError("Request timeout".into())
        );
        assert_eq!(
            TaskOutcome::from_submit_error(GradingError::InvalidResponse("no task_id".into())),
            TaskOutcome::TransportError("Invalid response: no task_id".into())
        );
    }

    #[test]
    fn test_terminal() {
        assert!(!TaskOutcome::Pending.is_terminal());
        assert!(TaskOutcome::TimedOut.is_terminal());
        assert!(TaskOutcome::Failed("x".into()).is_terminal());
    }
}
