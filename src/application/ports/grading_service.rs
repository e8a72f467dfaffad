//! Grading Service Port - 评分服务抽象
//!
//! 定义异步评分服务的抽象接口，具体实现在 infrastructure/adapters 层
//!
//! 服务契约:
//! - submit: 提交提示词，返回不透明的任务 ID
//! - poll: 查询任务状态（pending / completed / failed / 策略拒绝）
//! - improve: 改写提示词（尽力而为）

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::evaluation::EvaluationResult;

/// 任务 ID 最大长度（字节）
const MAX_TASK_ID_LEN: usize = 256;

/// 任务 ID 直接拼入 URL 路径，不允许出现路径或查询分隔符
const TASK_ID_FORBIDDEN: &[char] = &['/', '\\', '?', '#', '%'];

/// 评分服务错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradingError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: HTTP {status}: {body}")]
    ServiceError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 评分任务 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// 校验服务端返回的任务 ID
    pub fn parse(raw: &str) -> Result<Self, GradingError> {
        if raw.is_empty() {
            return Err(GradingError::InvalidResponse("task_id is empty".to_string()));
        }
        if raw.len() > MAX_TASK_ID_LEN {
            return Err(GradingError::InvalidResponse(format!(
                "task_id is too long ({} bytes)",
                raw.len()
            )));
        }
        if raw
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || TASK_ID_FORBIDDEN.contains(&c))
        {
            return Err(GradingError::InvalidResponse(format!(
                "task_id contains invalid characters: {:?}",
                raw
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 拒绝信号的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionOrigin {
    /// 服务端返回了专用的客户端错误状态码（422）
    StatusCode,
    /// 服务端返回 completed，但结果内嵌 error 字段
    EmbeddedError,
}

/// 服务端对提示词的拒绝
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRejection {
    /// 机器可读的错误码，如 "non_medical_prompt"
    pub error_code: String,
    /// 人类可读的原因
    pub reason: String,
    /// 部分服务端会以 0 分表示拒绝
    pub score: Option<i64>,
    pub suggestions: Vec<String>,
    pub origin: RejectionOrigin,
}

impl PolicyRejection {
    pub fn new(
        error_code: impl Into<String>,
        reason: impl Into<String>,
        origin: RejectionOrigin,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            reason: reason.into(),
            score: None,
            suggestions: Vec::new(),
            origin,
        }
    }

    pub fn with_score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

/// 单次查询得到的任务状态（已严格解析）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// 尚未结束
    Pending,
    /// 评估完成
    Completed(EvaluationResult),
    /// 任务失败
    Failed(String),
    /// 提示词被拒绝
    Rejected(PolicyRejection),
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed(_) => "completed",
            TaskStatus::Failed(_) => "failed",
            TaskStatus::Rejected(_) => "rejected",
        }
    }
}

/// Grading Service Port
///
/// 外部评分服务的抽象接口
#[async_trait]
pub trait GradingServicePort: Send + Sync {
    /// 提交提示词，返回任务 ID
    async fn submit(&self, prompt: &str) -> Result<TaskId, GradingError>;

    /// 查询任务状态
    async fn poll(&self, task_id: &TaskId) -> Result<TaskStatus, GradingError>;

    /// 改写提示词
    async fn improve(&self, prompt: &str) -> Result<String, GradingError>;

    /// 检查评分服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
