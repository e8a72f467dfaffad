//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（GradingService、EvaluationView、KeyValueStore）
//! - pipeline: 提交 -> 轮询 -> 分类
//! - session: 评估会话（编排器）
//! - history_repository: 历史记录与主题的持久化
//! - error: 应用层错误定义

pub mod error;
pub mod history_repository;
pub mod pipeline;
pub mod ports;
pub mod session;

// Re-exports
pub use error::ApplicationError;

pub use history_repository::{HistoryRepository, HISTORY_KEY, THEME_KEY};

pub use pipeline::{
    Classification, PollConfig, Rejection, RejectionKind, ResultClassifier, TaskOutcome,
    TaskPoller, TaskSubmitter,
};

pub use ports::{
    // Grading service
    GradingError,
    GradingServicePort,
    PolicyRejection,
    RejectionOrigin,
    TaskId,
    TaskStatus,
    // Key-value store
    KeyValueStorePort,
    StoreError,
    // View
    EvaluationViewPort,
};

pub use session::{EvaluationReport, EvaluationSession, ImproveReport, SessionConfig};
