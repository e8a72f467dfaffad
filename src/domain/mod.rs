//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Evaluation Context: 评分维度、评估结果、评级
//! - Prompt Context: 提示词校验与草稿
//! - History Context: 评估历史与主题偏好

pub mod evaluation;
pub mod history;
pub mod prompt;
