//! Evaluation Context - 评估限界上下文
//!
//! 职责:
//! - 评分维度与满分定义
//! - 评估结果的严格解析与规则检查
//! - 评级与分档

mod errors;
mod result;
mod value_objects;

pub use errors::ResultParseError;
pub use result::{EvaluationResult, RubricIssue, DEFAULT_SCORE_TOLERANCE};
pub(crate) use result::coerce_int;
pub use value_objects::{Criterion, CriterionScores, HistoryTier, Rating};
