//! Evaluation Context - Errors

use thiserror::Error;

/// 评估结果解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultParseError {
    #[error("Result is not a valid JSON object")]
    NotAnObject,

    #[error("Missing top-level fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid field '{field}': {detail}")]
    InvalidField { field: String, detail: String },
}

impl ResultParseError {
    pub fn invalid(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            detail: detail.into(),
        }
    }
}
