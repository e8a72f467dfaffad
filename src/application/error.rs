//! 应用层错误定义
//!
//! 评估流程本身不返回错误（全部在会话边界转换为一次渲染调用），
//! 此处只覆盖历史、主题等辅助操作

use thiserror::Error;

use crate::application::ports::{GradingError, StoreError};
use crate::domain::prompt::PromptError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(#[from] PromptError),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(#[from] StoreError),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(#[from] GradingError),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }
}
