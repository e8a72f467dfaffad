//! Prompt Context - Errors

use thiserror::Error;

/// 提示词校验错误
///
/// Display 文本即为提示给用户的内容
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("Please enter a prompt")]
    Empty,

    #[error("Keep prompt under {max} characters")]
    TooLong { len: usize, max: usize },
}
