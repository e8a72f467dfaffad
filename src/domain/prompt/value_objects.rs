//! Prompt Context - Value Objects

use serde::{Deserialize, Serialize};

use super::PromptError;

/// 提示词默认最大字符数
pub const DEFAULT_MAX_CHARS: usize = 500;

/// "加载示例" 使用的固定提示词
pub const EXAMPLE_PROMPT: &str =
    "Explain the recommended treatment for a newly diagnosed diabetic patient with hypertension.";

/// 已校验的提示词
///
/// 不变量:
/// - 已去除首尾空白
/// - 非空
/// - 字符数不超过 max_chars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptText(String);

impl PromptText {
    pub fn parse(raw: &str, max_chars: usize) -> Result<Self, PromptError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PromptError::Empty);
        }
        let len = trimmed.chars().count();
        if len > max_chars {
            return Err(PromptError::TooLong {
                len,
                max: max_chars,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PromptText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 输入框草稿（纯瞬时状态）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDraft {
    text: String,
    improved: Option<String>,
    max_chars: usize,
}

impl PromptDraft {
    pub fn new(max_chars: usize) -> Self {
        Self {
            text: String::new(),
            improved: None,
            max_chars,
        }
    }

    /// 设置文本，超出上限的部分被截断
    pub fn set_text(&mut self, text: &str) {
        self.text = text.chars().take(self.max_chars).collect();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.improved = None;
    }

    pub fn load_example(&mut self) {
        self.set_text(EXAMPLE_PROMPT);
    }

    pub fn set_improved(&mut self, improved: impl Into<String>) {
        self.improved = Some(improved.into());
    }

    pub fn improved(&self) -> Option<&str> {
        self.improved.as_deref()
    }

    /// 用改写后的版本替换当前文本
    pub fn accept_improved(&mut self) -> bool {
        match self.improved.take() {
            Some(improved) => {
                self.set_text(&improved);
                true
            }
            None => false,
        }
    }

    /// 字数计数，如 "42/500"
    pub fn char_counter(&self) -> String {
        format!("{}/{}", self.text.chars().count(), self.max_chars)
    }
}

impl Default for PromptDraft {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}
