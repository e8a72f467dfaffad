//! Prompt Context - 提示词限界上下文

mod errors;
mod value_objects;

pub use errors::PromptError;
pub use value_objects::{PromptDraft, PromptText, DEFAULT_MAX_CHARS, EXAMPLE_PROMPT};
