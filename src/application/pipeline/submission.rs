//! Task Submission - 提交评估任务
//!
//! 本层不做重试，提交失败直接返回给调用方

use std::sync::Arc;

use crate::application::ports::{GradingError, GradingServicePort, TaskId};
use crate::domain::prompt::PromptText;

/// 任务提交器
pub struct TaskSubmitter {
    service: Arc<dyn GradingServicePort>,
}

impl TaskSubmitter {
    pub fn new(service: Arc<dyn GradingServicePort>) -> Self {
        Self { service }
    }

    pub async fn submit(&self, prompt: &PromptText) -> Result<TaskId, GradingError> {
        tracing::debug!(prompt_chars = prompt.char_count(), "Submitting prompt");

        match self.service.submit(prompt.as_str()).await {
            Ok(task_id) => {
                tracing::info!(task_id = %task_id, "Evaluation task submitted");
                Ok(task_id)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to submit evaluation task");
                Err(e)
            }
        }
    }
}
