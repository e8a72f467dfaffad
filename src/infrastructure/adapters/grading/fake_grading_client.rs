//! Fake Grading Client - 用于测试与离线演示的评分客户端
//!
//! 按脚本依次返回轮询结果，脚本耗尽后一直返回 fallback，不实际调用评分服务

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::{GradingError, GradingServicePort, TaskId, TaskStatus};
use crate::domain::evaluation::{Criterion, CriterionScores, EvaluationResult};

/// Fake Grading Client 配置
#[derive(Debug, Clone)]
pub struct FakeGradingClientConfig {
    /// 固定返回的任务 ID
    pub task_id: String,
    /// 每次调用的模拟延迟
    pub latency: Duration,
    /// health_check 的返回值
    pub healthy: bool,
}

impl Default for FakeGradingClientConfig {
    fn default() -> Self {
        Self {
            task_id: "fake-task".to_string(),
            latency: Duration::ZERO,
            healthy: true,
        }
    }
}

type PollResult = Result<TaskStatus, GradingError>;

/// Fake Grading Client
pub struct FakeGradingClient {
    config: FakeGradingClientConfig,
    script: Mutex<VecDeque<PollResult>>,
    fallback: PollResult,
    submit_error: Option<GradingError>,
    improve_result: Option<Result<String, GradingError>>,
    submit_calls: AtomicUsize,
    poll_calls: AtomicUsize,
    improve_calls: AtomicUsize,
}

impl FakeGradingClient {
    pub fn new(
        config: FakeGradingClientConfig,
        script: Vec<PollResult>,
        fallback: PollResult,
    ) -> Self {
        Self {
            config,
            script: Mutex::new(script.into()),
            fallback,
            submit_error: None,
            improve_result: None,
            submit_calls: AtomicUsize::new(0),
            poll_calls: AtomicUsize::new(0),
            improve_calls: AtomicUsize::new(0),
        }
    }

    /// 任务永远处于 pending
    pub fn always_pending() -> Self {
        Self::new(FakeGradingClientConfig::default(), Vec::new(), Ok(TaskStatus::Pending))
    }

    /// 每次轮询都立即返回 completed
    pub fn completing(result: EvaluationResult) -> Self {
        Self::new(
            FakeGradingClientConfig::default(),
            Vec::new(),
            Ok(TaskStatus::Completed(result)),
        )
    }

    /// 按脚本返回，脚本耗尽后返回 pending
    pub fn scripted(script: Vec<PollResult>) -> Self {
        Self::new(FakeGradingClientConfig::default(), script, Ok(TaskStatus::Pending))
    }

    /// 离线演示：一次 pending 之后返回固定的评估结果
    pub fn demo() -> Self {
        let config = FakeGradingClientConfig {
            task_id: format!("offline-{}", uuid::Uuid::new_v4()),
            latency: Duration::from_millis(150),
            healthy: true,
        };
        Self::new(
            config,
            vec![Ok(TaskStatus::Pending)],
            Ok(TaskStatus::Completed(demo_result())),
        )
    }

    pub fn with_submit_error(mut self, error: GradingError) -> Self {
        self.submit_error = Some(error);
        self
    }

    pub fn with_improved(mut self, improved: impl Into<String>) -> Self {
        self.improve_result = Some(Ok(improved.into()));
        self
    }

    pub fn with_improve_error(mut self, error: GradingError) -> Self {
        self.improve_result = Some(Err(error));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.config.latency = latency;
        self
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn poll_calls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn improve_calls(&self) -> usize {
        self.improve_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
    }

    fn next_poll_result(&self) -> PollResult {
        let scripted = match self.script.lock() {
            Ok(mut script) => script.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl GradingServicePort for FakeGradingClient {
    async fn submit(&self, prompt: &str) -> Result<TaskId, GradingError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if let Some(error) = &self.submit_error {
            return Err(error.clone());
        }

        tracing::debug!(
            prompt_chars = prompt.chars().count(),
            task_id = %self.config.task_id,
            "FakeGradingClient: accepted prompt"
        );
        TaskId::parse(&self.config.task_id)
    }

    async fn poll(&self, task_id: &TaskId) -> Result<TaskStatus, GradingError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let result = self.next_poll_result();
        tracing::debug!(
            task_id = %task_id,
            status = result.as_ref().map(TaskStatus::as_str).unwrap_or("error"),
            "FakeGradingClient: returning scripted status"
        );
        result
    }

    async fn improve(&self, prompt: &str) -> Result<String, GradingError> {
        self.improve_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        match &self.improve_result {
            Some(result) => result.clone(),
            None => Ok(format!(
                "{} Include the patient's age, relevant history and the expected format of the answer.",
                prompt.trim()
            )),
        }
    }

    async fn health_check(&self) -> bool {
        self.config.healthy
    }
}

/// 离线演示使用的固定评估结果
pub fn demo_result() -> EvaluationResult {
    let criteria: CriterionScores = [
        (Criterion::Safety, 28),
        (Criterion::ClinicalClarity, 22),
        (Criterion::Specificity, 18),
        (Criterion::InstructionalStyle, 13),
        (Criterion::MedicalTerminology, 7),
    ]
    .into_iter()
    .collect();

    EvaluationResult::new(
        88,
        criteria,
        vec![
            "Specify the patient's age and comorbidities.".to_string(),
            "State the expected output format, e.g. a numbered list.".to_string(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_fallback() {
        let fake = FakeGradingClient::scripted(vec![Ok(TaskStatus::Failed("boom".into()))]);
        let task_id = fake.submit("Explain sepsis").await.unwrap();
        assert_eq!(task_id.as_str(), "fake-task");

        assert_eq!(
            fake.poll(&task_id).await.unwrap(),
            TaskStatus::Failed("boom".into())
        );
        assert_eq!(fake.poll(&task_id).await.unwrap(), TaskStatus::Pending);
        assert_eq!(fake.poll_calls(), 2);
    }

    #[tokio::test]
    async fn test_default_improve_appends_guidance() {
        let fake = FakeGradingClient::always_pending();
        let improved = fake.improve("Explain sepsis").await.unwrap();
        assert!(improved.starts_with("Explain sepsis "));
        assert_eq!(fake.improve_calls(), 1);
    }

    #[test]
    fn test_demo_result_is_consistent() {
        let result = demo_result();
        assert_eq!(result.criteria().raw_total(), result.score());
        assert!(result.audit(1).is_empty());
    }
}
