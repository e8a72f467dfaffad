//! Task Poller - 轮询任务状态
//!
//! 轮询严格串行：上一次查询返回之前不会发起下一次查询。
//! 传输错误视为终态直接返回，不重试，避免把真实故障掩盖成超时。

use std::sync::Arc;
use std::time::Duration;

use super::TaskOutcome;
use crate::application::ports::{GradingServicePort, TaskId};

/// 轮询配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// 首次查询前的等待时间
    pub initial_delay: Duration,
    /// 两次查询之间的间隔
    pub interval: Duration,
    /// 最大查询次数
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1000),
            interval: Duration::from_millis(2000),
            max_attempts: 30,
        }
    }
}

impl PollConfig {
    /// 轮询总预算（用于超时提示）
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// 任务轮询器
pub struct TaskPoller {
    service: Arc<dyn GradingServicePort>,
    config: PollConfig,
}

impl TaskPoller {
    pub fn new(service: Arc<dyn GradingServicePort>, config: PollConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// 轮询直到终态或次数耗尽
    pub async fn wait_for(&self, task_id: &TaskId) -> TaskOutcome {
        tokio::time::sleep(self.config.initial_delay).await;

        for attempt in 1..=self.config.max_attempts {
            let outcome = match self.service.poll(task_id).await {
                Ok(status) => TaskOutcome::from(status),
                Err(e) => {
                    tracing::warn!(
                        task_id = %task_id,
                        attempt = attempt,
                        error = %e,
                        "Task status query failed"
                    );
                    TaskOutcome::from(e)
                }
            };

            if outcome.is_terminal() {
                tracing::info!(
                    task_id = %task_id,
                    attempt = attempt,
                    outcome = outcome.as_str(),
                    "Task reached terminal state"
                );
                return outcome;
            }

            tracing::debug!(
                task_id = %task_id,
                attempt = attempt,
                max_attempts = self.config.max_attempts,
                "Task still pending"
            );

            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.interval).await;
            }
        }

        tracing::warn!(
            task_id = %task_id,
            max_attempts = self.config.max_attempts,
            "Polling budget exhausted"
        );
        TaskOutcome::TimedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{GradingError, PolicyRejection, RejectionOrigin, TaskStatus};
    use crate::domain::evaluation::{CriterionScores, EvaluationResult};
    use crate::infrastructure::adapters::FakeGradingClient;
    use tokio::time::Instant;

    fn task_id() -> TaskId {
        TaskId::parse("task-1").unwrap()
    }

    fn sample_result() -> EvaluationResult {
        EvaluationResult::new(70, CriterionScores::new(), vec!["Add age".into()])
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_pending_times_out_within_budget() {
        let fake = Arc::new(FakeGradingClient::always_pending());
        let poller = TaskPoller::new(fake.clone(), PollConfig::default());

        let start = Instant::now();
        let outcome = poller.wait_for(&task_id()).await;
        let elapsed = start.elapsed();

        assert_eq!(outcome, TaskOutcome::TimedOut);
        assert_eq!(fake.poll_calls(), 30);
        // 1s 初始等待 + 29 次间隔
        assert!(elapsed >= Duration::from_secs(59));
        assert!(elapsed < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_after_pending() {
        let fake = Arc::new(FakeGradingClient::scripted(vec![
            Ok(TaskStatus::Pending),
            Ok(TaskStatus::Pending),
            Ok(TaskStatus::Completed(sample_result())),
        ]));
        let poller = TaskPoller::new(fake.clone(), PollConfig::default());

        let outcome = poller.wait_for(&task_id()).await;
        assert_eq!(outcome, TaskOutcome::Completed(sample_result()));
        assert_eq!(fake.poll_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_is_terminal() {
        let rejection =
            PolicyRejection::new("non_medical_prompt", "too vague", RejectionOrigin::StatusCode);
        let fake = Arc::new(FakeGradingClient::scripted(vec![Ok(TaskStatus::Rejected(
            rejection.clone(),
        ))]));
        let poller = TaskPoller::new(fake.clone(), PollConfig::default());

        let outcome = poller.wait_for(&task_id()).await;
        assert_eq!(outcome, TaskOutcome::RejectedByPolicy(rejection));
        assert_eq!(fake.poll_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_not_retried() {
        let fake = Arc::new(FakeGradingClient::scripted(vec![
            Ok(TaskStatus::Pending),
            Err(GradingError::NetworkError("connection reset".into())),
            Ok(TaskStatus::Completed(sample_result())),
        ]));
        let poller = TaskPoller::new(fake.clone(), PollConfig::default());

        let outcome = poller.wait_for(&task_id()).await;
        assert_eq!(
            outcome,
            TaskOutcome::TransportError("Network error: connection reset".into())
        );
        assert_eq!(fake.poll_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_body_is_malformed() {
        let fake = Arc::new(FakeGradingClient::scripted(vec![Err(
            GradingError::InvalidResponse("Missing top-level fields: score".into()),
        )]));
        let poller = TaskPoller::new(fake, PollConfig::default());

        let outcome = poller.wait_for(&task_id()).await;
        assert_eq!(
            outcome,
            TaskOutcome::Malformed("Missing top-level fields: score".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_config() {
        let fake = Arc::new(FakeGradingClient::always_pending());
        let config = PollConfig {
            initial_delay: Duration::from_millis(10),
            interval: Duration::from_millis(1500),
            max_attempts: 3,
        };
        assert_eq!(config.budget(), Duration::from_millis(4500));

        let poller = TaskPoller::new(fake.clone(), config);
        assert_eq!(poller.wait_for(&task_id()).await, TaskOutcome::TimedOut);
        assert_eq!(fake.poll_calls(), 3);
    }

    #[test]
    fn test_default_budget() {
        assert_eq!(PollConfig::default().budget(), Duration::from_secs(60));
    }
}
