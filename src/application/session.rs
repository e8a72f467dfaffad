//! Evaluation Session - 评估会话（编排器）
//!
//! 每个进程构造一次，持有历史记录、草稿、主题与各协作者。
//!
//! evaluate 流程:
//! 1. 校验提示词（失败时 alert，不改动界面、不发起网络请求）
//! 2. 清除上一次的展示，进入忙碌状态
//! 3. 提交 -> 轮询 -> 分类
//! 4. Accepted: 记录并持久化历史，渲染结果；Rejected: 渲染错误
//! 5. 无论从哪条路径退出（包括 future 被丢弃）都恢复界面
//!
//! `&mut self` 保证同一会话内同时只有一个评估在进行

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::history_repository::HistoryRepository;
use crate::application::pipeline::{
    Classification, PollConfig, Rejection, ResultClassifier, TaskOutcome, TaskPoller,
    TaskSubmitter,
};
use crate::application::ports::{EvaluationViewPort, GradingServicePort, KeyValueStorePort};
use crate::domain::evaluation::{EvaluationResult, Rating, DEFAULT_SCORE_TOLERANCE};
use crate::domain::history::{PromptHistory, Theme, DEFAULT_HISTORY_CAPACITY};
use crate::domain::prompt::{PromptDraft, PromptError, PromptText, DEFAULT_MAX_CHARS};

/// 会话配置
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub poll: PollConfig,
    /// 提示词最大字符数
    pub max_chars: usize,
    /// 历史记录容量
    pub history_capacity: usize,
    /// 总分与各维度之和允许的误差
    pub score_tolerance: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            max_chars: DEFAULT_MAX_CHARS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            score_tolerance: DEFAULT_SCORE_TOLERANCE,
        }
    }
}

/// 一次评估的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationReport {
    Accepted {
        result: EvaluationResult,
        rating: Rating,
    },
    Rejected(Rejection),
    /// 输入校验失败，未发起任何请求
    Invalid(PromptError),
}

/// 一次改写的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImproveReport {
    Improved(String),
    /// 改写失败或返回空，保留原提示词
    Unchanged,
    Invalid(PromptError),
}

/// 忙碌状态守卫：创建时禁用界面，Drop 时恢复
struct BusyGuard {
    view: Arc<dyn EvaluationViewPort>,
}

impl BusyGuard {
    fn engage(view: Arc<dyn EvaluationViewPort>) -> Self {
        view.set_busy(true);
        Self { view }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.view.set_busy(false);
    }
}

/// 评估会话
pub struct EvaluationSession {
    service: Arc<dyn GradingServicePort>,
    view: Arc<dyn EvaluationViewPort>,
    submitter: TaskSubmitter,
    poller: TaskPoller,
    classifier: ResultClassifier,
    repository: HistoryRepository,
    history: PromptHistory,
    draft: PromptDraft,
    theme: Theme,
    config: SessionConfig,
}

impl EvaluationSession {
    /// 创建会话，并从存储中恢复历史与主题
    pub fn new(
        service: Arc<dyn GradingServicePort>,
        view: Arc<dyn EvaluationViewPort>,
        store: Arc<dyn KeyValueStorePort>,
        config: SessionConfig,
    ) -> Self {
        let repository = HistoryRepository::new(store, config.history_capacity);

        let history = repository.load_history().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load history, starting empty");
            PromptHistory::new(config.history_capacity)
        });
        let theme = repository.load_theme().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load theme preference");
            Theme::default()
        });

        tracing::debug!(
            history_entries = history.len(),
            theme = theme.as_str(),
            "Evaluation session created"
        );

        Self {
            submitter: TaskSubmitter::new(service.clone()),
            poller: TaskPoller::new(service.clone(), config.poll.clone()),
            classifier: ResultClassifier::new(config.poll.budget()),
            service,
            view,
            repository,
            history,
            draft: PromptDraft::new(config.max_chars),
            theme,
            config,
        }
    }

    /// 评估提示词
    pub async fn evaluate(&mut self, prompt_text: &str) -> EvaluationReport {
        let prompt = match PromptText::parse(prompt_text, self.config.max_chars) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::info!(error = %e, "Prompt rejected by validation");
                self.view.alert(&e.to_string());
                return EvaluationReport::Invalid(e);
            }
        };

        let span = tracing::info_span!("evaluate", evaluation_id = %Uuid::new_v4());
        self.run_evaluation(prompt).instrument(span).await
    }

    async fn run_evaluation(&mut self, prompt: PromptText) -> EvaluationReport {
        self.view.clear();
        let _busy = BusyGuard::engage(self.view.clone());

        let outcome = match self.submitter.submit(&prompt).await {
            Ok(task_id) => self.poller.wait_for(&task_id).await,
            Err(e) => TaskOutcome::from_submit_error(e),
        };

        match self.classifier.classify(&outcome) {
            Classification::Accepted(result) => {
                self.accept(&prompt, &result);
                EvaluationReport::Accepted {
                    rating: result.rating(),
                    result,
                }
            }
            Classification::Rejected(rejection) => {
                tracing::info!(
                    kind = ?rejection.kind,
                    outcome = outcome.as_str(),
                    "Evaluation rejected"
                );
                self.view
                    .render_rejected(&rejection.message, &rejection.title);
                EvaluationReport::Rejected(rejection)
            }
        }
    }

    fn accept(&mut self, prompt: &PromptText, result: &EvaluationResult) {
        for issue in result.audit(self.config.score_tolerance) {
            tracing::warn!(issue = %issue, "Evaluation result failed rubric check");
        }

        self.history.record(prompt.as_str(), result.score());
        if let Err(e) = self.repository.save_history(&self.history) {
            tracing::warn!(error = %e, "Failed to persist history");
        }

        tracing::info!(
            score = result.score(),
            rating = result.rating().as_str(),
            "Evaluation accepted"
        );

        self.view.render_history(&self.history);
        self.view.render_accepted(result);
    }

    /// 改写提示词（尽力而为，失败时保留原文）
    pub async fn improve_prompt(&mut self, prompt_text: &str) -> ImproveReport {
        let prompt = match PromptText::parse(prompt_text, self.config.max_chars) {
            Ok(prompt) => prompt,
            Err(e) => {
                self.view.alert(&e.to_string());
                return ImproveReport::Invalid(e);
            }
        };

        self.draft.set_text(prompt.as_str());
        let _busy = BusyGuard::engage(self.view.clone());

        match self.service.improve(prompt.as_str()).await {
            Ok(improved) if !improved.trim().is_empty() => {
                let improved = improved.trim().to_string();
                tracing::info!(improved_chars = improved.chars().count(), "Prompt improved");
                self.draft.set_improved(improved.clone());
                self.view.render_improved(&improved);
                ImproveReport::Improved(improved)
            }
            Ok(_) => {
                tracing::warn!("Improve service returned an empty prompt");
                ImproveReport::Unchanged
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to improve prompt");
                ImproveReport::Unchanged
            }
        }
    }

    /// 将历史记录中的提示词载入草稿
    pub fn load_history(&mut self, index: usize) -> Result<&str, ApplicationError> {
        let entry = self
            .history
            .get(index)
            .ok_or_else(|| ApplicationError::not_found("History entry", index))?;
        self.draft.set_text(&entry.prompt);
        Ok(self.draft.text())
    }

    pub fn clear_history(&mut self) -> Result<(), ApplicationError> {
        self.history.clear();
        self.repository.clear_history()?;
        self.view.render_history(&self.history);
        tracing::info!("History cleared");
        Ok(())
    }

    pub fn history(&self) -> &PromptHistory {
        &self.history
    }

    pub fn draft(&self) -> &PromptDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut PromptDraft {
        &mut self.draft
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), ApplicationError> {
        self.repository.save_theme(theme)?;
        self.theme = theme;
        self.view.render_theme(theme);
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, ApplicationError> {
        let theme = self.theme.toggle();
        self.set_theme(theme)?;
        Ok(theme)
    }

    pub async fn health_check(&self) -> bool {
        self.service.health_check().await
    }
}
