//! Result Classifier - 结果分类
//!
//! 将终态 TaskOutcome 映射为 Accepted 或 Rejected（附标题与用户提示）。
//! 分类是纯函数，对同一输入多次分类结果相同。
//!
//! 规则优先级:
//! 1. 传输错误 / 响应畸形 -> "Backend Error"
//! 2. 超时 -> "Timeout"
//! 3. non_medical_prompt: 含伤害标记 -> 伤害警告，否则 -> 非医疗/过于模糊
//! 4. 原因中含 "Missing top-level fields" -> LLM 输出畸形提示
//! 5. 其他有原因的拒绝 -> 回显原因
//! 6. 无原因 -> 通用拒绝提示
//! 7. 其余 -> Accepted
//!
//! 另外：内嵌错误且总分为 0 的 non_medical_prompt 结果，使用第一条建议作为提示

use std::time::Duration;

use serde::Serialize;

use super::TaskOutcome;
use crate::application::ports::{PolicyRejection, RejectionOrigin};
use crate::domain::evaluation::EvaluationResult;

pub const TITLE_BACKEND_ERROR: &str = "Backend Error";
pub const TITLE_TIMEOUT: &str = "Timeout";
pub const TITLE_PROMPT_REJECTED: &str = "Prompt Rejected";

/// 非医疗提示词的错误码
pub const NON_MEDICAL_ERROR_CODE: &str = "non_medical_prompt";

const HARM_MARKERS: &[&str] = &["harmful", "kill", "unsafe"];

/// 服务端解析 LLM 输出失败时原因中出现的特征串
const MALFORMED_OUTPUT_SIGNATURES: &[&str] = &[
    "Missing top-level fields",
    "Missing one or more top-level fields",
];

const HARMFUL_MESSAGE: &str = "🚫 This prompt was flagged as harmful or unsafe. Please rephrase with respectful and medically safe language.";
const NON_MEDICAL_MESSAGE: &str = "⚠️ Prompt rejected for being non-medical or too vague. Add clinical details and clear instructions.";
const MALFORMED_OUTPUT_MESSAGE: &str = "⚠️ Internal error: The LLM failed to return expected data. Try rewriting the prompt with clearer medical structure.";
const GENERIC_REJECTION_MESSAGE: &str = "⚠️ Prompt rejected. Please rephrase using a clear, safe, and medically relevant instruction.";
const ZERO_SCORE_FALLBACK_MESSAGE: &str = "Prompt rejected due to vague or non-medical input.";

/// 拒绝类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// 网络 / HTTP 故障
    Backend,
    /// 服务端返回了无法解析的响应
    MalformedResponse,
    Timeout,
    Harmful,
    NonMedical,
    /// 服务端无法解析 LLM 输出
    MalformedOutput,
    /// 回显服务端给出的原因
    ServiceReason,
    Generic,
}

/// 拒绝信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub title: String,
    pub message: String,
}

impl Rejection {
    fn new(kind: RejectionKind, title: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.into(),
        }
    }

    fn prompt_rejected(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self::new(kind, TITLE_PROMPT_REJECTED, message)
    }
}

/// 分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted(EvaluationResult),
    Rejected(Rejection),
}

impl Classification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Classification::Accepted(_))
    }
}

/// 结果分类器
#[derive(Debug, Clone)]
pub struct ResultClassifier {
    timeout_budget: Duration,
}

impl ResultClassifier {
    pub fn new(timeout_budget: Duration) -> Self {
        Self { timeout_budget }
    }

    pub fn classify(&self, outcome: &TaskOutcome) -> Classification {
        match outcome {
            TaskOutcome::TransportError(detail) => Classification::Rejected(Rejection::new(
                RejectionKind::Backend,
                TITLE_BACKEND_ERROR,
                format!(
                    "⚠️ An error occurred while contacting the grading service: {}",
                    detail
                ),
            )),
            TaskOutcome::Malformed(detail) => Classification::Rejected(Rejection::new(
                RejectionKind::MalformedResponse,
                TITLE_BACKEND_ERROR,
                format!(
                    "⚠️ The grading service returned a malformed response: {}",
                    detail
                ),
            )),
            TaskOutcome::Pending => Classification::Rejected(Rejection::new(
                RejectionKind::Backend,
                TITLE_BACKEND_ERROR,
                "⚠️ The evaluation has not finished yet.",
            )),
            TaskOutcome::TimedOut => Classification::Rejected(Rejection::new(
                RejectionKind::Timeout,
                TITLE_TIMEOUT,
                format!(
                    "⏱️ Evaluation timed out after {} seconds. Please try again.",
                    whole_seconds(self.timeout_budget)
                ),
            )),
            TaskOutcome::RejectedByPolicy(rejection) => {
                Classification::Rejected(Self::classify_rejection(rejection))
            }
            TaskOutcome::Failed(reason) => {
                Classification::Rejected(Self::classify_reason(None, reason))
            }
            TaskOutcome::Completed(result) => Classification::Accepted(result.clone()),
        }
    }

    fn classify_rejection(rejection: &PolicyRejection) -> Rejection {
        // 服务端用 0 分 + 错误码表达拒绝的情况
        if rejection.origin == RejectionOrigin::EmbeddedError
            && rejection.error_code == NON_MEDICAL_ERROR_CODE
            && rejection.score == Some(0)
        {
            let message = rejection
                .suggestions
                .first()
                .map(String::as_str)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(ZERO_SCORE_FALLBACK_MESSAGE);
            return Rejection::prompt_rejected(RejectionKind::NonMedical, message);
        }

        Self::classify_reason(Some(&rejection.error_code), &rejection.reason)
    }

    fn classify_reason(error_code: Option<&str>, reason: &str) -> Rejection {
        if error_code == Some(NON_MEDICAL_ERROR_CODE) {
            let lowered = reason.to_lowercase();
            if HARM_MARKERS.iter().any(|marker| lowered.contains(marker)) {
                return Rejection::prompt_rejected(RejectionKind::Harmful, HARMFUL_MESSAGE);
            }
            return Rejection::prompt_rejected(RejectionKind::NonMedical, NON_MEDICAL_MESSAGE);
        }

        if MALFORMED_OUTPUT_SIGNATURES
            .iter()
            .any(|signature| reason.contains(signature))
        {
            return Rejection::prompt_rejected(
                RejectionKind::MalformedOutput,
                MALFORMED_OUTPUT_MESSAGE,
            );
        }

        let reason = reason.trim();
        if !reason.is_empty() {
            return Rejection::prompt_rejected(
                RejectionKind::ServiceReason,
                format!("⚠️ {}", reason),
            );
        }

        Rejection::prompt_rejected(RejectionKind::Generic, GENERIC_REJECTION_MESSAGE)
    }
}

impl Default for ResultClassifier {
    fn default() -> Self {
        Self::new(super::PollConfig::default().budget())
    }
}

fn whole_seconds(duration: Duration) -> u128 {
    duration.as_millis().div_ceil(1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::{Criterion, CriterionScores};

    fn rejected(outcome: &TaskOutcome) -> Rejection {
        match ResultClassifier::default().classify(outcome) {
            Classification::Rejected(r) => r,
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    fn policy(code: &str, reason: &str) -> TaskOutcome {
        TaskOutcome::RejectedByPolicy(PolicyRejection::new(
            code,
            reason,
            RejectionOrigin::StatusCode,
        ))
    }

    #[test]
    fn test_accepts_completed_result() {
        let criteria: CriterionScores = [
            (Criterion::Safety, 28),
            (Criterion::ClinicalClarity, 22),
            (Criterion::Specificity, 18),
            (Criterion::InstructionalStyle, 13),
            (Criterion::MedicalTerminology, 7),
        ]
        .into_iter()
        .collect();
        let result = EvaluationResult::new(88, criteria, vec!["Add patient age".into()]);

        let classification = ResultClassifier::default().classify(&TaskOutcome::Completed(result.clone()));
        assert_eq!(classification, Classification::Accepted(result.clone()));
        assert_eq!(result.display_score(), 88);
        assert_eq!(result.rating().as_str(), "Excellent");
    }

    #[test]
    fn test_non_medical_vague() {
        let r = rejected(&policy("non_medical_prompt", "too vague"));
        assert_eq!(r.kind, RejectionKind::NonMedical);
        assert_eq!(r.title, "Prompt Rejected");
        assert_eq!(r.message, NON_MEDICAL_MESSAGE);
    }

    #[test]
    fn test_non_medical_harmful() {
        let r = rejected(&policy("non_medical_prompt", "contains harmful intent to kill"));
        assert_eq!(r.kind, RejectionKind::Harmful);
        assert_eq!(r.message, HARMFUL_MESSAGE);

        let r = rejected(&policy("non_medical_prompt", "UNSAFE request"));
        assert_eq!(r.kind, RejectionKind::Harmful);
    }

    #[test]
    fn test_harm_markers_only_apply_to_non_medical_code() {
        let r = rejected(&policy("Validation failed", "unsafe dosage range"));
        assert_eq!(r.kind, RejectionKind::ServiceReason);
        assert_eq!(r.message, "⚠️ unsafe dosage range");
    }

    #[test]
    fn test_embedded_missing_fields_is_malformed_output() {
        let outcome = TaskOutcome::RejectedByPolicy(PolicyRejection::new(
            "Exception during evaluation",
            "Missing top-level fields: score",
            RejectionOrigin::EmbeddedError,
        ));
        let r = rejected(&outcome);
        assert_eq!(r.kind, RejectionKind::MalformedOutput);
        assert_eq!(r.title, "Prompt Rejected");
        assert_eq!(r.message, MALFORMED_OUTPUT_MESSAGE);
    }

    #[test]
    fn test_worker_missing_fields_variant() {
        let r = rejected(&policy(
            "JSON parse failure",
            "Missing one or more top-level fields: criteria",
        ));
        assert_eq!(r.kind, RejectionKind::MalformedOutput);
    }

    #[test]
    fn test_echo_and_generic() {
        let r = rejected(&policy("Validation failed", "Suggestions list cannot be empty."));
        assert_eq!(r.message, "⚠️ Suggestions list cannot be empty.");

        let r = rejected(&policy("Validation failed", "   "));
        assert_eq!(r.kind, RejectionKind::Generic);
        assert_eq!(r.message, GENERIC_REJECTION_MESSAGE);
    }

    #[test]
    fn test_failed_uses_reason() {
        let r = rejected(&TaskOutcome::Failed("worker crashed".into()));
        assert_eq!(r.kind, RejectionKind::ServiceReason);
        assert_eq!(r.message, "⚠️ worker crashed");

        let r = rejected(&TaskOutcome::Failed(String::new()));
        assert_eq!(r.kind, RejectionKind::Generic);
    }

    #[test]
    fn test_zero_score_non_medical_uses_first_suggestion() {
        let outcome = TaskOutcome::RejectedByPolicy(
            PolicyRejection::new("non_medical_prompt", "", RejectionOrigin::EmbeddedError)
                .with_score(0)
                .with_suggestions(vec!["Please ask about a medical topic.".into()]),
        );
        let r = rejected(&outcome);
        assert_eq!(r.kind, RejectionKind::NonMedical);
        assert_eq!(r.message, "Please ask about a medical topic.");

        let outcome = TaskOutcome::RejectedByPolicy(
            PolicyRejection::new("non_medical_prompt", "", RejectionOrigin::EmbeddedError)
                .with_score(0),
        );
        assert_eq!(rejected(&outcome).message, ZERO_SCORE_FALLBACK_MESSAGE);
    }

    #[test]
    fn test_transport_and_timeout() {
        let r = rejected(&TaskOutcome::TransportError("connection refused".into()));
        assert_eq!(r.title, "Backend Error");
        assert!(r.message.contains("connection refused"));

        let r = rejected(&TaskOutcome::TimedOut);
        assert_eq!(r.title, "Timeout");
        assert_eq!(
            r.message,
            "⏱️ Evaluation timed out after 60 seconds. Please try again."
        );

        let classifier = ResultClassifier::new(Duration::from_millis(45_500));
        match classifier.classify(&TaskOutcome::TimedOut) {
            Classification::Rejected(r) => assert!(r.message.contains("46 seconds")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_response() {
        let r = rejected(&TaskOutcome::Malformed("expected value at line 1".into()));
        assert_eq!(r.kind, RejectionKind::MalformedResponse);
        assert_eq!(r.title, "Backend Error");
    }

    #[test]
    fn test_classification_is_idempotent() {
        let classifier = ResultClassifier::default();
        let outcomes = vec![
            policy("non_medical_prompt", "kill"),
            TaskOutcome::TimedOut,
            TaskOutcome::Failed("boom".into()),
            TaskOutcome::Completed(EvaluationResult::new(50, CriterionScores::new(), vec![])),
        ];
        for outcome in &outcomes {
            assert_eq!(classifier.classify(outcome), classifier.classify(outcome));
        }
    }
}
