//! Evaluation Context - 评估结果

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Criterion, CriterionScores, Rating, ResultParseError};

/// 总分与各维度之和允许的误差
pub const DEFAULT_SCORE_TOLERANCE: i64 = 1;

/// 单个分值绝对值的上限，超出视为无效结果
pub const SCORE_MAGNITUDE_LIMIT: i64 = 1_000_000;

/// 评估结果
///
/// 不变量:
/// - 各维度原始得分应在 [0, max] 内，但服务端不保证，展示时截断
/// - suggestions 顺序即展示顺序，第一条为主要建议
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    score: i64,
    criteria: CriterionScores,
    suggestions: Vec<String>,
}

impl EvaluationResult {
    pub fn new(score: i64, criteria: CriterionScores, suggestions: Vec<String>) -> Self {
        Self {
            score,
            criteria,
            suggestions,
        }
    }

    /// 严格解析服务端返回的结果对象
    ///
    /// 允许整数、整数值浮点数和纯数字字符串；单元素数组会被展开
    pub fn from_json(value: &Value) -> Result<Self, ResultParseError> {
        let object = unwrap_object(value).ok_or(ResultParseError::NotAnObject)?;

        let missing: Vec<&'static str> = ["score", "criteria"]
            .into_iter()
            .filter(|key| object.get(*key).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(ResultParseError::MissingFields(missing));
        }

        let score = coerce_int(&object["score"]).ok_or_else(|| {
            ResultParseError::invalid("score", "must be an integer within range")
        })?;

        let raw_criteria = object["criteria"]
            .as_object()
            .ok_or_else(|| ResultParseError::invalid("criteria", "must be an object"))?;

        let mut criteria = CriterionScores::new();
        for (key, raw) in raw_criteria {
            let Some(criterion) = Criterion::from_key(key) else {
                tracing::debug!(key = %key, "Ignoring unknown criterion");
                continue;
            };
            let value = coerce_int(raw).ok_or_else(|| {
                ResultParseError::invalid(key.as_str(), "must be an integer within range")
            })?;
            criteria.set(criterion, value);
        }

        let suggestions = match object.get("suggestions") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ResultParseError::invalid("suggestions", "must contain only strings")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(ResultParseError::invalid("suggestions", "must be a list"));
            }
        };

        Ok(Self {
            score,
            criteria,
            suggestions,
        })
    }

    /// 原始总分
    pub fn score(&self) -> i64 {
        self.score
    }

    /// 截断到 [0, 100] 的总分
    pub fn display_score(&self) -> i64 {
        self.score.clamp(0, 100)
    }

    pub fn rating(&self) -> Rating {
        Rating::from_score(self.display_score())
    }

    pub fn criteria(&self) -> &CriterionScores {
        &self.criteria
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn primary_suggestion(&self) -> Option<&str> {
        self.suggestions.first().map(String::as_str)
    }

    /// 按评分规则检查结果，返回发现的问题（不做拒绝）
    pub fn audit(&self, tolerance: i64) -> Vec<RubricIssue> {
        let mut issues = Vec::new();

        for (criterion, raw) in self.criteria.iter() {
            if !(0..=criterion.max_points()).contains(&raw) {
                issues.push(RubricIssue::OutOfRange {
                    criterion,
                    value: raw,
                });
            }
        }

        let sum = self.criteria.raw_total();
        if self.score.saturating_sub(sum).saturating_abs() > tolerance {
            issues.push(RubricIssue::ScoreMismatch {
                reported: self.score,
                sum,
            });
        }

        if self.suggestions.is_empty() {
            issues.push(RubricIssue::NoSuggestions);
        }
        for (index, suggestion) in self.suggestions.iter().enumerate() {
            if suggestion.trim().is_empty() {
                issues.push(RubricIssue::BlankSuggestion { index });
            }
        }

        issues
    }
}

/// 评分规则检查发现的问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RubricIssue {
    OutOfRange { criterion: Criterion, value: i64 },
    ScoreMismatch { reported: i64, sum: i64 },
    NoSuggestions,
    BlankSuggestion { index: usize },
}

impl std::fmt::Display for RubricIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RubricIssue::OutOfRange { criterion, value } => write!(
                f,
                "Invalid score for '{}': {} (must be 0-{})",
                criterion.key(),
                value,
                criterion.max_points()
            ),
            RubricIssue::ScoreMismatch { reported, sum } => {
                write!(f, "Reported score {} does not match sum {}", reported, sum)
            }
            RubricIssue::NoSuggestions => write!(f, "Suggestions list is empty"),
            RubricIssue::BlankSuggestion { index } => {
                write!(f, "Suggestion at index {} is blank", index)
            }
        }
    }
}

fn unwrap_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) if items.len() == 1 => items[0].as_object(),
        _ => None,
    }
}

/// 将 JSON 数值宽松转换为整数
///
/// 绝对值超过 `SCORE_MAGNITUDE_LIMIT` 的值返回 None
pub(crate) fn coerce_int(value: &Value) -> Option<i64> {
    let limit = SCORE_MAGNITUDE_LIMIT as f64;
    let coerced = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() <= limit)
                .map(|f| f as i64)
        }),
        Value::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    };
    coerced.filter(|n| n.saturating_abs() <= SCORE_MAGNITUDE_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diabetes_payload() -> Value {
        json!({
            "score": 88,
            "criteria": {
                "safety": 28,
                "clinical_clarity": 22,
                "specificity": 18,
                "instructional_style": 13,
                "medical_terminology": 7
            },
            "suggestions": ["Mention the patient's age", "Ask for a step-by-step plan"]
        })
    }

    #[test]
    fn test_parse_well_formed_result() {
        let result = EvaluationResult::from_json(&diabetes_payload()).unwrap();
        assert_eq!(result.score(), 88);
        assert_eq!(result.rating(), Rating::Excellent);
        assert_eq!(result.criteria().raw(Criterion::Safety), 28);
        assert_eq!(result.criteria().raw(Criterion::MedicalTerminology), 7);
        assert_eq!(result.primary_suggestion(), Some("Mention the patient's age"));
        assert!(result.audit(DEFAULT_SCORE_TOLERANCE).is_empty());
    }

    #[test]
    fn test_parse_missing_fields() {
        let err = EvaluationResult::from_json(&json!({"suggestions": []})).unwrap_err();
        assert_eq!(err, ResultParseError::MissingFields(vec!["score", "criteria"]));
        assert_eq!(err.to_string(), "Missing top-level fields: score, criteria");
    }

    #[test]
    fn test_parse_coerces_numbers() {
        let payload = json!({
            "score": 50.0,
            "criteria": {"safety": "20", "specificity": 10.0, "unknown": 3},
        });
        let result = EvaluationResult::from_json(&payload).unwrap();
        assert_eq!(result.score(), 50);
        assert_eq!(result.criteria().raw(Criterion::Safety), 20);
        assert_eq!(result.criteria().raw(Criterion::Specificity), 10);
        assert_eq!(result.criteria().raw(Criterion::ClinicalClarity), 0);
        assert!(result.suggestions().is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert_eq!(
            EvaluationResult::from_json(&json!("text")).unwrap_err(),
            ResultParseError::NotAnObject
        );
        assert!(EvaluationResult::from_json(&json!({"score": 1.5, "criteria": {}})).is_err());
        assert!(EvaluationResult::from_json(&json!({"score": 1, "criteria": []})).is_err());
        assert!(
            EvaluationResult::from_json(&json!({"score": 1, "criteria": {}, "suggestions": [1]}))
                .is_err()
        );
    }

    #[test]
    fn test_parse_unwraps_single_item_list() {
        let result = EvaluationResult::from_json(&json!([diabetes_payload()])).unwrap();
        assert_eq!(result.score(), 88);
    }

    #[test]
    fn test_audit_reports_issues() {
        let payload = json!({
            "score": 95,
            "criteria": {"safety": 40, "clinical_clarity": 25},
            "suggestions": ["  "]
        });
        let result = EvaluationResult::from_json(&payload).unwrap();
        let issues = result.audit(DEFAULT_SCORE_TOLERANCE);

        assert!(issues.contains(&RubricIssue::OutOfRange {
            criterion: Criterion::Safety,
            value: 40
        }));
        assert!(issues.contains(&RubricIssue::ScoreMismatch {
            reported: 95,
            sum: 65
        }));
        assert!(issues.contains(&RubricIssue::BlankSuggestion { index: 0 }));
    }

    #[test]
    fn test_parse_rejects_huge_numbers() {
        let err = EvaluationResult::from_json(&json!({"score": 1e300, "criteria": {"safety": -1}}))
            .unwrap_err();
        assert!(matches!(err, ResultParseError::InvalidField { ref field, .. } if field == "score"));

        let err = EvaluationResult::from_json(&json!({
            "score": 10,
            "criteria": {"safety": i64::MAX}
        }))
        .unwrap_err();
        assert!(matches!(err, ResultParseError::InvalidField { ref field, .. } if field == "safety"));

        assert!(EvaluationResult::from_json(&json!({
            "score": "99999999999999999999999",
            "criteria": {}
        }))
        .is_err());
    }

    #[test]
    fn test_audit_extreme_values_do_not_overflow() {
        let criteria: CriterionScores = Criterion::ALL
            .into_iter()
            .map(|c| (c, i64::MAX))
            .collect();
        let result = EvaluationResult::new(i64::MIN, criteria, vec!["x".into()]);

        assert_eq!(result.criteria().raw_total(), i64::MAX);
        let issues = result.audit(DEFAULT_SCORE_TOLERANCE);
        assert!(issues.contains(&RubricIssue::ScoreMismatch {
            reported: i64::MIN,
            sum: i64::MAX
        }));
        assert_eq!(result.display_score(), 0);
    }

    #[test]
    fn test_display_score_clamped() {
        let result = EvaluationResult::new(130, CriterionScores::new(), vec![]);
        assert_eq!(result.display_score(), 100);
        let result = EvaluationResult::new(-5, CriterionScores::new(), vec![]);
        assert_eq!(result.display_score(), 0);
        assert_eq!(result.rating(), Rating::NeedsWork);
    }
}
