//! Evaluation Context - Value Objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 评分维度
///
/// 五个固定维度，满分之和为 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Safety,
    ClinicalClarity,
    Specificity,
    InstructionalStyle,
    MedicalTerminology,
}

impl Criterion {
    /// 按展示顺序排列的全部维度
    pub const ALL: [Criterion; 5] = [
        Criterion::Safety,
        Criterion::ClinicalClarity,
        Criterion::Specificity,
        Criterion::InstructionalStyle,
        Criterion::MedicalTerminology,
    ];

    /// 服务端 JSON 中使用的键
    pub fn key(&self) -> &'static str {
        match self {
            Criterion::Safety => "safety",
            Criterion::ClinicalClarity => "clinical_clarity",
            Criterion::Specificity => "specificity",
            Criterion::InstructionalStyle => "instructional_style",
            Criterion::MedicalTerminology => "medical_terminology",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "safety" => Some(Criterion::Safety),
            "clinical_clarity" => Some(Criterion::ClinicalClarity),
            "specificity" => Some(Criterion::Specificity),
            "instructional_style" => Some(Criterion::InstructionalStyle),
            "medical_terminology" => Some(Criterion::MedicalTerminology),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Criterion::Safety => "Safety",
            Criterion::ClinicalClarity => "Clinical Clarity",
            Criterion::Specificity => "Specificity",
            Criterion::InstructionalStyle => "Instructional Style",
            Criterion::MedicalTerminology => "Medical Terminology",
        }
    }

    /// 该维度的满分
    pub fn max_points(&self) -> i64 {
        match self {
            Criterion::Safety => 30,
            Criterion::ClinicalClarity => 25,
            Criterion::Specificity => 20,
            Criterion::InstructionalStyle => 15,
            Criterion::MedicalTerminology => 10,
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// 各维度原始得分
///
/// 保存服务端返回的原始值（可能越界），展示时通过 `clamped` 截断
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScores(BTreeMap<Criterion, i64>);

impl CriterionScores {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn set(&mut self, criterion: Criterion, raw: i64) {
        self.0.insert(criterion, raw);
    }

    /// 原始得分，缺失视为 0
    pub fn raw(&self, criterion: Criterion) -> i64 {
        self.0.get(&criterion).copied().unwrap_or(0)
    }

    /// 截断到 [0, max] 的得分
    pub fn clamped(&self, criterion: Criterion) -> i64 {
        self.raw(criterion).clamp(0, criterion.max_points())
    }

    /// 归一化百分比（雷达图使用）
    pub fn normalized_percent(&self, criterion: Criterion) -> f64 {
        self.clamped(criterion) as f64 / criterion.max_points() as f64 * 100.0
    }

    /// 截断后的总分
    pub fn total(&self) -> i64 {
        Criterion::ALL.iter().map(|c| self.clamped(*c)).sum()
    }

    /// 原始得分之和（饱和加法）
    pub fn raw_total(&self) -> i64 {
        Criterion::ALL
            .iter()
            .fold(0i64, |acc, c| acc.saturating_add(self.raw(*c)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, i64)> + '_ {
        Criterion::ALL.iter().map(move |c| (*c, self.raw(*c)))
    }
}

impl FromIterator<(Criterion, i64)> for CriterionScores {
    fn from_iter<T: IntoIterator<Item = (Criterion, i64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// 总分评级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    Good,
    NeedsWork,
}

impl Rating {
    pub fn from_score(score: i64) -> Self {
        if score > 80 {
            Rating::Excellent
        } else if score > 60 {
            Rating::Good
        } else {
            Rating::NeedsWork
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::NeedsWork => "Needs Work",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Rating::Excellent => "excellent",
            Rating::Good => "good",
            Rating::NeedsWork => "needs-work",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 历史记录条目的分档（与评级阈值不同）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HistoryTier {
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s >= 90 => HistoryTier::Excellent,
            s if s >= 75 => HistoryTier::Good,
            s if s >= 60 => HistoryTier::Fair,
            _ => HistoryTier::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryTier::Excellent => "excellent",
            HistoryTier::Good => "good",
            HistoryTier::Fair => "fair",
            HistoryTier::Poor => "poor",
        }
    }
}
