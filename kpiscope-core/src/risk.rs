//! Delivery risk score calculation
//!
//! Global invariants enforced:
//! - Deterministic risk calculations
//! - risk_score is clamped to [0, 100] after weighting, never before
//! - Risk level depends on risk_score alone

use crate::recommend;
use serde::{Deserialize, Serialize};

/// Confidence reported with every result. Not derived from the inputs.
pub const CONFIDENCE: f64 = 0.85;

/// Validated inputs for a single risk assessment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AssessmentInputs {
    /// Delivery progress, 0-100
    pub progress: f64,
    /// Budget consumed, percent (may exceed 100)
    pub budget_utilization: f64,
    /// Days behind schedule
    pub delay_days: f64,
    /// Stakeholder engagement, 0-100
    pub engagement_score: f64,
}

/// Per-factor risk components before weighting
///
/// Each component is floored at 0. Only `delay` is capped at 1; `budget`
/// keeps growing past 100% utilization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskComponents {
    pub progress: f64,
    pub budget: f64,
    pub delay: f64,
    pub engagement: f64,
}

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,    // < 40
    Medium, // 40-70
    High,   // >= 70
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Predicted outcome paired with this level
    pub fn outcome(&self) -> PredictedOutcome {
        match self {
            RiskLevel::Low => PredictedOutcome::OnTrack,
            RiskLevel::Medium => PredictedOutcome::NeedsAttention,
            RiskLevel::High => PredictedOutcome::AtRisk,
        }
    }
}

/// Predicted delivery outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictedOutcome {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl PredictedOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictedOutcome::OnTrack => "On Track",
            PredictedOutcome::NeedsAttention => "Needs Attention",
            PredictedOutcome::AtRisk => "At Risk",
        }
    }
}

/// Factor contributions for display, on a 0-100 scale (unweighted)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RiskFactors {
    pub progress: f64,
    pub budget: f64,
    pub delay: f64,
    pub engagement: f64,
}

/// Complete result of scoring one assessment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RiskResult {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub predicted_outcome: PredictedOutcome,
    pub confidence: f64,
    pub factors: RiskFactors,
    pub recommendations: Vec<String>,
}

/// Configurable weights for the weighted risk sum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskWeights {
    pub progress: f64,
    pub budget: f64,
    pub delay: f64,
    pub engagement: f64,
}

impl RiskWeights {
    pub fn sum(&self) -> f64 {
        self.progress + self.budget + self.delay + self.engagement
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        RiskWeights {
            progress: 0.30,
            budget: 0.25,
            delay: 0.30,
            engagement: 0.15,
        }
    }
}

/// Configurable risk level thresholds (lower bounds, inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelThresholds {
    pub medium: f64,
    pub high: f64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        LevelThresholds {
            medium: 40.0,
            high: 70.0,
        }
    }
}

/// Weights and thresholds used for one scoring run
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoringModel {
    pub weights: RiskWeights,
    pub thresholds: LevelThresholds,
}

/// Calculate per-factor risk components
///
/// Transforms:
/// - progress   = max(0, (100 - progress) / 100)
/// - budget     = max(0, (utilization - 80) / 20)
/// - delay      = min(1, delay_days / 30)
/// - engagement = max(0, (70 - engagement) / 70)
pub fn calculate_risk_components(inputs: &AssessmentInputs) -> RiskComponents {
    RiskComponents {
        progress: ((100.0 - inputs.progress) / 100.0).max(0.0),
        budget: ((inputs.budget_utilization - 80.0) / 20.0).max(0.0),
        delay: (inputs.delay_days / 30.0).min(1.0),
        engagement: ((70.0 - inputs.engagement_score) / 70.0).max(0.0),
    }
}

/// Weighted sum of components, unclamped
pub fn calculate_weighted_risk(risk: &RiskComponents, weights: &RiskWeights) -> f64 {
    weights.progress * risk.progress
        + weights.budget * risk.budget
        + weights.delay * risk.delay
        + weights.engagement * risk.engagement
}

/// Convert a weighted sum to a 0-100 score, rounded to 2 decimals
pub fn to_risk_score(weighted: f64) -> f64 {
    round_to(weighted.clamp(0.0, 1.0) * 100.0, 2)
}

/// Assign risk level with default thresholds
pub fn assign_risk_level(risk_score: f64) -> RiskLevel {
    assign_risk_level_with_thresholds(risk_score, &LevelThresholds::default())
}

/// Assign risk level with custom thresholds
pub fn assign_risk_level_with_thresholds(
    risk_score: f64,
    thresholds: &LevelThresholds,
) -> RiskLevel {
    if risk_score >= thresholds.high {
        RiskLevel::High
    } else if risk_score >= thresholds.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Score an assessment with the default model
pub fn score(inputs: &AssessmentInputs) -> RiskResult {
    score_with_model(inputs, &ScoringModel::default())
}

/// Score an assessment with custom weights and thresholds
pub fn score_with_model(inputs: &AssessmentInputs, model: &ScoringModel) -> RiskResult {
    let risk = calculate_risk_components(inputs);
    let weighted = calculate_weighted_risk(&risk, &model.weights);
    let risk_score = to_risk_score(weighted);
    let risk_level = assign_risk_level_with_thresholds(risk_score, &model.thresholds);

    let recommendations = recommend::evaluate(inputs, risk_level)
        .into_iter()
        .map(|r| r.message().to_string())
        .collect();

    tracing::debug!(
        progress = inputs.progress,
        budget_utilization = inputs.budget_utilization,
        delay_days = inputs.delay_days,
        engagement_score = inputs.engagement_score,
        risk_score,
        level = risk_level.as_str(),
        "scored assessment"
    );

    RiskResult {
        risk_score,
        risk_level,
        predicted_outcome: risk_level.outcome(),
        confidence: CONFIDENCE,
        factors: RiskFactors {
            progress: round_to(risk.progress * 100.0, 1),
            budget: round_to(risk.budget * 100.0, 1),
            delay: round_to(risk.delay * 100.0, 1),
            engagement: round_to(risk.engagement * 100.0, 1),
        },
        recommendations,
    }
}

/// Round half away from zero to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
