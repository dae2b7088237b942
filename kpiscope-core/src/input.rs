//! Validation boundary for raw assessment payloads
//!
//! Raw payloads (form submissions, CSV rows) arrive with every field
//! optional. They are checked here before the scoring engine sees them.

use crate::risk::AssessmentInputs;
use crate::traffic::StatusAggregate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failure for a raw assessment
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("field `{0}` must be a finite number")]
    NotFinite(&'static str),

    #[error("field `{field}` must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("at-risk ({at_risk}) plus behind ({behind}) cannot exceed total ({total})")]
    CountsExceedTotal {
        at_risk: usize,
        behind: usize,
        total: usize,
    },
}

/// Unvalidated assessment payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RawAssessment {
    #[serde(default, alias = "Row ID", alias = "id")]
    pub row_id: Option<String>,
    #[serde(default, alias = "Progress")]
    pub progress: Option<f64>,
    #[serde(default, alias = "Budget Utilization")]
    pub budget_utilization: Option<f64>,
    #[serde(default, alias = "Delay Days")]
    pub delay_days: Option<f64>,
    #[serde(default, alias = "Engagement Score")]
    pub engagement_score: Option<f64>,
}

impl RawAssessment {
    /// Check presence and ranges, producing engine inputs
    ///
    /// Fields are checked in declaration order; the first failure wins.
    pub fn validate(&self) -> Result<AssessmentInputs, InputError> {
        Ok(AssessmentInputs {
            progress: check("progress", self.progress, 0.0, 100.0)?,
            budget_utilization: check(
                "budget_utilization",
                self.budget_utilization,
                0.0,
                f64::INFINITY,
            )?,
            delay_days: check("delay_days", self.delay_days, 0.0, f64::INFINITY)?,
            engagement_score: check("engagement_score", self.engagement_score, 0.0, 100.0)?,
        })
    }
}

impl From<AssessmentInputs> for RawAssessment {
    fn from(inputs: AssessmentInputs) -> Self {
        RawAssessment {
            row_id: None,
            progress: Some(inputs.progress),
            budget_utilization: Some(inputs.budget_utilization),
            delay_days: Some(inputs.delay_days),
            engagement_score: Some(inputs.engagement_score),
        }
    }
}

/// Check raw status counts, producing a traffic-light aggregate
///
/// Progress must lie in [0, 100] and the flagged counts must fit within the
/// total.
pub fn validate_status(
    progress: f64,
    at_risk: usize,
    behind: usize,
    total: usize,
) -> Result<StatusAggregate, InputError> {
    let progress_percent = check("progress", Some(progress), 0.0, 100.0)?;
    let fits = matches!(at_risk.checked_add(behind), Some(flagged) if flagged <= total);
    if !fits {
        return Err(InputError::CountsExceedTotal {
            at_risk,
            behind,
            total,
        });
    }
    Ok(StatusAggregate {
        progress_percent,
        at_risk_count: at_risk,
        behind_count: behind,
        total_count: total,
    })
}

fn check(field: &'static str, value: Option<f64>, min: f64, max: f64) -> Result<f64, InputError> {
    let value = value.ok_or(InputError::Missing(field))?;
    if !value.is_finite() {
        return Err(InputError::NotFinite(field));
    }
    if !(min..=max).contains(&value) {
        return Err(InputError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}
