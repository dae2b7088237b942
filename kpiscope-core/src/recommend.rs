//! Advisory recommendations attached to risk results
//!
//! Global invariants enforced:
//! - Rules are evaluated independently, in a fixed order
//! - Escalation is always appended last
//! - At least one recommendation is always returned

use crate::risk::{AssessmentInputs, RiskLevel};
use serde::{Deserialize, Serialize};

/// Progress below this percentage triggers `AccelerateProgress`
pub const PROGRESS_FLOOR: f64 = 50.0;
/// Budget utilization above this percentage triggers `MonitorBudget`
pub const BUDGET_CEILING: f64 = 80.0;
/// Delays longer than this many days trigger `AddressDelays`
pub const DELAY_TOLERANCE_DAYS: f64 = 7.0;
/// Engagement below this score triggers `ImproveEngagement`
pub const ENGAGEMENT_FLOOR: f64 = 60.0;

/// Recommendation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    AccelerateProgress,
    MonitorBudget,
    AddressDelays,
    ImproveEngagement,
    EscalateToManagement,
    ContinueMonitoring,
}

impl Recommendation {
    /// Human-readable advisory text
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::AccelerateProgress => {
                "Progress is below 50%. Accelerate delivery of outstanding milestones."
            }
            Recommendation::MonitorBudget => {
                "Budget utilization exceeds 80%. Monitor spending closely and review remaining allocations."
            }
            Recommendation::AddressDelays => {
                "Delivery is more than 7 days behind schedule. Address the causes of delay with the delivery team."
            }
            Recommendation::ImproveEngagement => {
                "Stakeholder engagement is low. Improve engagement through regular communication and reviews."
            }
            Recommendation::EscalateToManagement => {
                "Overall risk is high. Escalate to senior management for immediate review."
            }
            Recommendation::ContinueMonitoring => {
                "Initiative is performing within tolerances. Continue regular monitoring."
            }
        }
    }
}

/// Evaluate recommendation rules for an assessment
///
/// `level` is the level already assigned to the assessment's score.
pub fn evaluate(inputs: &AssessmentInputs, level: RiskLevel) -> Vec<Recommendation> {
    let mut fired = Vec::new();

    if inputs.progress < PROGRESS_FLOOR {
        fired.push(Recommendation::AccelerateProgress);
    }
    if inputs.budget_utilization > BUDGET_CEILING {
        fired.push(Recommendation::MonitorBudget);
    }
    if inputs.delay_days > DELAY_TOLERANCE_DAYS {
        fired.push(Recommendation::AddressDelays);
    }
    if inputs.engagement_score < ENGAGEMENT_FLOOR {
        fired.push(Recommendation::ImproveEngagement);
    }
    if level == RiskLevel::High {
        fired.push(Recommendation::EscalateToManagement);
    }

    if fired.is_empty() {
        fired.push(Recommendation::ContinueMonitoring);
    }

    fired
}
