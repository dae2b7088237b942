//! KPI progress and status rules

use crate::risk::round_to;
use serde::{Deserialize, Serialize};

/// Delivery status of a single KPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiStatus {
    OnTrack,
    AtRisk,
    Behind,
}

/// Progress cut-offs for deriving a KPI status (lower bounds, inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusCutoffs {
    pub on_track: f64,
    pub behind: f64,
}

impl Default for StatusCutoffs {
    fn default() -> Self {
        StatusCutoffs {
            on_track: 70.0,
            behind: 40.0,
        }
    }
}

/// Dated sub-task of a KPI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Milestone {
    pub title: String,
    /// Completion percentage, 0-100
    #[serde(default)]
    pub completion: f64,
}

/// Tracked metric under a strategic pillar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Kpi {
    pub id: String,
    pub name: String,
    pub pillar: String,
    pub current_value: f64,
    pub target_value: f64,
    /// Status recorded by an owner; overrides the derived status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<KpiStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<Milestone>,
}

impl Kpi {
    /// Progress rounded for display
    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.current_value, self.target_value)
    }

    /// Unrounded progress, used for every threshold comparison
    pub fn exact_progress(&self) -> f64 {
        exact_progress(self.current_value, self.target_value)
    }

    /// Recorded status, or the one derived from unrounded progress
    pub fn effective_status(&self, cutoffs: &StatusCutoffs) -> KpiStatus {
        self.status
            .unwrap_or_else(|| classify_status(self.exact_progress(), cutoffs))
    }

    /// Mean milestone completion, `None` without milestones
    pub fn milestone_completion(&self) -> Option<f64> {
        if self.milestones.is_empty() {
            return None;
        }
        let sum: f64 = self
            .milestones
            .iter()
            .map(|m| m.completion.clamp(0.0, 100.0))
            .sum();
        Some(round_to(sum / self.milestones.len() as f64, 1))
    }
}

/// Progress toward target in percent, clamped to [0, 100]
///
/// A non-positive target has no meaningful progress and yields 0.
pub fn exact_progress(current: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (current / target * 100.0).clamp(0.0, 100.0)
}

/// `exact_progress` rounded to one decimal
pub fn progress_percent(current: f64, target: f64) -> f64 {
    round_to(exact_progress(current, target), 1)
}

/// Derive a status from a progress percentage
pub fn classify_status(progress: f64, cutoffs: &StatusCutoffs) -> KpiStatus {
    if progress >= cutoffs.on_track {
        KpiStatus::OnTrack
    } else if progress >= cutoffs.behind {
        KpiStatus::AtRisk
    } else {
        KpiStatus::Behind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kpi(current: f64, target: f64) -> Kpi {
        Kpi {
            id: "k1".to_string(),
            name: "Digital services adoption".to_string(),
            pillar: "Digital Government".to_string(),
            current_value: current,
            target_value: target,
            status: None,
            milestones: Vec::new(),
        }
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(45.0, 60.0), 75.0);
        assert_eq!(progress_percent(1.0, 3.0), 33.3);
        assert_eq!(progress_percent(150.0, 100.0), 100.0);
        assert_eq!(progress_percent(-5.0, 100.0), 0.0);
    }

    #[test]
    fn test_zero_target_yields_zero_progress() {
        assert_eq!(progress_percent(10.0, 0.0), 0.0);
        assert_eq!(progress_percent(10.0, -4.0), 0.0);
    }

    #[test]
    fn test_classify_status_boundaries() {
        let cutoffs = StatusCutoffs::default();
        assert_eq!(classify_status(70.0, &cutoffs), KpiStatus::OnTrack);
        assert_eq!(classify_status(69.9, &cutoffs), KpiStatus::AtRisk);
        assert_eq!(classify_status(40.0, &cutoffs), KpiStatus::AtRisk);
        assert_eq!(classify_status(39.9, &cutoffs), KpiStatus::Behind);
    }

    #[test]
    fn test_status_uses_unrounded_progress() {
        // 69.96% displays as 70.0 but is still below the on-track cut-off
        let k = kpi(69.96, 100.0);
        assert_eq!(k.progress_percent(), 70.0);
        assert_eq!(k.effective_status(&StatusCutoffs::default()), KpiStatus::AtRisk);
    }

    #[test]
    fn test_recorded_status_overrides_derived() {
        let mut k = kpi(95.0, 100.0);
        assert_eq!(k.effective_status(&StatusCutoffs::default()), KpiStatus::OnTrack);
        k.status = Some(KpiStatus::Behind);
        assert_eq!(k.effective_status(&StatusCutoffs::default()), KpiStatus::Behind);
    }

    #[test]
    fn test_milestone_completion() {
        let mut k = kpi(1.0, 1.0);
        assert_eq!(k.milestone_completion(), None);
        k.milestones = vec![
            Milestone {
                title: "Procurement".to_string(),
                completion: 100.0,
            },
            Milestone {
                title: "Pilot".to_string(),
                completion: 50.0,
            },
            Milestone {
                title: "Rollout".to_string(),
                completion: 120.0,
            },
        ];
        // 120 clamps to 100: (100 + 50 + 100) / 3
        assert_eq!(k.milestone_completion(), Some(83.3));
    }

    #[test]
    fn test_deserialize_kpi() {
        let json = r#"{
            "id": "k9",
            "name": "Permits issued online",
            "pillar": "Service Delivery",
            "current_value": 12,
            "target_value": 40,
            "status": "at_risk"
        }"#;
        let k: Kpi = serde_json::from_str(json).unwrap();
        assert_eq!(k.status, Some(KpiStatus::AtRisk));
        assert!(k.milestones.is_empty());
        assert_eq!(k.progress_percent(), 30.0);
    }
}
