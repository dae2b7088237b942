//! Traffic-light classification of aggregate KPI health
//!
//! Global invariants enforced:
//! - An empty population is always gray, before any percentage math
//! - Branch order is fixed: gray, green, yellow, red

use serde::{Deserialize, Serialize};

/// Traffic-light status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLight {
    Green,
    Yellow,
    Red,
    Gray,
}

impl TrafficLight {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficLight::Green => "green",
            TrafficLight::Yellow => "yellow",
            TrafficLight::Red => "red",
            TrafficLight::Gray => "gray",
        }
    }
}

/// Aggregate counts for a group of KPIs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StatusAggregate {
    pub progress_percent: f64,
    pub at_risk_count: usize,
    pub behind_count: usize,
    pub total_count: usize,
}

impl StatusAggregate {
    /// Share of KPIs that are at risk or behind, in percent
    ///
    /// Returns `None` for an empty population. Counts are expected to be a
    /// subset of the total; inconsistent counts saturate at 100.
    pub fn risk_percentage(&self) -> Option<f64> {
        if self.total_count == 0 {
            return None;
        }
        let flagged = self.at_risk_count.saturating_add(self.behind_count);
        Some((100.0 * flagged as f64 / self.total_count as f64).min(100.0))
    }
}

/// Configurable traffic-light cut-offs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficCutoffs {
    /// Minimum progress for green (inclusive)
    pub green_progress: f64,
    /// Maximum risk percentage for green (inclusive)
    pub green_risk_percent: f64,
    /// Minimum progress for yellow (inclusive)
    pub yellow_progress: f64,
    /// Maximum risk percentage for yellow (inclusive)
    pub yellow_risk_percent: f64,
}

impl Default for TrafficCutoffs {
    fn default() -> Self {
        TrafficCutoffs {
            green_progress: 80.0,
            green_risk_percent: 10.0,
            yellow_progress: 60.0,
            yellow_risk_percent: 30.0,
        }
    }
}

/// Classify with default cut-offs
pub fn classify(aggregate: &StatusAggregate) -> TrafficLight {
    classify_with(aggregate, &TrafficCutoffs::default())
}

/// Classify with custom cut-offs
pub fn classify_with(aggregate: &StatusAggregate, cutoffs: &TrafficCutoffs) -> TrafficLight {
    let Some(risk_percentage) = aggregate.risk_percentage() else {
        return TrafficLight::Gray;
    };
    let progress = aggregate.progress_percent;

    if progress >= cutoffs.green_progress && risk_percentage <= cutoffs.green_risk_percent {
        TrafficLight::Green
    } else if progress >= cutoffs.yellow_progress || risk_percentage <= cutoffs.yellow_risk_percent
    {
        TrafficLight::Yellow
    } else {
        TrafficLight::Red
    }
}
