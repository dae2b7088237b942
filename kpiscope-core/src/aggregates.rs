//! Pillar and portfolio rollups of KPI health
//!
//! Global invariants enforced:
//! - Aggregates are strictly derived (never stored, always computed)
//! - Deterministic ordering (pillars sorted by name)

use crate::config::ResolvedConfig;
use crate::kpi::{Kpi, KpiStatus};
use crate::risk::round_to;
use crate::traffic::{self, StatusAggregate, TrafficLight};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Health summary for one pillar (or the whole portfolio)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PillarSummary {
    pub pillar: String,
    pub total: usize,
    pub on_track: usize,
    pub at_risk: usize,
    pub behind: usize,
    pub average_progress: f64,
    pub risk_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_completion: Option<f64>,
    pub traffic_light: TrafficLight,
}

/// Portfolio summary container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PortfolioSummary {
    pub pillars: Vec<PillarSummary>,
    pub overall: PillarSummary,
}

/// Label used for the portfolio-wide summary
pub const OVERALL_LABEL: &str = "All pillars";

#[derive(Default)]
struct Tally {
    total: usize,
    on_track: usize,
    at_risk: usize,
    behind: usize,
    progress_sum: f64,
    milestone_sum: f64,
    milestone_kpis: usize,
}

impl Tally {
    fn add(&mut self, kpi: &Kpi, config: &ResolvedConfig) {
        self.total += 1;
        self.progress_sum += kpi.exact_progress();
        match kpi.effective_status(&config.status) {
            KpiStatus::OnTrack => self.on_track += 1,
            KpiStatus::AtRisk => self.at_risk += 1,
            KpiStatus::Behind => self.behind += 1,
        }
        if let Some(completion) = kpi.milestone_completion() {
            self.milestone_sum += completion;
            self.milestone_kpis += 1;
        }
    }

    fn into_summary(self, pillar: String, config: &ResolvedConfig) -> PillarSummary {
        let exact_average = if self.total == 0 {
            0.0
        } else {
            self.progress_sum / self.total as f64
        };
        // Classify on unrounded values; only the reported fields are rounded
        let aggregate = StatusAggregate {
            progress_percent: exact_average,
            at_risk_count: self.at_risk,
            behind_count: self.behind,
            total_count: self.total,
        };
        let milestone_completion = if self.milestone_kpis == 0 {
            None
        } else {
            Some(round_to(self.milestone_sum / self.milestone_kpis as f64, 1))
        };

        PillarSummary {
            pillar,
            total: self.total,
            on_track: self.on_track,
            at_risk: self.at_risk,
            behind: self.behind,
            average_progress: round_to(exact_average, 1),
            risk_percentage: aggregate.risk_percentage().map_or(0.0, |p| round_to(p, 1)),
            milestone_completion,
            traffic_light: traffic::classify_with(&aggregate, &config.traffic),
        }
    }
}

/// Summarize KPIs per pillar and across the portfolio
pub fn summarize(kpis: &[Kpi], config: &ResolvedConfig) -> PortfolioSummary {
    let mut by_pillar: HashMap<&str, Tally> = HashMap::new();
    let mut overall = Tally::default();

    for kpi in kpis {
        by_pillar
            .entry(kpi.pillar.as_str())
            .or_default()
            .add(kpi, config);
        overall.add(kpi, config);
    }

    let mut pillars: Vec<PillarSummary> = by_pillar
        .into_iter()
        .map(|(pillar, tally)| tally.into_summary(pillar.to_string(), config))
        .collect();

    // Sort deterministically by pillar name
    pillars.sort_by(|a, b| a.pillar.cmp(&b.pillar));

    tracing::debug!(
        kpis = kpis.len(),
        pillars = pillars.len(),
        "summarized portfolio"
    );

    PortfolioSummary {
        pillars,
        overall: overall.into_summary(OVERALL_LABEL.to_string(), config),
    }
}
