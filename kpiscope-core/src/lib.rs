//! kpiscope core library - delivery risk scoring and KPI health classification

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Scoring and classification are pure functions of their inputs
// - No global mutable state, no ambient clock or user context
// - Deterministic output ordering must be explicit
// - Identical input yields byte-for-byte identical output

pub mod aggregates;
pub mod batch;
pub mod config;
pub mod input;
pub mod kpi;
pub mod recommend;
pub mod report;
pub mod risk;
pub mod traffic;

pub use aggregates::{summarize, PillarSummary, PortfolioSummary};
pub use batch::{BatchOutcome, ScoredRow};
pub use config::ResolvedConfig;
pub use input::{validate_status, InputError, RawAssessment};
pub use kpi::{Kpi, KpiStatus, Milestone};
pub use report::{render_json, render_text};
pub use risk::{score, AssessmentInputs, PredictedOutcome, RiskLevel, RiskResult};
pub use traffic::{classify, StatusAggregate, TrafficLight};

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Validate a raw payload and score it
pub fn assess(raw: &RawAssessment, config: &ResolvedConfig) -> Result<RiskResult, InputError> {
    let inputs = raw.validate()?;
    Ok(risk::score_with_model(&inputs, &config.scoring_model()))
}

/// Score every row of a CSV file
pub fn score_file(path: &Path, config: &ResolvedConfig) -> Result<BatchOutcome> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    batch::score_csv(file, &config.scoring_model())
        .with_context(|| format!("failed to score {}", path.display()))
}

/// Portfolio file contents
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortfolioFile {
    pub kpis: Vec<Kpi>,
}

/// Load KPIs from a JSON portfolio file
pub fn load_portfolio(path: &Path) -> Result<Vec<Kpi>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read portfolio file: {}", path.display()))?;
    let portfolio: PortfolioFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse portfolio file: {}", path.display()))?;
    Ok(portfolio.kpis)
}
