//! Configuration file support for kpiscope
//!
//! Loads scoring and classification settings from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.kpiscoperc.json` in the working directory
//! 3. `kpiscope.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::kpi::StatusCutoffs;
use crate::risk::{LevelThresholds, RiskWeights, ScoringModel};
use crate::traffic::TrafficCutoffs;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names, in discovery order
pub const CONFIG_FILE_NAMES: &[&str] = &[".kpiscoperc.json", "kpiscope.config.json"];

/// Tolerance for the weights-sum-to-one check
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// kpiscope configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KpiscopeConfig {
    /// Custom factor weights for the risk score
    #[serde(default)]
    pub weights: Option<WeightConfig>,

    /// Custom risk level thresholds
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Custom traffic-light cut-offs
    #[serde(default)]
    pub traffic: Option<TrafficConfig>,

    /// Custom KPI status cut-offs
    #[serde(default)]
    pub kpi_status: Option<KpiStatusConfig>,

    /// Maximum number of rows to show in batch reports
    #[serde(default)]
    pub top: Option<usize>,
}

/// Custom factor weights; together they must sum to 1.0
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightConfig {
    /// Weight for progress shortfall (default: 0.30)
    pub progress: Option<f64>,
    /// Weight for budget overrun (default: 0.25)
    pub budget: Option<f64>,
    /// Weight for schedule delay (default: 0.30)
    pub delay: Option<f64>,
    /// Weight for low engagement (default: 0.15)
    pub engagement: Option<f64>,
}

/// Custom risk level thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Risk score at which Medium starts (default: 40)
    pub medium: Option<f64>,
    /// Risk score at which High starts (default: 70)
    pub high: Option<f64>,
}

/// Custom traffic-light cut-offs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficConfig {
    /// Minimum progress for green (default: 80)
    pub green_progress: Option<f64>,
    /// Maximum at-risk share for green (default: 10)
    pub green_risk_percent: Option<f64>,
    /// Minimum progress for yellow (default: 60)
    pub yellow_progress: Option<f64>,
    /// Maximum at-risk share for yellow (default: 30)
    pub yellow_risk_percent: Option<f64>,
}

/// Custom KPI status cut-offs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KpiStatusConfig {
    /// Minimum progress to count as on track (default: 70)
    pub on_track: Option<f64>,
    /// Progress below which a KPI is behind (default: 40)
    pub behind: Option<f64>,
}

/// Resolved configuration with every default filled in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub weights: RiskWeights,
    pub thresholds: LevelThresholds,
    pub traffic: TrafficCutoffs,
    pub status: StatusCutoffs,
    pub top_n: Option<usize>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl KpiscopeConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        let weights = self.resolved_weights();
        for (name, val) in [
            ("progress", weights.progress),
            ("budget", weights.budget),
            ("delay", weights.delay),
            ("engagement", weights.engagement),
        ] {
            if !(0.0..=1.0).contains(&val) {
                anyhow::bail!("weights.{} must be between 0 and 1 (got {})", name, val);
            }
        }
        if (weights.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            anyhow::bail!("weights must sum to 1.0 (got {})", weights.sum());
        }

        let thresholds = self.resolved_thresholds();
        for (name, val) in [("medium", thresholds.medium), ("high", thresholds.high)] {
            if val <= 0.0 || val > 100.0 {
                anyhow::bail!("thresholds.{} must be in (0, 100] (got {})", name, val);
            }
        }
        if thresholds.medium >= thresholds.high {
            anyhow::bail!(
                "thresholds.medium ({}) must be less than thresholds.high ({})",
                thresholds.medium,
                thresholds.high
            );
        }

        let traffic = self.resolved_traffic();
        for (name, val) in [
            ("green_progress", traffic.green_progress),
            ("green_risk_percent", traffic.green_risk_percent),
            ("yellow_progress", traffic.yellow_progress),
            ("yellow_risk_percent", traffic.yellow_risk_percent),
        ] {
            if !(0.0..=100.0).contains(&val) {
                anyhow::bail!("traffic.{} must be between 0 and 100 (got {})", name, val);
            }
        }
        if traffic.yellow_progress > traffic.green_progress {
            anyhow::bail!(
                "traffic.yellow_progress ({}) must not exceed traffic.green_progress ({})",
                traffic.yellow_progress,
                traffic.green_progress
            );
        }
        if traffic.green_risk_percent > traffic.yellow_risk_percent {
            anyhow::bail!(
                "traffic.green_risk_percent ({}) must not exceed traffic.yellow_risk_percent ({})",
                traffic.green_risk_percent,
                traffic.yellow_risk_percent
            );
        }

        let status = self.resolved_status();
        for (name, val) in [("on_track", status.on_track), ("behind", status.behind)] {
            if !(0.0..=100.0).contains(&val) {
                anyhow::bail!("kpi_status.{} must be between 0 and 100 (got {})", name, val);
            }
        }
        if status.behind >= status.on_track {
            anyhow::bail!(
                "kpi_status.behind ({}) must be less than kpi_status.on_track ({})",
                status.behind,
                status.on_track
            );
        }

        if self.top == Some(0) {
            anyhow::bail!("top must be at least 1");
        }

        Ok(())
    }

    /// Resolve config into the form used by scoring and aggregation
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        Ok(ResolvedConfig {
            weights: self.resolved_weights(),
            thresholds: self.resolved_thresholds(),
            traffic: self.resolved_traffic(),
            status: self.resolved_status(),
            top_n: self.top,
            config_path: None,
        })
    }

    fn resolved_weights(&self) -> RiskWeights {
        let d = RiskWeights::default();
        match &self.weights {
            Some(w) => RiskWeights {
                progress: w.progress.unwrap_or(d.progress),
                budget: w.budget.unwrap_or(d.budget),
                delay: w.delay.unwrap_or(d.delay),
                engagement: w.engagement.unwrap_or(d.engagement),
            },
            None => d,
        }
    }

    fn resolved_thresholds(&self) -> LevelThresholds {
        let d = LevelThresholds::default();
        match &self.thresholds {
            Some(t) => LevelThresholds {
                medium: t.medium.unwrap_or(d.medium),
                high: t.high.unwrap_or(d.high),
            },
            None => d,
        }
    }

    fn resolved_traffic(&self) -> TrafficCutoffs {
        let d = TrafficCutoffs::default();
        match &self.traffic {
            Some(t) => TrafficCutoffs {
                green_progress: t.green_progress.unwrap_or(d.green_progress),
                green_risk_percent: t.green_risk_percent.unwrap_or(d.green_risk_percent),
                yellow_progress: t.yellow_progress.unwrap_or(d.yellow_progress),
                yellow_risk_percent: t.yellow_risk_percent.unwrap_or(d.yellow_risk_percent),
            },
            None => d,
        }
    }

    fn resolved_status(&self) -> StatusCutoffs {
        let d = StatusCutoffs::default();
        match &self.kpi_status {
            Some(s) => StatusCutoffs {
                on_track: s.on_track.unwrap_or(d.on_track),
                behind: s.behind.unwrap_or(d.behind),
            },
            None => d,
        }
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        KpiscopeConfig::default().resolve()
    }

    /// Weights and thresholds for the risk scorer
    pub fn scoring_model(&self) -> ScoringModel {
        ScoringModel {
            weights: self.weights,
            thresholds: self.thresholds,
        }
    }
}

/// Discover and load a config file from a directory
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(dir: &Path) -> Result<Option<(KpiscopeConfig, PathBuf)>> {
    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<KpiscopeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: KpiscopeConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `dir`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(dir: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (KpiscopeConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    if let Some(path) = &source_path {
        tracing::debug!(path = %path.display(), "loaded configuration");
    }
    resolved.config_path = source_path;
    Ok(resolved)
}
