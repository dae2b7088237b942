//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::aggregates::{PillarSummary, PortfolioSummary};
use crate::batch::ScoredRow;
use crate::risk::RiskResult;

/// Sort scored rows deterministically
pub fn sort_scored(mut rows: Vec<ScoredRow>) -> Vec<ScoredRow> {
    rows.sort_by(|a, b| {
        // 1. Risk score descending
        b.result
            .risk_score
            .partial_cmp(&a.result.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            // 2. Row id ascending
            .then_with(|| a.row_id.cmp(&b.row_id))
    });
    rows
}

/// Render a single result as text
pub fn render_result_text(result: &RiskResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Risk score: {:.2} ({}, {})\n",
        result.risk_score,
        result.risk_level.as_str(),
        result.predicted_outcome.as_str()
    ));
    output.push_str(&format!("Confidence: {:.2}\n", result.confidence));
    output.push_str("Factors:\n");
    output.push_str(&format!("  progress:   {:.1}\n", result.factors.progress));
    output.push_str(&format!("  budget:     {:.1}\n", result.factors.budget));
    output.push_str(&format!("  delay:      {:.1}\n", result.factors.delay));
    output.push_str(&format!("  engagement: {:.1}\n", result.factors.engagement));
    output.push_str("Recommendations:\n");
    for rec in &result.recommendations {
        output.push_str(&format!("  - {}\n", rec));
    }

    output
}

/// Render scored rows as a text table
pub fn render_text(rows: &[ScoredRow]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<8} {:<8} {:<16} {:<20} {}\n",
        "SCORE", "LEVEL", "OUTCOME", "ROW", "ACTIONS"
    ));

    for row in rows {
        output.push_str(&format!(
            "{:<8} {:<8} {:<16} {:<20} {}\n",
            format!("{:.2}", row.result.risk_score),
            row.result.risk_level.as_str(),
            row.result.predicted_outcome.as_str(),
            truncate_or_pad(&row.row_id, 20),
            row.result.recommendations.len(),
        ));
    }

    output
}

/// Render scored rows as JSON
pub fn render_json(rows: &[ScoredRow]) -> String {
    serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string())
}

/// Render a portfolio summary as a text table
pub fn render_portfolio_text(summary: &PortfolioSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<8} {:<30} {:>6} {:>9} {:>8} {:>7} {:>10} {:>7}\n",
        "LIGHT", "PILLAR", "KPIS", "ON_TRACK", "AT_RISK", "BEHIND", "PROGRESS", "RISK%"
    ));

    for pillar in &summary.pillars {
        output.push_str(&render_pillar_line(pillar));
    }
    output.push_str(&"-".repeat(92));
    output.push('\n');
    output.push_str(&render_pillar_line(&summary.overall));

    output
}

fn render_pillar_line(p: &PillarSummary) -> String {
    format!(
        "{:<8} {:<30} {:>6} {:>9} {:>8} {:>7} {:>10.1} {:>7.1}\n",
        p.traffic_light.as_str(),
        truncate_or_pad(&p.pillar, 30),
        p.total,
        p.on_track,
        p.at_risk,
        p.behind,
        p.average_progress,
        p.risk_percentage,
    )
}

/// Render a portfolio summary as JSON
pub fn render_portfolio_json(summary: &PortfolioSummary) -> String {
    serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::{self, AssessmentInputs};

    fn row(id: &str, progress: f64) -> ScoredRow {
        let inputs = AssessmentInputs {
            progress,
            budget_utilization: 50.0,
            delay_days: 0.0,
            engagement_score: 80.0,
        };
        ScoredRow {
            row_id: id.to_string(),
            result: risk::score(&inputs),
            inputs,
        }
    }

    #[test]
    fn test_sort_by_score_then_id() {
        let sorted = sort_scored(vec![row("b", 90.0), row("c", 10.0), row("a", 90.0)]);
        let ids: Vec<&str> = sorted.iter().map(|r| r.row_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_render_text_has_header_and_rows() {
        let text = render_text(&[row("a", 90.0), row("b", 10.0)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("SCORE"));
        assert!(lines[1].starts_with("3.00"));
        assert!(lines[2].contains("Low"));
    }

    #[test]
    fn test_render_result_text_lists_recommendations() {
        let result = risk::score(&AssessmentInputs {
            progress: 10.0,
            budget_utilization: 120.0,
            delay_days: 40.0,
            engagement_score: 20.0,
        });
        let text = render_result_text(&result);
        assert!(text.contains("(High, At Risk)"));
        assert_eq!(text.matches("\n  - ").count(), 5);
    }

    #[test]
    fn test_render_json_is_deterministic() {
        let rows = vec![row("a", 90.0)];
        assert_eq!(render_json(&rows), render_json(&rows));
        let parsed: serde_json::Value = serde_json::from_str(&render_json(&rows)).unwrap();
        assert_eq!(parsed[0]["result"]["risk_level"], "Low");
        assert_eq!(parsed[0]["result"]["predicted_outcome"], "On Track");
    }

    fn portfolio() -> PortfolioSummary {
        use crate::config::ResolvedConfig;
        use crate::kpi::Kpi;

        let kpi = |id: &str, pillar: &str, current: f64| Kpi {
            id: id.to_string(),
            name: format!("KPI {}", id),
            pillar: pillar.to_string(),
            current_value: current,
            target_value: 100.0,
            status: None,
            milestones: Vec::new(),
        };
        let kpis = vec![
            kpi("a", "Wellbeing", 95.0),
            kpi("b", "Economy", 20.0),
            kpi("c", "Economy", 30.0),
        ];
        crate::aggregates::summarize(&kpis, &ResolvedConfig::defaults().unwrap())
    }

    #[test]
    fn test_render_portfolio_text_layout() {
        let text = render_portfolio_text(&portfolio());
        let lines: Vec<&str> = text.lines().collect();
        // header + 2 pillars + separator + overall
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("LIGHT"));
        assert!(lines[0].contains("PILLAR"));
        assert!(lines[1].starts_with("red"));
        assert!(lines[1].contains("Economy"));
        assert!(lines[2].starts_with("green"));
        assert!(lines[2].contains("Wellbeing"));
        assert_eq!(lines[3], "-".repeat(92));
        assert!(lines[4].contains("All pillars"));
        assert!(lines[4].contains("48.3"));
    }

    #[test]
    fn test_render_portfolio_json_round_trips() {
        let summary = portfolio();
        let json = render_portfolio_json(&summary);
        let parsed: PortfolioSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, summary);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["pillars"][0]["traffic_light"], "red");
        assert_eq!(value["pillars"][1]["traffic_light"], "green");
        assert_eq!(value["overall"]["traffic_light"], "red");
    }

    #[test]
    fn test_truncate_or_pad() {
        assert_eq!(truncate_or_pad("abc", 5), "abc  ");
        assert_eq!(truncate_or_pad("abcdefgh", 6), "abc...");
    }
}
