//! Scoring Invariant Tests
//!
//! These tests explicitly validate invariants of the risk scorer and the
//! traffic-light classifier that must always hold.

use kpiscope_core::risk::{self, AssessmentInputs, PredictedOutcome, RiskLevel};
use kpiscope_core::traffic::{classify, StatusAggregate, TrafficLight};
use kpiscope_core::{assess, RawAssessment, ResolvedConfig};

const STEPS: [f64; 9] = [0.0, 7.5, 25.0, 40.0, 50.0, 60.0, 75.0, 90.0, 100.0];
const BUDGETS: [f64; 6] = [0.0, 60.0, 80.0, 95.0, 110.0, 250.0];
const DELAYS: [f64; 6] = [0.0, 3.0, 7.0, 8.0, 30.0, 120.0];

fn inputs(progress: f64, budget: f64, delay: f64, engagement: f64) -> AssessmentInputs {
    AssessmentInputs {
        progress,
        budget_utilization: budget,
        delay_days: delay,
        engagement_score: engagement,
    }
}

/// Every combination of the sample grids
fn sample_inputs() -> Vec<AssessmentInputs> {
    let mut all = Vec::new();
    for &p in &STEPS {
        for &b in &BUDGETS {
            for &d in &DELAYS {
                for &e in &STEPS {
                    all.push(inputs(p, b, d, e));
                }
            }
        }
    }
    all
}

#[test]
fn test_score_always_within_bounds() {
    for sample in sample_inputs() {
        let result = risk::score(&sample);
        assert!(
            (0.0..=100.0).contains(&result.risk_score),
            "score {} out of bounds for {:?}",
            result.risk_score,
            sample
        );
    }
}

#[test]
fn test_level_and_outcome_follow_score() {
    for sample in sample_inputs() {
        let result = risk::score(&sample);
        let expected = if result.risk_score >= 70.0 {
            (RiskLevel::High, PredictedOutcome::AtRisk)
        } else if result.risk_score >= 40.0 {
            (RiskLevel::Medium, PredictedOutcome::NeedsAttention)
        } else {
            (RiskLevel::Low, PredictedOutcome::OnTrack)
        };
        assert_eq!((result.risk_level, result.predicted_outcome), expected);
    }
}

#[test]
fn test_recommendations_never_empty() {
    for sample in sample_inputs() {
        assert!(!risk::score(&sample).recommendations.is_empty());
    }
}

#[test]
fn test_escalation_present_exactly_when_high() {
    let escalation =
        kpiscope_core::recommend::Recommendation::EscalateToManagement.message();
    for sample in sample_inputs() {
        let result = risk::score(&sample);
        let escalated = result.recommendations.iter().any(|r| r == escalation);
        assert_eq!(escalated, result.risk_level == RiskLevel::High);
        if escalated {
            assert_eq!(result.recommendations.last().map(String::as_str), Some(escalation));
        }
    }
}

#[test]
fn test_monotonic_in_delay() {
    for &p in &STEPS {
        for &e in &STEPS {
            let mut previous = f64::MIN;
            for &d in &DELAYS {
                let current = risk::score(&inputs(p, 90.0, d, e)).risk_score;
                assert!(current >= previous, "delay {} lowered the score", d);
                previous = current;
            }
        }
    }
}

#[test]
fn test_monotonic_in_progress_and_engagement() {
    for &b in &BUDGETS {
        for &d in &DELAYS {
            let mut previous = f64::MAX;
            for &p in &STEPS {
                let current = risk::score(&inputs(p, b, d, 50.0)).risk_score;
                assert!(current <= previous, "progress {} raised the score", p);
                previous = current;
            }

            let mut previous = f64::MAX;
            for &e in &STEPS {
                let current = risk::score(&inputs(50.0, b, d, e)).risk_score;
                assert!(current <= previous, "engagement {} raised the score", e);
                previous = current;
            }
        }
    }
}

#[test]
fn test_scoring_is_idempotent() {
    let sample = inputs(45.0, 95.0, 20.0, 60.0);
    let first = risk::score(&sample);
    let second = risk::score(&sample);
    assert_eq!(first, second);
    assert_eq!(first.risk_score.to_bits(), second.risk_score.to_bits());
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_on_track_initiative() {
    let result = risk::score(&inputs(75.0, 68.0, 5.0, 82.0));
    assert!((result.risk_score - 12.5).abs() < 1e-9);
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert_eq!(result.recommendations.len(), 1);
}

#[test]
fn test_budget_and_delay_pressure() {
    let result = risk::score(&inputs(45.0, 95.0, 20.0, 60.0));
    assert!((result.risk_score - 57.39).abs() < 1e-9);
    assert_eq!(result.risk_level, RiskLevel::Medium);
    // progress, budget, delay fire; engagement of exactly 60 does not
    assert_eq!(result.recommendations.len(), 3);
}

#[test]
fn test_high_risk_initiative_escalates() {
    let result = risk::score(&inputs(30.0, 100.0, 25.0, 40.0));
    // 0.21 + 0.25 + 0.25 + 0.0642857 = 0.7742857
    assert!((result.risk_score - 77.43).abs() < 1e-9);
    assert_eq!(result.risk_level, RiskLevel::High);
    assert_eq!(result.predicted_outcome, PredictedOutcome::AtRisk);
    assert_eq!(result.recommendations.len(), 5);
}

#[test]
fn test_traffic_light_empty_population() {
    let aggregate = StatusAggregate {
        progress_percent: 85.0,
        at_risk_count: 0,
        behind_count: 0,
        total_count: 0,
    };
    assert_eq!(classify(&aggregate), TrafficLight::Gray);
}

#[test]
fn test_traffic_light_green_at_ten_percent() {
    let aggregate = StatusAggregate {
        progress_percent: 85.0,
        at_risk_count: 1,
        behind_count: 0,
        total_count: 10,
    };
    assert_eq!(classify(&aggregate), TrafficLight::Green);
}

#[test]
fn test_assess_validates_before_scoring() {
    let config = ResolvedConfig::defaults().unwrap();

    let raw = RawAssessment::from(inputs(75.0, 68.0, 5.0, 82.0));
    let result = assess(&raw, &config).unwrap();
    assert_eq!(result, risk::score(&inputs(75.0, 68.0, 5.0, 82.0)));

    let mut invalid = raw.clone();
    invalid.engagement_score = Some(140.0);
    assert!(assess(&invalid, &config).is_err());
}
