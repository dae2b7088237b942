//! Bulk scoring of assessment rows from CSV
//!
//! Global invariants enforced:
//! - Output order equals input order, regardless of parallel scoring
//! - A malformed row never aborts the batch; it is reported as rejected

use crate::input::{InputError, RawAssessment};
use crate::risk::{self, round_to, AssessmentInputs, RiskResult, ScoringModel};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Column headers of the CSV export, in order
pub const EXPORT_HEADERS: [&str; 8] = [
    "Row ID",
    "Progress",
    "Budget Utilization",
    "Delay Days",
    "Engagement Score",
    "Risk Score",
    "Risk Level",
    "Predicted Outcome",
];

/// One CSV data row, parsed or not
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    /// 1-based data line (header excluded)
    pub line: usize,
    pub parsed: std::result::Result<RawAssessment, String>,
}

/// A row that was validated and scored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ScoredRow {
    pub row_id: String,
    pub inputs: AssessmentInputs,
    pub result: RiskResult,
}

/// A row that could not be scored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RejectedRow {
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    pub reason: String,
}

/// Result of scoring a batch
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct BatchOutcome {
    pub scored: Vec<ScoredRow>,
    pub rejected: Vec<RejectedRow>,
}

/// Read assessment rows from CSV with a header line
///
/// Rows that fail to deserialize are kept with their error message.
pub fn read_assessments<R: Read>(reader: R) -> Result<Vec<BatchRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Surface a broken header as a hard error rather than per-row noise
    csv_reader.headers().context("failed to read CSV header")?;

    let rows = csv_reader
        .deserialize::<RawAssessment>()
        .enumerate()
        .map(|(i, record)| BatchRow {
            line: i + 1,
            parsed: record.map_err(|e| e.to_string()),
        })
        .collect();

    Ok(rows)
}

/// Validate and score every row
pub fn score_rows(rows: Vec<BatchRow>, model: &ScoringModel) -> BatchOutcome {
    let mut valid: Vec<(String, AssessmentInputs)> = Vec::new();
    let mut rejected = Vec::new();

    for row in rows {
        match validate_row(&row) {
            Ok(entry) => valid.push(entry),
            Err(rejection) => {
                tracing::warn!(line = rejection.line, reason = %rejection.reason, "rejected row");
                rejected.push(rejection);
            }
        }
    }

    let scored: Vec<ScoredRow> = valid
        .into_par_iter()
        .map(|(row_id, inputs)| ScoredRow {
            row_id,
            result: risk::score_with_model(&inputs, model),
            inputs,
        })
        .collect();

    tracing::info!(
        scored = scored.len(),
        rejected = rejected.len(),
        "batch scoring complete"
    );

    BatchOutcome { scored, rejected }
}

fn validate_row(row: &BatchRow) -> std::result::Result<(String, AssessmentInputs), RejectedRow> {
    let raw = row.parsed.as_ref().map_err(|reason| RejectedRow {
        line: row.line,
        row_id: None,
        reason: reason.clone(),
    })?;

    let inputs = raw.validate().map_err(|e: InputError| RejectedRow {
        line: row.line,
        row_id: raw.row_id.clone(),
        reason: e.to_string(),
    })?;

    let row_id = raw
        .row_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| row.line.to_string());

    Ok((row_id, inputs))
}

/// Read and score a CSV stream in one step
pub fn score_csv<R: Read>(reader: R, model: &ScoringModel) -> Result<BatchOutcome> {
    let rows = read_assessments(reader)?;
    Ok(score_rows(rows, model))
}

/// Write scored rows as CSV with the export columns
pub fn write_csv<W: Write>(writer: W, rows: &[ScoredRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(EXPORT_HEADERS)
        .context("failed to write CSV header")?;

    for row in rows {
        csv_writer
            .write_record([
                row.row_id.clone(),
                format_number(row.inputs.progress),
                format_number(row.inputs.budget_utilization),
                format_number(row.inputs.delay_days),
                format_number(row.inputs.engagement_score),
                format_number(row.result.risk_score),
                row.result.risk_level.as_str().to_string(),
                row.result.predicted_outcome.as_str().to_string(),
            ])
            .with_context(|| format!("failed to write CSV row {}", row.row_id))?;
    }

    csv_writer.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Render scored rows to a CSV string
pub fn to_csv_string(rows: &[ScoredRow]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, rows)?;
    String::from_utf8(buf).context("CSV output was not valid UTF-8")
}

/// Numbers are written with at most 2 decimals and no trailing zeros
fn format_number(value: f64) -> String {
    let rounded = round_to(value, 2);
    let text = format!("{:.2}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
