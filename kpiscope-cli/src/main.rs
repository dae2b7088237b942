//! kpiscope CLI - delivery risk scoring and KPI traffic-light reports

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Reports go to stdout, diagnostics and logs to stderr

use anyhow::Context;
use clap::{Parser, Subcommand};
use kpiscope_core::config::{self, ResolvedConfig};
use kpiscope_core::report::{self, render_json, render_text};
use kpiscope_core::traffic;
use kpiscope_core::{
    assess, batch, load_portfolio, score_file, summarize, validate_status, RawAssessment,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kpiscope")]
#[command(about = "Delivery risk scoring and KPI traffic-light reports for strategy dashboards")]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single initiative assessment
    Score {
        /// Delivery progress, 0-100
        #[arg(long)]
        progress: f64,

        /// Budget utilization percent (may exceed 100)
        #[arg(long)]
        budget: f64,

        /// Days behind schedule
        #[arg(long)]
        delay: f64,

        /// Stakeholder engagement score, 0-100
        #[arg(long)]
        engagement: f64,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Score every row of a CSV file
    Batch {
        /// Path to CSV file with a header row
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Show only top N rows by risk score (overrides config file)
        #[arg(long)]
        top: Option<usize>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Classify aggregate KPI counts into a traffic light
    Status {
        /// Average progress percent
        #[arg(long)]
        progress: f64,

        /// Number of KPIs at risk
        #[arg(long)]
        at_risk: usize,

        /// Number of KPIs behind
        #[arg(long)]
        behind: usize,

        /// Total number of KPIs
        #[arg(long)]
        total: usize,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Summarize a KPI portfolio by pillar
    Portfolio {
        /// Path to portfolio JSON file
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without scoring anything
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Score {
            progress,
            budget,
            delay,
            engagement,
            format,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let raw = RawAssessment {
                row_id: None,
                progress: Some(progress),
                budget_utilization: Some(budget),
                delay_days: Some(delay),
                engagement_score: Some(engagement),
            };
            let result = assess(&raw, &resolved).context("invalid assessment")?;

            match format {
                OutputFormat::Text => print!("{}", report::render_result_text(&result)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Csv => anyhow::bail!("CSV format is only available for batch"),
            }
        }
        Commands::Batch {
            path,
            format,
            output,
            top,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let outcome = score_file(&path, &resolved)?;

            if !outcome.rejected.is_empty() {
                eprintln!(
                    "Skipped {} row(s) that failed validation",
                    outcome.rejected.len()
                );
            }

            let sorted = report::sort_scored(outcome.scored);
            let rows = match top.or(resolved.top_n) {
                Some(n) => sorted.into_iter().take(n).collect(),
                None => sorted,
            };

            let rendered = match format {
                OutputFormat::Text => render_text(&rows),
                OutputFormat::Json => render_json(&rows) + "\n",
                OutputFormat::Csv => batch::to_csv_string(&rows)?,
            };
            write_output(&rendered, output.as_deref())?;
        }
        Commands::Status {
            progress,
            at_risk,
            behind,
            total,
            format,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let aggregate = validate_status(progress, at_risk, behind, total)
                .context("invalid status counts")?;
            let light = traffic::classify_with(&aggregate, &resolved.traffic);

            match format {
                OutputFormat::Text => match aggregate.risk_percentage() {
                    Some(risk) => println!(
                        "{} (progress {:.1}%, at risk or behind {:.1}%)",
                        light.as_str(),
                        aggregate.progress_percent,
                        risk
                    ),
                    None => println!("{} (no KPIs)", light.as_str()),
                },
                OutputFormat::Json => {
                    let value = serde_json::json!({
                        "aggregate": aggregate,
                        "risk_percentage": aggregate.risk_percentage(),
                        "traffic_light": light,
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                OutputFormat::Csv => anyhow::bail!("CSV format is only available for batch"),
            }
        }
        Commands::Portfolio {
            path,
            format,
            config: config_path,
        } => {
            let resolved = load_config(config_path.as_deref())?;
            let kpis = load_portfolio(&path)?;
            let summary = summarize(&kpis, &resolved);

            match format {
                OutputFormat::Text => print!("{}", report::render_portfolio_text(&summary)),
                OutputFormat::Json => println!("{}", report::render_portfolio_json(&summary)),
                OutputFormat::Csv => anyhow::bail!("CSV format is only available for batch"),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                match config::load_and_resolve(&project_root, path.as_deref()) {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let resolved = load_config(path.as_deref())?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    // A subscriber may already be installed when embedded; keep the existing one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(config_path: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let project_root = std::env::current_dir()?;
    let resolved = config::load_and_resolve(&project_root, config_path)
        .context("failed to load configuration")?;
    if let Some(path) = &resolved.config_path {
        eprintln!("Using config: {}", path.display());
    }
    Ok(resolved)
}

fn write_output(rendered: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Report written to: {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn print_config(resolved: &ResolvedConfig) {
    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!();
    println!("Weights:");
    println!("  progress: {}", resolved.weights.progress);
    println!("  budget: {}", resolved.weights.budget);
    println!("  delay: {}", resolved.weights.delay);
    println!("  engagement: {}", resolved.weights.engagement);
    println!();
    println!("Risk levels:");
    println!("  medium: {}", resolved.thresholds.medium);
    println!("  high: {}", resolved.thresholds.high);
    println!();
    println!("Traffic light:");
    println!("  green_progress: {}", resolved.traffic.green_progress);
    println!(
        "  green_risk_percent: {}",
        resolved.traffic.green_risk_percent
    );
    println!("  yellow_progress: {}", resolved.traffic.yellow_progress);
    println!(
        "  yellow_risk_percent: {}",
        resolved.traffic.yellow_risk_percent
    );
    println!();
    println!("KPI status:");
    println!("  on_track: {}", resolved.status.on_track);
    println!("  behind: {}", resolved.status.behind);
    println!();
    println!(
        "Top: {}",
        resolved
            .top_n
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
}
