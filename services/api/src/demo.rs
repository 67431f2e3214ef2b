use crate::infra::load_engine;
use chrono::{Local, NaiveDate};
use clap::Args;
use riskalloc::config::AppConfig;
use riskalloc::engine::{
    AdjustmentStatus, AllocationEngine, AllocationProfile, Bucket, EvaluationReport,
};
use riskalloc::error::AppError;
use riskalloc::readings::ReadingsImporter;
use riskalloc::telemetry;
use std::io::Cursor;
use std::path::PathBuf;

const SAMPLE_READINGS: &str = include_str!("../data/sample_readings.csv");

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Readings CSV with a `set,metric,value` header
    #[arg(long)]
    pub(crate) readings: PathBuf,
    /// Allocation profile (early-career, mid-career, pre-retirement, retired)
    #[arg(long)]
    pub(crate) profile: AllocationProfile,
    /// Print the full report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Allocation profile used for the sample snapshot.
    #[arg(long, default_value_t = AllocationProfile::MidCareer)]
    pub(crate) profile: AllocationProfile,
    /// Label the snapshot with this date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print the full report as JSON instead of text.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        readings,
        profile,
        json,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let engine = load_engine(&config)?;
    let request = ReadingsImporter::from_path(&readings, profile)?;
    let report = engine.evaluate(&request);

    if json {
        print_json(&report)
    } else {
        println!("Allocation report for {}", readings.display());
        println!("{}", render_report(&report));
        Ok(())
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        profile,
        as_of,
        json,
    } = args;

    let engine = load_engine(&AppConfig::load()?)?;
    let report = evaluate_sample(&engine, profile)?;

    if json {
        return print_json(&report);
    }

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    println!("Allocation demo");
    println!("Snapshot: bundled late-cycle sample, as of {as_of}");
    println!("{}", render_report(&report));

    println!("\nSame snapshot across profiles");
    for other in AllocationProfile::ALL {
        let report = evaluate_sample(&engine, other)?;
        println!("- {:<15} {}", other.label(), format_allocation(&report, false));
    }
    Ok(())
}

pub(crate) fn print_engine_config() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let tables = config.engine.load()?;
    // tables the engine would reject are reported, never printed
    AllocationEngine::new(tables.clone())?;
    println!("{}", tables.to_json_pretty()?);
    Ok(())
}

pub(crate) fn evaluate_sample(
    engine: &AllocationEngine,
    profile: AllocationProfile,
) -> Result<EvaluationReport, AppError> {
    let request = ReadingsImporter::from_reader(Cursor::new(SAMPLE_READINGS), profile)?;
    Ok(engine.evaluate(&request))
}

fn print_json(report: &EvaluationReport) -> Result<(), AppError> {
    let body = serde_json::to_string_pretty(report).map_err(std::io::Error::from)?;
    println!("{body}");
    Ok(())
}

fn format_allocation(report: &EvaluationReport, base: bool) -> String {
    let vector = if base {
        &report.base_allocation
    } else {
        &report.allocation
    };
    vector
        .iter()
        .map(|(bucket, share)| format!("{} {:.2}%", bucket_label(bucket), share))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn bucket_label(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::UsEquity => "US equity",
        Bucket::IntlEquity => "Intl equity",
        Bucket::RealAssets => "Real assets",
        Bucket::Bonds => "Bonds",
        Bucket::Cash => "Cash",
    }
}

pub(crate) fn render_report(report: &EvaluationReport) -> String {
    let mut lines = Vec::new();
    let composite = &report.composite;

    lines.push(format!("Profile: {}", report.profile));
    lines.push(format!(
        "Composite risk score: {:.2} ({}), {} of {} indicators observed",
        composite.value,
        composite.tier,
        composite.observed_count(),
        composite.breakdown.len()
    ));

    lines.push("\nIndicator scores".to_string());
    for metric in &composite.breakdown {
        let raw = match metric.raw_value {
            Some(value) => format!("{value}"),
            None => "missing".to_string(),
        };
        lines.push(format!(
            "- {}: {} -> {} '{}' (weight {:.2}, contributes {:.3})",
            metric.metric_id,
            raw,
            metric.score,
            metric.label,
            metric.weight,
            metric.weighted_contribution
        ));
    }

    lines.push(format!(
        "\nBond favorability: {:.0} (baseline {:.0})",
        report.sub_score.value, report.sub_score.baseline
    ));
    for reason in &report.sub_score.reasons {
        lines.push(format!("- {reason}"));
    }

    lines.push(format!(
        "\nSentiment: {:.1} ({})",
        report.sentiment.value,
        report.sentiment.label.label()
    ));

    lines.push(format!("\nBase allocation:  {}", format_allocation(report, true)));
    lines.push(format!("Final allocation: {}", format_allocation(report, false)));

    if report.adjustments.is_empty() {
        lines.push("\nAdjustments: none triggered".to_string());
    } else {
        lines.push("\nAdjustments".to_string());
        for record in &report.adjustments {
            let outcome = match &record.status {
                AdjustmentStatus::Applied => "applied".to_string(),
                AdjustmentStatus::Capped => format!("capped at {:.2}", record.moved),
                AdjustmentStatus::Exhausted => "nothing left to move".to_string(),
                AdjustmentStatus::Suppressed { by } => format!("suppressed by {by}"),
            };
            lines.push(format!(
                "- {}: {:.2} from {} to {}, {}",
                record.rule_id,
                record.requested,
                bucket_label(record.donor),
                bucket_label(record.recipient),
                outcome
            ));
        }
    }

    if !report.watchlist.is_empty() {
        lines.push("\nWatchlist".to_string());
        for next in &report.watchlist {
            lines.push(format!("- {}", next.summary()));
        }
    }

    if !report.warnings.is_empty() {
        lines.push("\nInput warnings".to_string());
        for warning in &report.warnings {
            lines.push(format!("- {}", warning.summary()));
        }
    }

    lines.join("\n")
}
