//! Extract command - read metrics from a single OCR text file.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use clap::Args;
use console::style;
use tracing::{debug, info};

use inscan_core::models::metrics::parse_override;
use inscan_core::{
    BodyMetrics, CollectingObserver, ExtractionObserver, InBodyExtractor, StatRecord,
    TracingObserver,
};

use super::config::load_config;
use super::output::{format_metrics, format_record, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// OCR text file, or "-" for stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// User-entered value that takes precedence over the scan (metric=value)
    #[arg(long = "set", value_name = "METRIC=VALUE")]
    overrides: Vec<String>,

    /// Date of the scan (YYYY-MM-DD); produces a dated record
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Produce a dated record even without overrides
    #[arg(long)]
    record: bool,

    /// Print the extraction diagnostics to stderr
    #[arg(long)]
    trace: bool,

    /// Show processing time
    #[arg(long)]
    show_time: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let user = parse_overrides(&args.overrides)?;
    let text = read_input(&args.input)?;

    let collector = Arc::new(CollectingObserver::new());
    let observer: Arc<dyn ExtractionObserver> = if args.trace {
        collector.clone()
    } else {
        Arc::new(TracingObserver)
    };

    let extractor = InBodyExtractor::new()
        .with_config(config.extraction.clone())
        .with_observer(observer);

    let report = extractor.extract_report(&text);
    info!(
        "Extracted {} metrics from {}",
        report.metrics.len(),
        args.input
    );

    if args.trace {
        for event in collector.take() {
            eprintln!("{} {}", style("·").dim(), event);
        }
    }

    let output = if args.record || args.date.is_some() || !user.is_empty() {
        let date = args.date.unwrap_or_else(|| Local::now().date_naive());
        let record = StatRecord::merge(date, &user, &report.metrics);

        if !record.has_data() {
            anyhow::bail!("No metrics extracted or entered for {}", date);
        }
        eprintln!("{} {}", style("ℹ").blue(), record.summary());

        format_record(&record, args.format, &config.output)?
    } else {
        format_metrics(&report.metrics, args.format, &config.output)?
    };

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    if args.show_time {
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            report.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    info!("Processing file: {}", path.display());
    Ok(fs::read_to_string(&path)?)
}

/// Collect `--set` values; placeholders such as `N/A` are skipped.
fn parse_overrides(raw: &[String]) -> anyhow::Result<BodyMetrics> {
    let mut user = BodyMetrics::new();

    for entry in raw {
        let (metric, value) =
            parse_override(entry).map_err(|e| anyhow::anyhow!("Invalid --set {}: {}", entry, e))?;
        if let Some(value) = value {
            user.insert(metric, value);
        }
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inscan_core::MetricName;

    #[test]
    fn test_parse_overrides() {
        let user = parse_overrides(&[
            "weight=190.5".to_string(),
            "bmr=1,850".to_string(),
            "smm=N/A".to_string(),
        ])
        .unwrap();

        assert_eq!(user.get(MetricName::Weight), Some(190.5));
        assert_eq!(user.get(MetricName::Bmr), Some(1850.0));
        assert!(!user.contains(MetricName::Smm));
    }

    #[test]
    fn test_parse_overrides_rejects_unknown_metric() {
        let err = parse_overrides(&["height=180".to_string()]).unwrap_err();
        assert!(err.to_string().contains("unknown metric: height"));
    }
}
