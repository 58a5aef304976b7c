//! Rendering of metrics and records in the supported output formats.

use inscan_core::models::config::OutputConfig;
use inscan_core::{BodyMetrics, MetricName, MetricSource, StatRecord};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used when writing to a directory.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Metrics to list: the found ones, or all of them when missing metrics
/// are shown.
fn rows(metrics: &BodyMetrics, config: &OutputConfig) -> Vec<(MetricName, Option<f64>)> {
    MetricName::ALL
        .iter()
        .map(|m| (*m, metrics.get(*m)))
        .filter(|(_, value)| config.show_missing || value.is_some())
        .collect()
}

fn to_json<T: serde::Serialize>(value: &T, config: &OutputConfig) -> anyhow::Result<String> {
    if config.pretty_json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

fn source_name(source: MetricSource) -> &'static str {
    match source {
        MetricSource::User => "user",
        MetricSource::Ocr => "ocr",
    }
}

pub fn format_metrics(
    metrics: &BodyMetrics,
    format: OutputFormat,
    config: &OutputConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => to_json(metrics, config),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["metric", "value", "unit"])?;

            for (metric, value) in rows(metrics, config) {
                wtr.write_record([
                    metric.as_str(),
                    &value.map(|v| v.to_string()).unwrap_or_default(),
                    metric.unit(),
                ])?;
            }

            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("Body composition:\n");

            for (metric, value) in rows(metrics, config) {
                match value {
                    Some(v) => output.push_str(&format!(
                        "  {:<22} {} {}\n",
                        metric.label(),
                        v,
                        metric.unit()
                    )),
                    None => output.push_str(&format!("  {:<22} -\n", metric.label())),
                }
            }

            output.push_str(&format!(
                "\nFound {} of {} metrics\n",
                metrics.len(),
                MetricName::ALL.len()
            ));
            Ok(output)
        }
    }
}

pub fn format_record(
    record: &StatRecord,
    format: OutputFormat,
    config: &OutputConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => to_json(record, config),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["date", "metric", "value", "unit", "source"])?;

            let date = record.date.to_string();
            for (metric, value) in rows(&record.metrics, config) {
                let source = record
                    .sources
                    .get(&metric)
                    .map(|s| source_name(*s))
                    .unwrap_or_default();
                wtr.write_record([
                    date.as_str(),
                    metric.as_str(),
                    &value.map(|v| v.to_string()).unwrap_or_default(),
                    metric.unit(),
                    source,
                ])?;
            }

            Ok(String::from_utf8(wtr.into_inner()?)?)
        }
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str(&format!("Date: {}\n\n", record.date));

            for (metric, value) in rows(&record.metrics, config) {
                let Some(v) = value else {
                    output.push_str(&format!("  {:<22} -\n", metric.label()));
                    continue;
                };
                let line = format!("  {:<22} {} {}", metric.label(), v, metric.unit());
                match record.sources.get(&metric) {
                    Some(MetricSource::User) => {
                        output.push_str(&format!("{} (entered)\n", line));
                    }
                    _ => {
                        output.push_str(&line);
                        output.push('\n');
                    }
                }
            }

            output.push_str(&format!("\n{}\n", record.summary()));
            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn metrics() -> BodyMetrics {
        [(MetricName::Weight, 185.5), (MetricName::Bmr, 1791.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_csv_lists_found_metrics() {
        let csv = format_metrics(&metrics(), OutputFormat::Csv, &OutputConfig::default()).unwrap();
        assert_eq!(csv, "metric,value,unit\nweight,185.5,lbs\nbmr,1791,kcal\n");
    }

    #[test]
    fn test_show_missing_lists_every_metric() {
        let config = OutputConfig {
            show_missing: true,
            ..OutputConfig::default()
        };
        let csv = format_metrics(&metrics(), OutputFormat::Csv, &config).unwrap();
        assert_eq!(csv.lines().count(), MetricName::ALL.len() + 1);
        assert!(csv.contains("trunk_lean_mass,,lbs"));
    }

    #[test]
    fn test_compact_json() {
        let config = OutputConfig {
            pretty_json: false,
            ..OutputConfig::default()
        };
        let json = format_metrics(&metrics(), OutputFormat::Json, &config).unwrap();
        assert_eq!(json, r#"{"weight":185.5,"bmr":1791.0}"#);
    }

    #[test]
    fn test_record_text_marks_entered_values() {
        let user: BodyMetrics = [(MetricName::Weight, 190.0)].into_iter().collect();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let record = StatRecord::merge(date, &user, &metrics());

        let text = format_record(&record, OutputFormat::Text, &OutputConfig::default()).unwrap();
        assert!(text.starts_with("Date: 2024-03-01"));
        assert!(text.contains("190 lbs (entered)"));
        assert!(text.contains("Recorded 2 metrics for 2024-03-01 (OCR extracted 2 metrics)"));
    }
}
