//! Stat records built from OCR metrics and user-entered values.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::metrics::{BodyMetrics, MetricName};

/// Where a recorded value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    /// Entered by the user.
    User,
    /// Extracted from the scan.
    Ocr,
}

/// A dated set of body-composition values ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    /// Date the scan was taken.
    pub date: NaiveDate,

    /// Merged values.
    pub metrics: BodyMetrics,

    /// Origin of each merged value.
    pub sources: BTreeMap<MetricName, MetricSource>,

    /// Everything the extractor found, including values the user overrode.
    #[serde(skip_serializing_if = "BodyMetrics::is_empty", default)]
    pub ocr_metrics: BodyMetrics,
}

impl StatRecord {
    /// Merge user input with OCR output.
    ///
    /// A user value wins when it is present and non-zero; a zero entry is
    /// treated as left blank.
    pub fn merge(date: NaiveDate, user: &BodyMetrics, ocr: &BodyMetrics) -> Self {
        let mut metrics = BodyMetrics::new();
        let mut sources = BTreeMap::new();

        for metric in MetricName::ALL {
            match (user.get(metric), ocr.get(metric)) {
                (Some(value), _) if value != 0.0 => {
                    metrics.insert(metric, value);
                    sources.insert(metric, MetricSource::User);
                }
                (_, Some(value)) => {
                    metrics.insert(metric, value);
                    sources.insert(metric, MetricSource::Ocr);
                }
                _ => {}
            }
        }

        Self {
            date,
            metrics,
            sources,
            ocr_metrics: ocr.clone(),
        }
    }

    /// Whether the record carries at least one non-zero value.
    pub fn has_data(&self) -> bool {
        self.metrics.iter().any(|(_, v)| v != 0.0)
    }

    /// Short status line for the caller to show.
    pub fn summary(&self) -> String {
        let mut message = format!("Recorded {} metrics for {}", self.metrics.len(), self.date);
        if !self.ocr_metrics.is_empty() {
            message.push_str(&format!(
                " (OCR extracted {} metrics)",
                self.ocr_metrics.len()
            ));
        }
        message
    }
}
