//! Core library for InBody scan processing.
//!
//! This crate provides:
//! - Body-composition metric extraction from raw OCR text
//! - Plausibility validation and known OCR-artifact correction
//! - Pluggable extraction diagnostics
//! - Stat record merging (user input over OCR values)

pub mod error;
pub mod models;
pub mod scan;

pub use error::{MetricError, Result, ScanError};
pub use models::config::ScanConfig;
pub use models::metrics::{BodyMetrics, MetricName, PlausibilityRange};
pub use models::record::{MetricSource, StatRecord};
pub use scan::{
    extract_metrics, CollectingObserver, ExtractionEvent, ExtractionObserver, ExtractionReport,
    InBodyExtractor, MetricExtractor, NoopObserver, Stage, TracingObserver,
};
