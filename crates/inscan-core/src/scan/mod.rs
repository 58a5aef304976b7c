//! Body-composition metric extraction from InBody OCR text.

mod extractor;
pub mod observer;
pub mod rules;

pub use extractor::{ExtractionReport, InBodyExtractor};
pub use observer::{
    CollectingObserver, ExtractionEvent, ExtractionObserver, NoopObserver, TracingObserver,
};
pub use rules::Stage;

use crate::models::metrics::BodyMetrics;

/// Trait for metric extractors.
pub trait MetricExtractor {
    /// Extract every metric that can be located and passes its plausibility
    /// check. Never fails; unreadable scans yield an empty mapping.
    fn extract(&self, text: &str) -> BodyMetrics;
}

/// Extract metrics with the default extractor and no diagnostics.
pub fn extract_metrics(text: &str) -> BodyMetrics {
    InBodyExtractor::new().extract(text)
}
