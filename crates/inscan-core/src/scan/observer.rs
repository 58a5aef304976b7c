//! Extraction diagnostics.
//!
//! The extractor reports what it tried through an [`ExtractionObserver`]
//! supplied by the caller. Observers never influence the result.

use std::sync::Mutex;

use tracing::{debug, info, trace, warn};

use crate::models::metrics::{MetricName, PlausibilityRange};

use super::rules::Stage;

/// Something that happened while extracting metrics.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionEvent {
    /// Every number token in the text.
    NumbersFound { numbers: Vec<String> },
    /// A number with the words around it.
    NumberContext {
        before: String,
        number: String,
        after: String,
    },
    /// A value was accepted for a metric.
    Accepted {
        metric: MetricName,
        stage: Stage,
        value: f64,
        detail: Option<String>,
    },
    /// A candidate fell outside the metric's plausible range.
    OutOfRange {
        metric: MetricName,
        stage: Stage,
        value: f64,
        range: PlausibilityRange,
    },
    /// A pattern matched but the capture is not a number.
    MalformedCapture {
        metric: MetricName,
        stage: Stage,
        capture: String,
    },
    /// A known misread was corrected.
    ArtifactApplied {
        metric: MetricName,
        value: f64,
        note: &'static str,
    },
    /// Body fat percentage was not found; a listed number in its range.
    BodyFatCandidate {
        before: String,
        number: String,
        after: String,
    },
    /// A metric in the final result.
    Extracted { metric: MetricName, value: f64 },
    /// Extraction finished.
    Finished { found: usize },
}

/// Receives extraction events.
pub trait ExtractionObserver: Send + Sync {
    fn observe(&self, event: &ExtractionEvent);
}

impl<F> ExtractionObserver for F
where
    F: Fn(&ExtractionEvent) + Send + Sync,
{
    fn observe(&self, event: &ExtractionEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExtractionObserver for NoopObserver {
    fn observe(&self, _event: &ExtractionEvent) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ExtractionObserver for TracingObserver {
    fn observe(&self, event: &ExtractionEvent) {
        match event {
            ExtractionEvent::NumbersFound { numbers } => {
                debug!("All numbers found: {:?}", numbers);
            }
            ExtractionEvent::NumberContext {
                before,
                number,
                after,
            } => {
                trace!("'{}' -> {} <- '{}'", before.trim(), number, after.trim());
            }
            ExtractionEvent::Accepted {
                metric,
                stage,
                value,
                detail,
            } => {
                info!("Found {}: {} ({})", metric, value, stage);
                if let Some(detail) = detail {
                    debug!("  Context: {}", detail);
                }
            }
            ExtractionEvent::OutOfRange {
                metric,
                stage,
                value,
                range,
            } => {
                debug!(
                    "Skipping implausible {} from {}: {} not in {}",
                    metric, stage, value, range
                );
            }
            ExtractionEvent::MalformedCapture {
                metric,
                stage,
                capture,
            } => {
                warn!("Could not convert {} value from {}: {}", metric, stage, capture);
            }
            ExtractionEvent::ArtifactApplied {
                metric,
                value,
                note,
            } => {
                info!("Found {} from OCR artifact: {} ({})", metric, value, note);
            }
            ExtractionEvent::BodyFatCandidate {
                before,
                number,
                after,
            } => {
                debug!(
                    "Unused body fat candidate: '{}' -> {} <- '{}'",
                    before.trim(),
                    number,
                    after.trim()
                );
            }
            ExtractionEvent::Extracted { metric, value } => {
                info!("  {}: {}", metric, value);
            }
            ExtractionEvent::Finished { found } => {
                info!("Extracted {} metrics", found);
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<ExtractionEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events so far.
    pub fn events(&self) -> Vec<ExtractionEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Take the events, leaving the collector empty.
    pub fn take(&self) -> Vec<ExtractionEvent> {
        std::mem::take(
            &mut *self
                .events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl ExtractionObserver for CollectingObserver {
    fn observe(&self, event: &ExtractionEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

impl std::fmt::Display for ExtractionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionEvent::NumbersFound { numbers } => {
                write!(f, "numbers: {}", numbers.join(", "))
            }
            ExtractionEvent::NumberContext {
                before,
                number,
                after,
            } => write!(f, "context: '{}' -> {} <- '{}'", before.trim(), number, after.trim()),
            ExtractionEvent::Accepted {
                metric,
                stage,
                value,
                detail,
            } => {
                write!(f, "found {} = {} ({})", metric, value, stage)?;
                if let Some(detail) = detail {
                    write!(f, " {}", detail)?;
                }
                Ok(())
            }
            ExtractionEvent::OutOfRange {
                metric,
                stage,
                value,
                range,
            } => write!(f, "skipped {} = {} ({}): outside {}", metric, value, stage, range),
            ExtractionEvent::MalformedCapture {
                metric,
                stage,
                capture,
            } => write!(f, "unreadable {} capture '{}' ({})", metric, capture, stage),
            ExtractionEvent::ArtifactApplied {
                metric,
                value,
                note,
            } => write!(f, "corrected {} = {} ({})", metric, value, note),
            ExtractionEvent::BodyFatCandidate {
                before,
                number,
                after,
            } => write!(
                f,
                "body fat candidate: '{}' -> {} <- '{}'",
                before.trim(),
                number,
                after.trim()
            ),
            ExtractionEvent::Extracted { metric, value } => write!(f, "{}: {}", metric, value),
            ExtractionEvent::Finished { found } => write!(f, "finished: {} metrics", found),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_observer() {
        let count = AtomicUsize::new(0);
        let observer = |_: &ExtractionEvent| {
            count.fetch_add(1, Ordering::SeqCst);
        };

        observer.observe(&ExtractionEvent::Finished { found: 0 });
        observer.observe(&ExtractionEvent::Finished { found: 1 });

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_collecting_observer_take_drains() {
        let observer = CollectingObserver::new();
        observer.observe(&ExtractionEvent::Finished { found: 3 });

        assert_eq!(observer.take().len(), 1);
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_event_display() {
        let event = ExtractionEvent::OutOfRange {
            metric: MetricName::Weight,
            stage: Stage::Primary,
            value: 85.0,
            range: MetricName::Weight.plausible_range(),
        };
        assert_eq!(
            event.to_string(),
            "skipped weight = 85 (label pattern): outside [100, 500]"
        );
    }
}
