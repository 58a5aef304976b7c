//! InBody metric extractor.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::models::config::ExtractionConfig;
use crate::models::metrics::{BodyMetrics, MetricName};

use super::observer::{ExtractionEvent, ExtractionObserver, NoopObserver};
use super::rules::{ScanInput, LADDERS};
use super::MetricExtractor;

/// Result of a timed extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Metrics found.
    pub metrics: BodyMetrics,
    /// Metrics not found.
    pub missing: Vec<MetricName>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Extracts body-composition metrics from InBody OCR text.
#[derive(Clone)]
pub struct InBodyExtractor {
    config: ExtractionConfig,
    observer: Arc<dyn ExtractionObserver>,
}

impl InBodyExtractor {
    /// Create an extractor with default settings and no diagnostics.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Set the extraction configuration.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the observer that receives diagnostics.
    pub fn with_observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract, reporting to `observer` instead of the configured one.
    pub fn extract_with(&self, text: &str, observer: &dyn ExtractionObserver) -> BodyMetrics {
        let input = ScanInput::new(text);

        if self.config.report_number_listing {
            observer.observe(&ExtractionEvent::NumbersFound {
                numbers: input.numbers.iter().map(|n| n.to_string()).collect(),
            });
            for ctx in &input.contexts {
                if ctx.number.parse::<f64>().is_ok_and(|v| v > 1.0) {
                    observer.observe(&ExtractionEvent::NumberContext {
                        before: ctx.before.to_string(),
                        number: ctx.number.to_string(),
                        after: ctx.after.to_string(),
                    });
                }
            }
        }

        let mut metrics = BodyMetrics::new();
        for ladder in LADDERS.iter() {
            let found = ladder
                .steps
                .iter()
                .find_map(|step| step.evaluate(ladder.metric, &input, &self.config, observer));

            if let Some(value) = found {
                metrics.insert(ladder.metric, value);
            }
        }

        if !metrics.contains(MetricName::BodyFatPercentage) {
            let range = MetricName::BodyFatPercentage.plausible_range();
            for ctx in &input.contexts {
                if ctx.number.parse::<f64>().is_ok_and(|v| range.contains(v)) {
                    observer.observe(&ExtractionEvent::BodyFatCandidate {
                        before: ctx.before.to_string(),
                        number: ctx.number.to_string(),
                        after: ctx.after.to_string(),
                    });
                }
            }
        }

        for (metric, value) in metrics.iter() {
            observer.observe(&ExtractionEvent::Extracted { metric, value });
        }
        observer.observe(&ExtractionEvent::Finished {
            found: metrics.len(),
        });

        metrics
    }

    /// Extract and time the run.
    pub fn extract_report(&self, text: &str) -> ExtractionReport {
        let start = Instant::now();
        let metrics = self.extract(text);

        ExtractionReport {
            missing: metrics.missing(),
            metrics,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Default for InBodyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricExtractor for InBodyExtractor {
    fn extract(&self, text: &str) -> BodyMetrics {
        self.extract_with(text, self.observer.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::observer::CollectingObserver;
    use crate::scan::rules::Stage;
    use pretty_assertions::assert_eq;

    /// Text shaped like Tesseract output of a full InBody sheet.
    const SAMPLE_SCAN: &str = "\
InBody
BodyCompositionAnalysis
Weight 185.5 lbs
LeanBodyMass 141.27 lbs
BodyFatMass 44.2 lbs
MuscleFatAnalysis
SkeletalMuscleMass 82.4
ObesityAnalysis
BMI 26.6
PBF 23.8 %
SegmentalLeanAnalysis
LeftArm 10.76 RightArm 10.96
Trunk 64.7 lbs
LeftLeg 21.35 RightLeg 21.60
BasalMetabolicRate 1791 kcal
";

    fn extract(text: &str) -> BodyMetrics {
        InBodyExtractor::new().extract(text)
    }

    #[test]
    fn test_full_sheet() {
        let metrics = extract(SAMPLE_SCAN);

        assert_eq!(metrics.get(MetricName::Weight), Some(185.5));
        assert_eq!(metrics.get(MetricName::LeanBodyMass), Some(141.27));
        assert_eq!(metrics.get(MetricName::BodyFatMass), Some(44.2));
        assert_eq!(metrics.get(MetricName::Smm), Some(82.4));
        assert_eq!(metrics.get(MetricName::BodyFatPercentage), Some(23.8));
        assert_eq!(metrics.get(MetricName::LeftArmLeanMass), Some(10.76));
        assert_eq!(metrics.get(MetricName::RightArmLeanMass), Some(10.96));
        assert_eq!(metrics.get(MetricName::LeftLegLeanMass), Some(21.35));
        assert_eq!(metrics.get(MetricName::RightLegLeanMass), Some(21.6));
        assert_eq!(metrics.get(MetricName::Bmr), Some(1791.0));
    }

    #[test]
    fn test_trunk_needs_three_digit_reading() {
        // 64.7 does not fit the ddd.d layout and no artifact applies.
        assert_eq!(extract(SAMPLE_SCAN).get(MetricName::TrunkLeanMass), None);
        assert_eq!(
            extract("Trunk 126.6 lbs").get(MetricName::TrunkLeanMass),
            Some(126.6)
        );
    }

    #[test]
    fn test_clean_weight_label() {
        let metrics = extract("Weight 185.5");
        assert_eq!(metrics.get(MetricName::Weight), Some(185.5));
    }

    #[test]
    fn test_empty_and_non_numeric_input() {
        assert!(extract("").is_empty());
        assert!(extract("InBody Body Composition Analysis\nno values here").is_empty());
        assert!(extract("\n\n%%%...,,,").is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = InBodyExtractor::new();
        assert_eq!(extractor.extract(SAMPLE_SCAN), extractor.extract(SAMPLE_SCAN));
    }

    #[test]
    fn test_weight_outside_range_falls_through() {
        // 085.5 is rejected by the range check, the trend supplies the value.
        let metrics = extract("Weight 085.5\n209.9,212.1,214.7,214.4");
        assert_eq!(metrics.get(MetricName::Weight), Some(214.4));
    }

    #[test]
    fn test_weight_history_is_range_checked() {
        let metrics = extract("Trend 609.9,612.1");
        assert_eq!(metrics.get(MetricName::Weight), None);
    }

    #[test]
    fn test_bmr_outside_range_is_dropped() {
        assert_eq!(extract("BMR 0950").get(MetricName::Bmr), None);
        assert_eq!(extract("BMR 2108").get(MetricName::Bmr), Some(2108.0));
    }

    #[test]
    fn test_observer_sees_events_in_order() {
        let observer = Arc::new(CollectingObserver::new());
        let extractor = InBodyExtractor::new().with_observer(observer.clone());

        extractor.extract("Weight 185.5");

        let events = observer.events();
        assert!(matches!(events.first(), Some(ExtractionEvent::NumbersFound { .. })));
        assert!(events.contains(&ExtractionEvent::Accepted {
            metric: MetricName::Weight,
            stage: Stage::Primary,
            value: 185.5,
            detail: None,
        }));
        assert_eq!(events.last(), Some(&ExtractionEvent::Finished { found: 1 }));
    }

    #[test]
    fn test_final_metrics_are_reported() {
        let observer = CollectingObserver::new();
        InBodyExtractor::new().extract_with("Weight 185.5\nBMR 1791", &observer);

        let extracted: Vec<_> = observer
            .events()
            .into_iter()
            .filter(|e| matches!(e, ExtractionEvent::Extracted { .. }))
            .collect();
        assert_eq!(
            extracted,
            vec![
                ExtractionEvent::Extracted {
                    metric: MetricName::Weight,
                    value: 185.5,
                },
                ExtractionEvent::Extracted {
                    metric: MetricName::Bmr,
                    value: 1791.0,
                },
            ]
        );
    }

    #[test]
    fn test_unused_body_fat_candidates_are_listed() {
        let observer = CollectingObserver::new();
        let metrics = InBodyExtractor::new().extract_with("BMI 24; Weight 185.5", &observer);

        assert_eq!(metrics.get(MetricName::BodyFatPercentage), None);
        let candidates: Vec<_> = observer
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ExtractionEvent::BodyFatCandidate { number, .. } => Some(number),
                _ => None,
            })
            .collect();
        assert_eq!(candidates, vec!["24".to_string()]);
    }

    #[test]
    fn test_no_candidates_once_body_fat_is_found() {
        let observer = CollectingObserver::new();
        InBodyExtractor::new().extract_with("PBF 23.8%", &observer);

        assert!(!observer
            .events()
            .iter()
            .any(|e| matches!(e, ExtractionEvent::BodyFatCandidate { .. })));
    }

    #[test]
    fn test_number_listing_can_be_disabled() {
        let observer = CollectingObserver::new();
        let config = ExtractionConfig {
            report_number_listing: false,
            ..ExtractionConfig::default()
        };
        let extractor = InBodyExtractor::new().with_config(config);

        extractor.extract_with("Weight 185.5", &observer);

        assert!(!observer
            .events()
            .iter()
            .any(|e| matches!(e, ExtractionEvent::NumbersFound { .. })));
    }

    #[test]
    fn test_report_lists_missing_metrics() {
        let report = InBodyExtractor::new().extract_report("Weight 185.5");
        assert_eq!(report.metrics.len(), 1);
        assert_eq!(report.missing.len(), MetricName::ALL.len() - 1);
        assert!(!report.missing.contains(&MetricName::Weight));
    }

    #[test]
    fn test_extractor_is_shareable_across_threads() {
        let extractor = InBodyExtractor::new();
        let expected = extractor.extract(SAMPLE_SCAN);

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| extractor.extract(SAMPLE_SCAN)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
