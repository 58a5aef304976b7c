//! Rule tables and the steps that evaluate them.
//!
//! Every metric owns a ladder of steps tried in order; the first step that
//! yields a plausible value settles the metric.

pub mod artifacts;
pub mod context;
pub mod ladder;
pub mod patterns;

use std::fmt;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::models::config::ExtractionConfig;
use crate::models::metrics::{MetricName, PlausibilityRange};

use super::observer::{ExtractionEvent, ExtractionObserver};
use artifacts::Artifact;
use context::NumberContext;

pub use ladder::{ladder_for, MetricLadder, LADDERS};

/// Which kind of step produced (or rejected) a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Label next to a number.
    Primary,
    /// Known OCR misread.
    Artifact,
    /// Number with a percent sign next to a body-fat label.
    PercentSign,
    /// First number after the PBF label.
    PbfSection,
    /// PBF neighbour with a dropped decimal point.
    PbfTenths,
    /// PBF inside the Obesity Analysis block.
    ObesitySection,
    /// Garbled PBF caption.
    GarbledCaption,
    /// `dd.d` token in a body-fat context window.
    DecimalContext,
    /// Listed number with body-fat words around it.
    NumberContext,
    /// Latest entry of the printed weight trend.
    WeightHistory,
    /// Partial skeletal muscle mass label.
    PartialLabel,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Primary => "label pattern",
            Stage::Artifact => "known OCR artifact",
            Stage::PercentSign => "percent sign near body-fat label",
            Stage::PbfSection => "PBF section",
            Stage::PbfTenths => "PBF with dropped decimal point",
            Stage::ObesitySection => "Obesity Analysis section",
            Stage::GarbledCaption => "garbled PBF caption",
            Stage::DecimalContext => "decimal in body-fat context",
            Stage::NumberContext => "number in body-fat context",
            Stage::WeightHistory => "weight history",
            Stage::PartialLabel => "partial SMM label",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a match becomes a candidate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// The first group, as printed.
    AsIs,
    /// The first group, divided by ten when above 100 (283 means 28.3).
    TenthsAbove100,
    /// The last group of a comma-separated run.
    LatestInRun,
}

impl Reading {
    /// Read a candidate from `caps`; the offending text on failure.
    pub fn read(self, caps: &Captures<'_>) -> Result<f64, String> {
        match self {
            Reading::AsIs => first_group(caps).and_then(parse_number),
            Reading::TenthsAbove100 => first_group(caps)
                .and_then(parse_number)
                .map(|v| if v > 100.0 { v / 10.0 } else { v }),
            Reading::LatestInRun => {
                let mut latest = None;
                for group in caps.iter().skip(1).flatten() {
                    latest = Some(parse_number(group.as_str())?);
                }
                latest.ok_or_else(|| caps[0].to_string())
            }
        }
    }
}

fn first_group<'t>(caps: &Captures<'t>) -> Result<&'t str, String> {
    caps.get(1)
        .map(|m| m.as_str())
        .ok_or_else(|| caps[0].to_string())
}

fn parse_number(raw: &str) -> Result<f64, String> {
    raw.parse::<f64>().map_err(|_| raw.to_string())
}

/// One pattern and the range its value must fall in.
#[derive(Debug)]
pub struct ExtractionRule {
    pub pattern: Regex,
    pub range: PlausibilityRange,
    pub reading: Reading,
}

impl ExtractionRule {
    pub fn new(pattern: Regex, range: PlausibilityRange, reading: Reading) -> Self {
        Self {
            pattern,
            range,
            reading,
        }
    }
}

/// Text prepared once per extraction and shared by every ladder.
#[derive(Debug)]
pub struct ScanInput<'a> {
    pub text: &'a str,
    pub numbers: Vec<&'a str>,
    pub contexts: Vec<NumberContext<'a>>,
}

impl<'a> ScanInput<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            numbers: context::numbers(text),
            contexts: context::number_contexts(text),
        }
    }
}

/// One rung of a metric's ladder.
#[derive(Debug)]
pub enum Step {
    /// Ordered patterns; the first match of each is considered.
    ///
    /// With `first_match_only`, the first pattern that matches settles the
    /// step even when its value is rejected.
    Patterns {
        stage: Stage,
        rules: Vec<ExtractionRule>,
        first_match_only: bool,
    },
    /// A known misread, emitted without range checking.
    Artifact(&'static Artifact),
    /// `dd.d` tokens whose surrounding window reads as body fat.
    DecimalContext,
    /// Listed numbers whose neighbouring words read as body fat.
    NumberContext,
}

impl Step {
    pub fn stage(&self) -> Stage {
        match self {
            Step::Patterns { stage, .. } => *stage,
            Step::Artifact(_) => Stage::Artifact,
            Step::DecimalContext => Stage::DecimalContext,
            Step::NumberContext => Stage::NumberContext,
        }
    }

    /// Run this step for `metric`, returning an accepted value.
    pub fn evaluate(
        &self,
        metric: MetricName,
        input: &ScanInput<'_>,
        config: &ExtractionConfig,
        observer: &dyn ExtractionObserver,
    ) -> Option<f64> {
        let stage = self.stage();

        match self {
            Step::Patterns {
                rules,
                first_match_only,
                ..
            } => {
                for rule in rules {
                    let Some(caps) = rule.pattern.captures(input.text) else {
                        continue;
                    };

                    let value = match rule.reading.read(&caps) {
                        Ok(value) => value,
                        Err(capture) => {
                            observer.observe(&ExtractionEvent::MalformedCapture {
                                metric,
                                stage,
                                capture,
                            });
                            continue;
                        }
                    };

                    if rule.range.contains(value) {
                        observer.observe(&ExtractionEvent::Accepted {
                            metric,
                            stage,
                            value,
                            detail: None,
                        });
                        return Some(value);
                    }

                    observer.observe(&ExtractionEvent::OutOfRange {
                        metric,
                        stage,
                        value,
                        range: rule.range,
                    });
                    if *first_match_only {
                        return None;
                    }
                }
                None
            }
            Step::Artifact(artifact) => {
                let value = artifact.detect(input.text)?;
                observer.observe(&ExtractionEvent::ArtifactApplied {
                    metric,
                    value,
                    note: artifact.note,
                });
                Some(value)
            }
            Step::DecimalContext | Step::NumberContext => {
                let range = metric.plausible_range();
                let found = match self {
                    Step::DecimalContext => context::decimal_in_context(
                        input.text,
                        config.context_window,
                        config.decimal_context_range,
                    ),
                    _ => context::number_in_context(&input.contexts, range),
                }?;

                if !range.contains(found.value) {
                    observer.observe(&ExtractionEvent::OutOfRange {
                        metric,
                        stage,
                        value: found.value,
                        range,
                    });
                    return None;
                }

                observer.observe(&ExtractionEvent::Accepted {
                    metric,
                    stage,
                    value: found.value,
                    detail: Some(found.context),
                });
                Some(found.value)
            }
        }
    }

    /// Human-readable lines describing the step.
    pub fn describe(&self, metric: MetricName, config: &ExtractionConfig) -> Vec<String> {
        match self {
            Step::Patterns { rules, .. } => rules
                .iter()
                .map(|rule| {
                    let reading = match rule.reading {
                        Reading::AsIs => "",
                        Reading::TenthsAbove100 => " (tenths above 100)",
                        Reading::LatestInRun => " (latest in run)",
                    };
                    format!("{}  {}{}", rule.pattern.as_str(), rule.range, reading)
                })
                .collect(),
            Step::Artifact(artifact) => vec![format!(
                "{}  -> {} ({})",
                artifact.pattern.as_str(),
                artifact.value,
                artifact.note
            )],
            Step::DecimalContext => vec![format!(
                "{}  {} within {} chars of body-fat terms, no BMI terms",
                patterns::DECIMAL_TOKEN.as_str(),
                config.decimal_context_range,
                config.context_window
            )],
            Step::NumberContext => vec![format!(
                "{}  {} with body-fat words, no BMI words",
                patterns::NUMBER_CONTEXT.as_str(),
                metric.plausible_range()
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::observer::CollectingObserver;
    use pretty_assertions::assert_eq;

    fn rule(pattern: &str, reading: Reading) -> ExtractionRule {
        ExtractionRule::new(
            Regex::new(pattern).unwrap(),
            PlausibilityRange::new(1.0, 50.0),
            reading,
        )
    }

    #[test]
    fn test_tenths_reading() {
        let re = Regex::new(r"PBF[^0-9]*(\d{2,3})").unwrap();
        let caps = re.captures("PBF 283").unwrap();
        assert_eq!(Reading::TenthsAbove100.read(&caps), Ok(28.3));

        let caps = re.captures("PBF 28").unwrap();
        assert_eq!(Reading::TenthsAbove100.read(&caps), Ok(28.0));
    }

    #[test]
    fn test_latest_in_run_reading() {
        let re = Regex::new(r"(\d{3}\.\d)\s*,\s*(\d{3}\.\d)\s*,\s*(\d{3}\.\d)").unwrap();
        let caps = re.captures("209.9, 212.1 ,214.7").unwrap();
        assert_eq!(Reading::LatestInRun.read(&caps), Ok(214.7));
    }

    #[test]
    fn test_out_of_range_candidate_falls_through_to_next_rule() {
        let step = Step::Patterns {
            stage: Stage::PbfSection,
            rules: vec![
                rule(r"PBF[^0-9]*(\d+)", Reading::AsIs),
                rule(r"PBF[^0-9]*(\d+)", Reading::TenthsAbove100),
            ],
            first_match_only: false,
        };
        let input = ScanInput::new("PBF 283");
        let observer = CollectingObserver::new();

        let value = step.evaluate(
            MetricName::BodyFatPercentage,
            &input,
            &ExtractionConfig::default(),
            &observer,
        );

        assert_eq!(value, Some(28.3));
        let events = observer.events();
        assert!(matches!(events[0], ExtractionEvent::OutOfRange { value, .. } if value == 283.0));
        assert!(matches!(events[1], ExtractionEvent::Accepted { value, .. } if value == 28.3));
    }

    #[test]
    fn test_unicode_digits_are_malformed_captures() {
        let step = Step::Patterns {
            stage: Stage::Primary,
            rules: vec![rule(r"PBF[^0-9]*(\d+)", Reading::AsIs)],
            first_match_only: false,
        };
        // `[^0-9]` only excludes ASCII digits, so it swallows the first one.
        let input = ScanInput::new("PBF ٢٨");
        let observer = CollectingObserver::new();

        let value = step.evaluate(
            MetricName::BodyFatPercentage,
            &input,
            &ExtractionConfig::default(),
            &observer,
        );

        assert_eq!(value, None);
        assert_eq!(
            observer.events(),
            vec![ExtractionEvent::MalformedCapture {
                metric: MetricName::BodyFatPercentage,
                stage: Stage::Primary,
                capture: "٨".to_string(),
            }]
        );
    }

    #[test]
    fn test_first_match_only_stops_after_rejection() {
        let step = Step::Patterns {
            stage: Stage::WeightHistory,
            rules: vec![
                rule(r"PBF[^0-9]*(\d+)", Reading::AsIs),
                rule(r"PBF[^0-9]*(\d+)", Reading::TenthsAbove100),
            ],
            first_match_only: true,
        };
        let input = ScanInput::new("PBF 283");
        let observer = CollectingObserver::new();

        let value = step.evaluate(
            MetricName::BodyFatPercentage,
            &input,
            &ExtractionConfig::default(),
            &observer,
        );

        assert_eq!(value, None);
        assert_eq!(observer.events().len(), 1);
    }
}
