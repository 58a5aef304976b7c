//! Body-composition metric names, plausibility ranges and the result mapping.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MetricError;

/// A metric printed on an InBody result sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    /// Body weight (lbs).
    Weight,
    /// Percent body fat (PBF).
    BodyFatPercentage,
    /// Body fat mass (lbs).
    BodyFatMass,
    /// Lean body mass (lbs).
    LeanBodyMass,
    /// Skeletal muscle mass (lbs).
    Smm,
    /// Basal metabolic rate (kcal).
    Bmr,
    /// Segmental lean mass, left arm (lbs).
    LeftArmLeanMass,
    /// Segmental lean mass, right arm (lbs).
    RightArmLeanMass,
    /// Segmental lean mass, left leg (lbs).
    LeftLegLeanMass,
    /// Segmental lean mass, right leg (lbs).
    RightLegLeanMass,
    /// Segmental lean mass, trunk (lbs).
    TrunkLeanMass,
}

impl MetricName {
    /// Every metric, in report order.
    pub const ALL: [MetricName; 11] = [
        MetricName::Weight,
        MetricName::BodyFatPercentage,
        MetricName::BodyFatMass,
        MetricName::LeanBodyMass,
        MetricName::Smm,
        MetricName::Bmr,
        MetricName::LeftArmLeanMass,
        MetricName::RightArmLeanMass,
        MetricName::LeftLegLeanMass,
        MetricName::RightLegLeanMass,
        MetricName::TrunkLeanMass,
    ];

    /// Snake-case key used in JSON, CSV headers and overrides.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Weight => "weight",
            MetricName::BodyFatPercentage => "body_fat_percentage",
            MetricName::BodyFatMass => "body_fat_mass",
            MetricName::LeanBodyMass => "lean_body_mass",
            MetricName::Smm => "smm",
            MetricName::Bmr => "bmr",
            MetricName::LeftArmLeanMass => "left_arm_lean_mass",
            MetricName::RightArmLeanMass => "right_arm_lean_mass",
            MetricName::LeftLegLeanMass => "left_leg_lean_mass",
            MetricName::RightLegLeanMass => "right_leg_lean_mass",
            MetricName::TrunkLeanMass => "trunk_lean_mass",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            MetricName::Weight => "Weight",
            MetricName::BodyFatPercentage => "Body fat",
            MetricName::BodyFatMass => "Body fat mass",
            MetricName::LeanBodyMass => "Lean body mass",
            MetricName::Smm => "Skeletal muscle mass",
            MetricName::Bmr => "Basal metabolic rate",
            MetricName::LeftArmLeanMass => "Left arm lean mass",
            MetricName::RightArmLeanMass => "Right arm lean mass",
            MetricName::LeftLegLeanMass => "Left leg lean mass",
            MetricName::RightLegLeanMass => "Right leg lean mass",
            MetricName::TrunkLeanMass => "Trunk lean mass",
        }
    }

    /// Unit the report prints the metric in.
    pub fn unit(&self) -> &'static str {
        match self {
            MetricName::BodyFatPercentage => "%",
            MetricName::Bmr => "kcal",
            _ => "lbs",
        }
    }

    /// Range outside of which a reading is treated as an OCR misread.
    pub fn plausible_range(&self) -> PlausibilityRange {
        match self {
            MetricName::Weight => PlausibilityRange::new(100.0, 500.0),
            MetricName::BodyFatPercentage => PlausibilityRange::new(1.0, 50.0),
            MetricName::BodyFatMass | MetricName::LeanBodyMass => {
                PlausibilityRange::new(1.0, 500.0)
            }
            MetricName::Smm => PlausibilityRange::new(10.0, 200.0),
            MetricName::Bmr => PlausibilityRange::new(1000.0, 5000.0),
            MetricName::LeftArmLeanMass
            | MetricName::RightArmLeanMass
            | MetricName::LeftLegLeanMass
            | MetricName::RightLegLeanMass
            | MetricName::TrunkLeanMass => PlausibilityRange::new(1.0, 200.0),
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");

        MetricName::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| MetricError::UnknownMetric(s.trim().to_string()))
    }
}

/// Inclusive numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlausibilityRange {
    pub min: f64,
    pub max: f64,
}

impl PlausibilityRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the range. NaN never does.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for PlausibilityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Metrics recovered from one scan, keyed by metric name.
///
/// Metrics that could not be located are absent; there are no placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyMetrics(BTreeMap<MetricName, f64>);

impl BodyMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: MetricName) -> Option<f64> {
        self.0.get(&metric).copied()
    }

    pub fn contains(&self, metric: MetricName) -> bool {
        self.0.contains_key(&metric)
    }

    pub fn insert(&mut self, metric: MetricName, value: f64) -> Option<f64> {
        self.0.insert(metric, value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricName, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Metrics that were not found.
    pub fn missing(&self) -> Vec<MetricName> {
        MetricName::ALL
            .iter()
            .copied()
            .filter(|m| !self.contains(*m))
            .collect()
    }
}

impl FromIterator<(MetricName, f64)> for BodyMetrics {
    fn from_iter<I: IntoIterator<Item = (MetricName, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for BodyMetrics {
    type Item = (MetricName, f64);
    type IntoIter = std::collections::btree_map::IntoIter<MetricName, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Read a form-style value: blanks and placeholders are absent, thousands
/// separators are dropped.
pub fn clean_form_value(raw: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let trimmed = raw.trim();
    if matches!(trimmed, "" | "N/A" | "--") {
        return Ok(None);
    }

    trimmed.replace(',', "").parse::<f64>().map(Some)
}

/// Parse a `metric=value` override.
///
/// A placeholder value (`N/A`, `--`, blank) yields `None` for that metric.
pub fn parse_override(s: &str) -> Result<(MetricName, Option<f64>), MetricError> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| MetricError::MalformedOverride(s.to_string()))?;

    let metric: MetricName = name.parse()?;
    let value = clean_form_value(value).map_err(|_| MetricError::InvalidValue {
        metric: metric.to_string(),
        value: value.trim().to_string(),
    })?;

    Ok((metric, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_metric_name_round_trips_through_str() {
        for metric in MetricName::ALL {
            assert_eq!(metric.as_str().parse::<MetricName>(), Ok(metric));
        }
        assert_eq!("Body-Fat Percentage".parse::<MetricName>(), Ok(MetricName::BodyFatPercentage));
        assert_eq!(
            "visceral_fat".parse::<MetricName>(),
            Err(MetricError::UnknownMetric("visceral_fat".to_string()))
        );
    }

    #[test]
    fn test_plausibility_range_bounds() {
        let range = MetricName::Weight.plausible_range();
        assert!(range.contains(100.0));
        assert!(range.contains(500.0));
        assert!(!range.contains(99.9));
        assert!(!range.contains(f64::NAN));
        assert_eq!(range.to_string(), "[100, 500]");
    }

    #[test]
    fn test_body_metrics_serializes_as_flat_object() {
        let metrics: BodyMetrics = [(MetricName::Weight, 185.5), (MetricName::Bmr, 2108.0)]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&metrics).unwrap();
        assert_eq!(json, r#"{"weight":185.5,"bmr":2108.0}"#);

        let back: BodyMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metrics);
    }

    #[test]
    fn test_missing_lists_absent_metrics() {
        let metrics: BodyMetrics = [(MetricName::Weight, 185.5)].into_iter().collect();
        let missing = metrics.missing();
        assert_eq!(missing.len(), 10);
        assert!(!missing.contains(&MetricName::Weight));
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override("weight=1,185.5"), Ok((MetricName::Weight, Some(1185.5))));
        assert_eq!(parse_override("smm = N/A"), Ok((MetricName::Smm, None)));
        assert_eq!(
            parse_override("bmr=abc"),
            Err(MetricError::InvalidValue {
                metric: "bmr".to_string(),
                value: "abc".to_string()
            })
        );
        assert_eq!(
            parse_override("bmr"),
            Err(MetricError::MalformedOverride("bmr".to_string()))
        );
    }
}
