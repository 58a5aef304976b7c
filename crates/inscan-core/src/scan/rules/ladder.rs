//! Per-metric extraction ladders.

use lazy_static::lazy_static;

use crate::models::metrics::{MetricName, PlausibilityRange};

use super::artifacts::artifacts_for;
use super::patterns::{self, compile};
use super::{ExtractionRule, Reading, Stage, Step};

/// The ordered steps for one metric.
#[derive(Debug)]
pub struct MetricLadder {
    pub metric: MetricName,
    pub steps: Vec<Step>,
}

lazy_static! {
    /// Ladders for every metric, in report order.
    pub static ref LADDERS: Vec<MetricLadder> = MetricName::ALL
        .iter()
        .map(|metric| build(*metric))
        .collect();
}

/// The ladder for `metric`.
pub fn ladder_for(metric: MetricName) -> &'static MetricLadder {
    LADDERS
        .iter()
        .find(|l| l.metric == metric)
        .unwrap_or_else(|| unreachable!("every metric has a ladder"))
}

fn rules(table: &[&str], range: PlausibilityRange, reading: Reading) -> Vec<ExtractionRule> {
    compile(table)
        .into_iter()
        .map(|re| ExtractionRule::new(re, range, reading))
        .collect()
}

fn table_step(stage: Stage, table: &[&str], range: PlausibilityRange, reading: Reading) -> Step {
    Step::Patterns {
        stage,
        rules: rules(table, range, reading),
        first_match_only: false,
    }
}

fn primary_table(metric: MetricName) -> &'static [&'static str] {
    match metric {
        MetricName::Weight => patterns::WEIGHT,
        MetricName::BodyFatMass => patterns::BODY_FAT_MASS,
        MetricName::LeanBodyMass => patterns::LEAN_BODY_MASS,
        MetricName::Smm => patterns::SMM,
        MetricName::Bmr => patterns::BMR,
        MetricName::LeftArmLeanMass => patterns::LEFT_ARM,
        MetricName::RightArmLeanMass => patterns::RIGHT_ARM,
        MetricName::TrunkLeanMass => patterns::TRUNK,
        MetricName::LeftLegLeanMass => patterns::LEFT_LEG,
        MetricName::RightLegLeanMass => patterns::RIGHT_LEG,
        // Body fat percentage starts at the percent-sign patterns.
        MetricName::BodyFatPercentage => &[],
    }
}

fn build(metric: MetricName) -> MetricLadder {
    let range = metric.plausible_range();
    let mut steps = Vec::new();

    let primary = primary_table(metric);
    if !primary.is_empty() {
        steps.push(table_step(Stage::Primary, primary, range, Reading::AsIs));
    }

    steps.extend(artifacts_for(metric).map(Step::Artifact));

    match metric {
        MetricName::BodyFatPercentage => {
            steps.push(table_step(
                Stage::PercentSign,
                patterns::BODY_FAT_PERCENT_SIGN,
                range,
                Reading::AsIs,
            ));
            steps.push(table_step(
                Stage::PbfSection,
                patterns::PBF_SECTION,
                range,
                Reading::AsIs,
            ));
            steps.push(table_step(
                Stage::PbfTenths,
                patterns::PBF_TENTHS,
                range,
                Reading::TenthsAbove100,
            ));
            steps.push(table_step(
                Stage::ObesitySection,
                patterns::OBESITY_SECTION,
                range,
                Reading::AsIs,
            ));
            steps.push(table_step(
                Stage::GarbledCaption,
                patterns::PBF_GARBLED,
                range,
                Reading::TenthsAbove100,
            ));
            steps.push(Step::DecimalContext);
            steps.push(Step::NumberContext);
        }
        MetricName::Weight => {
            // The longest run found is the trend; a shorter pattern would
            // only re-read a prefix of it.
            steps.push(Step::Patterns {
                stage: Stage::WeightHistory,
                rules: rules(patterns::WEIGHT_HISTORY, range, Reading::LatestInRun),
                first_match_only: true,
            });
        }
        MetricName::Smm => {
            steps.push(table_step(
                Stage::PartialLabel,
                patterns::SMM_PARTIAL,
                range,
                Reading::AsIs,
            ));
        }
        _ => {}
    }

    MetricLadder { metric, steps }
}
