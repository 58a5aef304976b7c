//! Regex tables for InBody result sheets.
//!
//! Tesseract drops the spaces between words on this report template, so
//! labels are matched in their merged form (`BodyFatMass`, `LeftArm`).
//! Each table is tried top to bottom and only the first match of each
//! pattern is considered.

use lazy_static::lazy_static;
use regex::Regex;

// Primary label-proximity patterns.

pub const WEIGHT: &[&str] = &[
    r"(?i)Weight[^0-9]*(\d{3}\.\d)",
    r"(?i)(\d{3}\.\d)[^0-9]*Weight",
];

pub const BODY_FAT_MASS: &[&str] = &[
    r"(?i)BodyFatMass[^0-9]*(\d+\.?\d*)",
    r"(?i)(\d+\.?\d*)[^0-9]*BodyFatMass",
];

pub const LEAN_BODY_MASS: &[&str] = &[
    r"(?i)LeanBodyMass[^0-9]*(\d{3}\.\d{2})",
    r"(?i)(\d{3}\.\d{2})[^0-9]*LeanBodyMass",
    r"(?i)(\d{3}\.\d{2})[^0-9]*lbs[^0-9]*LeanBodyMass",
];

pub const SMM: &[&str] = &[
    r"(?i)SkeletalMuscleMass[^0-9]*(\d+\.?\d*)",
    r"(?i)(\d+\.?\d*)[^0-9]*SkeletalMuscleMass",
    r"(?i)SMM[^0-9]*(\d+\.?\d*)",
    r"(?i)(\d+\.?\d*)[^0-9]*SMM",
];

pub const BMR: &[&str] = &[
    r"(?i)BasalMetabolicRate[^0-9]*(\d{4})",
    r"(?i)(\d{4})[^0-9]*BasalMetabolicRate",
    r"(?i)BMR[^0-9]*(\d{4})",
];

pub const LEFT_ARM: &[&str] = &[
    r"(?i)LeftArm[^0-9]*(\d{2}\.\d{2})",
    r"(?i)(\d{2}\.\d{2})[^0-9]*LeftArm",
];

pub const RIGHT_ARM: &[&str] = &[
    r"(?i)RightArm[^0-9]*(\d{2}\.\d{2})",
    r"(?i)(\d{2}\.\d{2})[^0-9]*RightArm",
];

pub const TRUNK: &[&str] = &[
    r"(?i)Trunk[^0-9]*(\d{3}\.\d)",
    r"(?i)(\d{3}\.\d)[^0-9]*Trunk",
];

pub const LEFT_LEG: &[&str] = &[
    r"(?i)LeftLeg[^0-9]*(\d{2}\.\d{2})",
    r"(?i)(\d{2}\.\d{2})[^0-9]*LeftLeg",
];

pub const RIGHT_LEG: &[&str] = &[
    r"(?i)RightLeg[^0-9]*(\d{2}\.\d{2})",
    r"(?i)(\d{2}\.\d{2})[^0-9]*RightLeg",
];

// Body fat percentage, in the order the ladder tries them.

/// Values printed with a percent sign next to a body-fat label.
pub const BODY_FAT_PERCENT_SIGN: &[&str] = &[
    r"(?i)(\d+\.?\d*)%[^0-9]*BodyFat",
    r"(?i)BodyFat[^0-9]*(\d+\.?\d*)%",
    r"(?i)(\d+\.?\d*)%[^0-9]*PBF",
    r"(?i)PBF[^0-9]*(\d+\.?\d*)%",
    r"(?i)(\d+\.?\d*)%[^0-9]*PercentBodyFat",
    r"(?i)PercentBodyFat[^0-9]*(\d+\.?\d*)%",
];

/// First number after the PBF label, read as printed.
pub const PBF_SECTION: &[&str] = &[r"(?i)PBF[^0-9]*(\d+\.?\d*)"];

/// PBF neighbours where the decimal point may have been lost.
pub const PBF_TENTHS: &[&str] = &[
    r"(?i)PBF[^0-9]*(\d{2,3})",
    r"(?i)(\d{2,3})[^0-9]*PBF",
    r"(?i)PBF[^0-9]*(\d+\.?\d*)",
    r"(?i)(\d+\.?\d*)[^0-9]*PBF",
];

/// PBF inside the Obesity Analysis block, which may span lines.
pub const OBESITY_SECTION: &[&str] = &[r"(?is)ObesityAnalysis.*?PBF[^0-9]*(\d+\.?\d*)"];

/// Garbled renderings of the PBF caption seen on specific scans
/// (`menscrma283` for "...percentage: 28.3%").
pub const PBF_GARBLED: &[&str] = &[
    r"(?i)menscrma(\d{2,3})",
    r"(?i)boctyfat[^0-9]*(\d{2,3})",
    r"(?i)perceniage[^0-9]*(\d{2,3})",
];

// Weight and SMM fallbacks.

/// Weight trend printed at the bottom of the sheet, oldest first.
pub const WEIGHT_HISTORY: &[&str] = &[
    r"(\d{3}\.\d)\s*,\s*(\d{3}\.\d)\s*,\s*(\d{3}\.\d)\s*,\s*(\d{3}\.\d)",
    r"(\d{3}\.\d)\s*,\s*(\d{3}\.\d)\s*,\s*(\d{3}\.\d)",
    r"(\d{3}\.\d)\s*,\s*(\d{3}\.\d)",
];

/// Partial SMM labels.
pub const SMM_PARTIAL: &[&str] = &[
    r"(?i)SkeletalMuscleMass[^0-9]*(\d+\.?\d*)",
    r"(?i)(\d+\.?\d*)[^0-9]*SkeletalMuscleMass",
    r"(?i)Skeletal[^0-9]*(\d+\.?\d*)",
    r"(?i)(\d+\.?\d*)[^0-9]*Skeletal",
    r"(?i)MuscleMass[^0-9]*(\d+\.?\d*)",
    r"(?i)(\d+\.?\d*)[^0-9]*MuscleMass",
];

lazy_static! {
    /// Any number.
    pub static ref NUMBER: Regex = Regex::new(r"(\d+\.?\d*)").unwrap();

    /// A number with up to 20 letters/spaces on each side.
    pub static ref NUMBER_CONTEXT: Regex = Regex::new(
        r"([A-Za-z\s]{0,20})(\d+\.?\d*)([A-Za-z\s]{0,20})"
    ).unwrap();

    /// Two digits, a point and one digit (17.3, 22.1).
    pub static ref DECIMAL_TOKEN: Regex = Regex::new(r"(\d{2}\.\d)").unwrap();
}

/// Compile a pattern table.
pub fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
}
