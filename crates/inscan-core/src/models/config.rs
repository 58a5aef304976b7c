//! Configuration structures for the scan pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::models::metrics::PlausibilityRange;

/// Main configuration for inscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Metric extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Metric extraction configuration.
///
/// Only the context-window fallbacks are tunable; the per-metric pattern
/// tables are fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Characters inspected on each side of a decimal token when looking
    /// for body-fat context.
    pub context_window: usize,

    /// Values a bare decimal token must fall in before its context is
    /// inspected.
    pub decimal_context_range: PlausibilityRange,

    /// Report the up-front number and context listing to the observer.
    pub report_number_listing: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            context_window: 50,
            decimal_context_range: PlausibilityRange::new(10.0, 30.0),
            report_number_listing: true,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty_json: bool,

    /// Include metrics that were not found as empty CSV cells / text lines.
    pub show_missing: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty_json: true,
            show_missing: false,
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the extractor cannot work with.
    pub fn validate(&self) -> Result<()> {
        let range = self.extraction.decimal_context_range;
        if !(range.min <= range.max) {
            return Err(ScanError::Config(format!(
                "extraction.decimal_context_range is empty: {}",
                range
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ScanConfig =
            serde_json::from_str(r#"{"extraction": {"context_window": 30}}"#).unwrap();

        assert_eq!(config.extraction.context_window, 30);
        assert_eq!(
            config.extraction.decimal_context_range,
            PlausibilityRange::new(10.0, 30.0)
        );
        assert!(config.output.pretty_json);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ScanConfig::default();
        config.extraction.context_window = 20;
        config.save(&path).unwrap();

        let loaded = ScanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.context_window, 20);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"extraction": {"decimal_context_range": {"min": 30.0, "max": 10.0}}}"#,
        )
        .unwrap();

        assert!(matches!(
            ScanConfig::from_file(&path),
            Err(ScanError::Config(_))
        ));
    }
}
