//! WASM bindings for InBody scan metric extraction.
//!
//! This crate provides WebAssembly bindings for the scan review page: the
//! browser runs OCR, passes the text here, and pre-fills the stat form
//! with the returned metrics.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use inscan_core::models::config::ExtractionConfig;
use inscan_core::models::metrics::clean_form_value;
use inscan_core::{
    BodyMetrics, CollectingObserver, ExtractionEvent, ExtractionObserver, InBodyExtractor,
    MetricError, MetricExtractor, MetricName, StatRecord,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Serialize maps as plain objects rather than `Map`.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Extract metrics from OCR text.
///
/// Returns an object keyed by metric name; metrics that were not found are
/// absent.
#[wasm_bindgen]
pub fn extract_metrics(text: &str) -> Result<JsValue, JsValue> {
    to_js(&inscan_core::extract_metrics(text))
}

/// Merge form input with OCR values into a dated stat record.
///
/// `user` is an object of metric name to form string; blank, `N/A` and `--`
/// entries are skipped. `ocr` is the object returned by `extract_metrics`.
#[wasm_bindgen]
pub fn merge_record(date: &str, user: JsValue, ocr: JsValue) -> Result<JsValue, JsValue> {
    let date = NaiveDate::from_str(date).map_err(js_error)?;

    let form: BTreeMap<String, String> = serde_wasm_bindgen::from_value(user)?;
    let user = parse_form_values(&form).map_err(js_error)?;

    let ocr: BodyMetrics = if ocr.is_undefined() || ocr.is_null() {
        BodyMetrics::new()
    } else {
        serde_wasm_bindgen::from_value(ocr)?
    };

    let record = StatRecord::merge(date, &user, &ocr);
    if !record.has_data() {
        return Err(JsValue::from_str("at least one metric is required"));
    }

    to_js(&record)
}

fn parse_form_values(form: &BTreeMap<String, String>) -> Result<BodyMetrics, MetricError> {
    let mut metrics = BodyMetrics::new();

    for (name, raw) in form {
        let metric = MetricName::from_str(name)?;
        let value = clean_form_value(raw).map_err(|_| MetricError::InvalidValue {
            metric: metric.to_string(),
            value: raw.trim().to_string(),
        })?;
        if let Some(value) = value {
            metrics.insert(metric, value);
        }
    }

    Ok(metrics)
}

/// Logs extraction events to the browser console.
struct ConsoleObserver;

impl ExtractionObserver for ConsoleObserver {
    fn observe(&self, event: &ExtractionEvent) {
        let message = JsValue::from_str(&event.to_string());
        match event {
            ExtractionEvent::MalformedCapture { .. } => web_sys::console::warn_1(&message),
            ExtractionEvent::NumberContext { .. } => {}
            _ => web_sys::console::debug_1(&message),
        }
    }
}

#[derive(Serialize)]
struct ExtractResult {
    metrics: BodyMetrics,
    missing: Vec<MetricName>,
    events: Vec<String>,
    processing_time_ms: f64,
}

/// Metric extractor class for browser use.
#[wasm_bindgen]
pub struct ScanExtractor {
    config: ExtractionConfig,
    console: bool,
}

#[wasm_bindgen]
impl ScanExtractor {
    /// Create a new metric extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            console: false,
        }
    }

    /// Characters inspected around a bare decimal for body-fat context.
    #[wasm_bindgen]
    pub fn set_context_window(&mut self, chars: usize) {
        self.config.context_window = chars;
    }

    /// Log extraction events to the browser console.
    #[wasm_bindgen]
    pub fn set_console_logging(&mut self, enabled: bool) {
        self.console = enabled;
    }

    /// Extract metrics from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.extractor().extract(text))
    }

    /// Extract metrics along with what was tried.
    #[wasm_bindgen]
    pub fn extract_with_diagnostics(&self, text: &str) -> Result<JsValue, JsValue> {
        let observer = CollectingObserver::new();
        let start = js_sys::Date::now();

        let metrics = self.extractor().extract_with(text, &observer);

        let output = ExtractResult {
            missing: metrics.missing(),
            metrics,
            events: observer.take().iter().map(|e| e.to_string()).collect(),
            processing_time_ms: js_sys::Date::now() - start,
        };

        to_js(&output)
    }
}

impl ScanExtractor {
    fn extractor(&self) -> InBodyExtractor {
        let extractor = InBodyExtractor::new().with_config(self.config.clone());
        if self.console {
            extractor.with_observer(std::sync::Arc::new(ConsoleObserver))
        } else {
            extractor
        }
    }
}

impl Default for ScanExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Metric metadata for building the stat form.
#[wasm_bindgen]
pub struct MetricInfo;

#[wasm_bindgen]
impl MetricInfo {
    /// Every metric name, in report order.
    #[wasm_bindgen]
    pub fn names() -> Result<JsValue, JsValue> {
        let names: Vec<&str> = MetricName::ALL.iter().map(|m| m.as_str()).collect();
        to_js(&names)
    }

    /// Display label for a metric.
    #[wasm_bindgen]
    pub fn label(metric: &str) -> Result<String, JsValue> {
        let metric = MetricName::from_str(metric).map_err(js_error)?;
        Ok(metric.label().to_string())
    }

    /// Unit a metric is reported in.
    #[wasm_bindgen]
    pub fn unit(metric: &str) -> Result<String, JsValue> {
        let metric = MetricName::from_str(metric).map_err(js_error)?;
        Ok(metric.unit().to_string())
    }

    /// `{ min, max }` accepted for a metric.
    #[wasm_bindgen]
    pub fn plausible_range(metric: &str) -> Result<JsValue, JsValue> {
        let metric = MetricName::from_str(metric).map_err(js_error)?;
        to_js(&metric.plausible_range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_parse_form_values() {
        let form: BTreeMap<String, String> = [
            ("weight".to_string(), "190.5".to_string()),
            ("bmr".to_string(), "1,850".to_string()),
            ("smm".to_string(), "".to_string()),
        ]
        .into_iter()
        .collect();

        let metrics = parse_form_values(&form).unwrap();
        assert_eq!(metrics.get(MetricName::Weight), Some(190.5));
        assert_eq!(metrics.get(MetricName::Bmr), Some(1850.0));
        assert!(!metrics.contains(MetricName::Smm));
    }

    #[wasm_bindgen_test]
    fn test_parse_form_values_rejects_text() {
        let form: BTreeMap<String, String> = [("weight".to_string(), "heavy".to_string())]
            .into_iter()
            .collect();

        assert!(matches!(
            parse_form_values(&form),
            Err(MetricError::InvalidValue { .. })
        ));
    }

    #[wasm_bindgen_test]
    fn test_extract_returns_plain_object() {
        let value = extract_metrics("Weight 185.5").unwrap();
        let weight = js_sys::Reflect::get(&value, &JsValue::from_str("weight")).unwrap();
        assert_eq!(weight.as_f64(), Some(185.5));
    }

    #[wasm_bindgen_test]
    fn test_label_rejects_unknown_metric() {
        assert_eq!(MetricInfo::label("weight").unwrap(), "Weight");
        assert!(MetricInfo::label("height").is_err());
    }
}
