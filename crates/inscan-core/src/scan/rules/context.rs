//! Context-window heuristics for body fat percentage.
//!
//! BMI and PBF share a numeric range on the report, so a bare number is
//! only taken as body fat when the surrounding text mentions fat and does
//! not mention BMI, weight or height.

use crate::models::metrics::PlausibilityRange;

use super::patterns::{DECIMAL_TOKEN, NUMBER, NUMBER_CONTEXT};

/// Terms that suggest a nearby number is body fat percentage.
pub const BODY_FAT_INDICATORS: &[&str] = &["bodyfat", "pbf", "percent", "fat", "obesity", "bf"];

/// Terms that disqualify a nearby number.
pub const BMI_INDICATORS: &[&str] = &["bmi", "index", "weight", "height"];

/// A number with the letters and spaces around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberContext<'a> {
    pub before: &'a str,
    pub number: &'a str,
    pub after: &'a str,
}

/// A number accepted from its context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMatch {
    pub value: f64,
    pub context: String,
}

/// Every number token in the text, in order.
pub fn numbers(text: &str) -> Vec<&str> {
    NUMBER.find_iter(text).map(|m| m.as_str()).collect()
}

/// Every number with up to 20 letters/spaces on each side.
pub fn number_contexts(text: &str) -> Vec<NumberContext<'_>> {
    NUMBER_CONTEXT
        .captures_iter(text)
        .filter_map(|caps| {
            Some(NumberContext {
                before: caps.get(1)?.as_str(),
                number: caps.get(2)?.as_str(),
                after: caps.get(3)?.as_str(),
            })
        })
        .collect()
}

fn has_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| haystack.contains(t))
}

/// Lowercased context mentions body fat and nothing BMI-like.
pub fn is_body_fat_context(context: &str) -> bool {
    has_any(context, BODY_FAT_INDICATORS) && !has_any(context, BMI_INDICATORS)
}

/// Up to `n` characters ending at byte offset `end`.
fn chars_before(text: &str, end: usize, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let head = &text[..end];
    let start = head
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &head[start..]
}

/// Up to `n` characters starting at byte offset `start`.
fn chars_after(text: &str, start: usize, n: usize) -> &str {
    let tail = &text[start..];
    let end = tail
        .char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    &tail[..end]
}

/// Scan `dd.d` tokens within `range` and accept the first whose window
/// reads as body fat.
///
/// The window is taken around the first occurrence of the token's text,
/// which may sit inside a longer number earlier in the report.
pub fn decimal_in_context(
    text: &str,
    window: usize,
    range: PlausibilityRange,
) -> Option<ContextMatch> {
    for m in DECIMAL_TOKEN.find_iter(text) {
        let token = m.as_str();
        let Ok(value) = token.parse::<f64>() else {
            continue;
        };
        if !range.contains(value) {
            continue;
        }

        let pos = text.find(token).unwrap_or(m.start());
        let before = chars_before(text, pos, window);
        let after = chars_after(text, pos + token.len(), window);
        let context = format!("{}{}", before, after).to_lowercase();

        if is_body_fat_context(&context) {
            return Some(ContextMatch {
                value,
                context: format!("'{}' -> {} <- '{}'", before.trim(), token, after.trim()),
            });
        }
    }

    None
}

/// Accept the first listed number within `range` whose neighbouring words
/// read as body fat.
pub fn number_in_context(
    contexts: &[NumberContext<'_>],
    range: PlausibilityRange,
) -> Option<ContextMatch> {
    for ctx in contexts {
        let Ok(value) = ctx.number.parse::<f64>() else {
            continue;
        };
        if !range.contains(value) {
            continue;
        }

        let before = ctx.before.to_lowercase();
        let after = ctx.after.to_lowercase();
        let positive =
            has_any(&before, BODY_FAT_INDICATORS) || has_any(&after, BODY_FAT_INDICATORS);
        let negative = has_any(&before, BMI_INDICATORS) || has_any(&after, BMI_INDICATORS);

        if positive && !negative {
            return Some(ContextMatch {
                value,
                context: format!("'{}' -> {} <- '{}'", ctx.before.trim(), ctx.number, ctx.after.trim()),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BF_RANGE: PlausibilityRange = PlausibilityRange::new(1.0, 50.0);
    const DECIMAL_RANGE: PlausibilityRange = PlausibilityRange::new(10.0, 30.0);

    #[test]
    fn test_window_helpers_respect_char_boundaries() {
        let text = "ééé12.3ééé";
        let pos = text.find("12.3").unwrap();
        assert_eq!(chars_before(text, pos, 2), "éé");
        assert_eq!(chars_after(text, pos + 4, 5), "ééé");
        assert_eq!(chars_before(text, pos, 0), "");
    }

    #[test]
    fn test_decimal_rejects_bmi_window() {
        let text = "Body Mass Index 22.5";
        assert_eq!(decimal_in_context(text, 50, DECIMAL_RANGE), None);
    }

    #[test]
    fn test_decimal_accepts_fat_window() {
        let text = "Percent Body Fat 17.3 %";
        let found = decimal_in_context(text, 50, DECIMAL_RANGE).unwrap();
        assert_eq!(found.value, 17.3);
    }

    #[test]
    fn test_decimal_skips_values_outside_range() {
        let text = "Fat 35.2";
        assert_eq!(decimal_in_context(text, 50, DECIMAL_RANGE), None);
    }

    #[test]
    fn test_narrow_window_excludes_distant_bmi_label() {
        let text = format!("BMI{}Fat 18.7", " ".repeat(40));
        assert_eq!(decimal_in_context(&text, 50, DECIMAL_RANGE), None);
        assert_eq!(
            decimal_in_context(&text, 10, DECIMAL_RANGE).map(|m| m.value),
            Some(18.7)
        );
    }

    #[test]
    fn test_number_context_listing() {
        let contexts = number_contexts("Weight 185.5 lbs\nPBF 28");
        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[0].number, "185.5");
        assert_eq!(contexts[1].number, "28");
    }

    #[test]
    fn test_number_in_context_skips_bmi() {
        let contexts = number_contexts("BMI fat 24; 31 pbf");
        let found = number_in_context(&contexts, BF_RANGE).unwrap();
        assert_eq!(found.value, 31.0);
    }

    #[test]
    fn test_numbers_listing() {
        assert_eq!(numbers("a 1 b 22.5 c 3."), vec!["1", "22.5", "3."]);
        assert!(numbers("no digits here").is_empty());
    }
}
