//! Strict-then-lenient parse cascade
//!
//! The cascade is an ordered table of stages. Each stage either yields a value
//! or lets the next one try; the first value wins and carries the outcome of
//! the stage that produced it.

use serde_json::Value;

use super::clean::pre_clean;
use super::repair::{apply_repairs, Repair};
use super::scan::find_balanced_span;
use super::RecoveryOutcome;

type Stage = fn(&str) -> Option<Value>;

const CASCADE: [(RecoveryOutcome, Stage); 3] = [
    (RecoveryOutcome::Direct, direct),
    (RecoveryOutcome::Lenient, lenient),
    (RecoveryOutcome::Extracted, extract),
];

/// Run the full cascade over already-cleaned text
pub fn parse_cascade(cleaned: &str) -> Option<(Value, RecoveryOutcome)> {
    CASCADE
        .iter()
        .find_map(|(outcome, stage)| stage(cleaned).map(|value| (value, *outcome)))
}

/// Standards-compliant parse, any JSON value accepted
pub fn strict(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Parse after escalating repairs, stopping at the first success
///
/// Only objects and arrays count: a repaired `None` turning into `null` is not
/// a recovery. A repaired JSON string is decoded once, like in the direct stage.
pub fn lenient(text: &str) -> Option<Value> {
    lenient_with(text, true)
}

fn lenient_with(text: &str, decode_strings: bool) -> Option<Value> {
    let mut previous: Option<String> = None;

    for level in 0..=Repair::ESCALATION.len() {
        let repaired = apply_repairs(text, &Repair::ESCALATION[..level]);
        if repaired == text || previous.as_deref() == Some(repaired.as_str()) {
            continue;
        }

        match strict(&repaired) {
            Some(value) if is_container(&value) => {
                tracing::trace!(level, "lenient parse succeeded");
                return Some(value);
            }
            Some(Value::String(inner)) if decode_strings => {
                if let Some(value) = decode_inner(&inner) {
                    return Some(value);
                }
            }
            _ => {}
        }
        previous = Some(repaired);
    }

    None
}

/// Strict parse of the whole text, decoding one layer of double encoding
///
/// When strict parsing yields a JSON string, its contents are cleaned and
/// parsed once more; an object or array found there replaces the string.
fn direct(text: &str) -> Option<Value> {
    match strict(text)? {
        Value::String(inner) => Some(decode_inner(&inner).unwrap_or(Value::String(inner))),
        other => Some(other),
    }
}

fn decode_inner(inner: &str) -> Option<Value> {
    let cleaned = pre_clean(inner);
    strict(&cleaned)
        .filter(is_container)
        .or_else(|| lenient_with(&cleaned, false))
}

/// Strict-then-lenient parse of the first balanced span in mixed text
fn extract(text: &str) -> Option<Value> {
    let span = find_balanced_span(text)?;
    if span.len() == text.len() {
        // Whole text already went through strict and lenient.
        return None;
    }
    strict(span).or_else(|| lenient(span))
}

fn is_container(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_accepts_scalars() {
        assert_eq!(strict("42"), Some(json!(42)));
        assert_eq!(strict("null"), Some(Value::Null));
        assert_eq!(strict("not json"), None);
    }

    #[test]
    fn test_cascade_direct() {
        let (value, outcome) = parse_cascade(r#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));
        assert_eq!(outcome, RecoveryOutcome::Direct);
    }

    #[test]
    fn test_cascade_lenient() {
        let (value, outcome) = parse_cascade(r#"{"a": 1, "b": 2,}"#).unwrap();
        assert_eq!(value, json!({"a": 1, "b": 2}));
        assert_eq!(outcome, RecoveryOutcome::Lenient);
    }

    #[test]
    fn test_cascade_extracted() {
        let (value, outcome) = parse_cascade("Result follows {'ok': True,} thanks").unwrap();
        assert_eq!(value, json!({"ok": true}));
        assert_eq!(outcome, RecoveryOutcome::Extracted);
    }

    #[test]
    fn test_cascade_gives_up_on_prose() {
        assert!(parse_cascade("Thank you for your request.").is_none());
        assert!(parse_cascade("True").is_none());
    }

    #[test]
    fn test_lenient_rejects_bare_scalars() {
        assert_eq!(lenient("None"), None);
        assert_eq!(lenient("'just a string'"), None);
    }

    #[test]
    fn test_double_encoded_object() {
        let text = r#""{\"status\": \"success\", \"result\": {\"score\": 3}}""#;
        let (value, outcome) = parse_cascade(text).unwrap();
        assert_eq!(value, json!({"status": "success", "result": {"score": 3}}));
        assert_eq!(outcome, RecoveryOutcome::Direct);
    }

    #[test]
    fn test_double_encoded_with_escaped_newline() {
        // Pre-cleaning breaks the outer literal; the lenient stage recovers it
        let cleaned = pre_clean(r#""{\"a\": \"x\\ny\"}""#);
        let (value, outcome) = parse_cascade(&cleaned).unwrap();
        assert_eq!(value, json!({"a": "x\ny"}));
        assert_eq!(outcome, RecoveryOutcome::Lenient);
    }

    #[test]
    fn test_json_string_of_prose_stays_string() {
        let (value, _) = parse_cascade(r#""hello there""#).unwrap();
        assert_eq!(value, json!("hello there"));
    }

    #[test]
    fn test_first_span_only() {
        // The first span is not JSON; later spans are not consulted.
        assert!(parse_cascade("see [note] then {\"a\": 1}").is_none());
    }
}
