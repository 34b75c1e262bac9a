//! Envelope unwrapping
//!
//! The agent service sometimes wraps its real answer in an outer object whose
//! `response` field is the JSON document serialized as text. Unwrapping goes
//! exactly one level deep.

use serde_json::{Map, Value};

use super::{recover_text, RecoveryOutcome};

/// True when the object already has the "success + result" shape
///
/// Either `status == "success"` or `success == true`, together with a
/// non-empty `result`.
pub fn is_success_shape(object: &Map<String, Value>) -> bool {
    let succeeded = object.get("status").and_then(Value::as_str) == Some("success")
        || object.get("success").and_then(Value::as_bool) == Some(true);

    succeeded && object.get("result").is_some_and(is_truthy)
}

/// Unwrap a nested `response` text field once
///
/// Returns the working value and whether it was replaced by the inner one.
/// The inner value is never inspected for a further envelope.
pub fn unwrap_envelope(value: Value) -> (Value, bool) {
    let replacement = match &value {
        Value::Object(object) if !is_success_shape(object) => match object.get("response") {
            Some(Value::String(inner)) => recover_structured(inner),
            _ => None,
        },
        _ => None,
    };

    match replacement {
        Some(inner) => (inner, true),
        None => (value, false),
    }
}

fn recover_structured(text: &str) -> Option<Value> {
    match recover_text(text) {
        (_, RecoveryOutcome::FallbackText) => None,
        (inner, _) if inner.is_object() || inner.is_array() => Some(inner),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
