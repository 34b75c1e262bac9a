//! Response normalization
//!
//! Turns whatever the agent service returned into the best structured value we
//! can recover. The pipeline for text payloads is:
//!
//! ```text
//! raw text ─▶ pre-clean ─▶ strict ─▶ lenient ─▶ span extraction ─▶ text fallback
//!                             │          │              │
//!                             └──────────┴──────────────┴─▶ envelope unwrap (once)
//! ```
//!
//! Object payloads skip straight to envelope unwrapping. Nothing here fails:
//! the worst case is the cleaned text with [`RecoveryOutcome::FallbackText`].
//!
//! ```rust
//! use policy_agent_core::normalize::{normalize_text, RecoveryOutcome};
//! use serde_json::json;
//!
//! let normalized = normalize_text("```json\n{\"a\": 1}\n```");
//! assert_eq!(normalized.value, json!({"a": 1}));
//! assert_eq!(normalized.outcome, RecoveryOutcome::Direct);
//!
//! let prose = normalize_text("Thank you for your request.");
//! assert_eq!(prose.value, json!("Thank you for your request."));
//! assert!(!prose.is_structured());
//! ```

pub mod clean;
pub mod envelope;
pub mod parse;
pub mod repair;
pub mod scan;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use clean::pre_clean;
pub use envelope::{is_success_shape, unwrap_envelope};
pub use parse::parse_cascade;
pub use repair::{apply_repairs, Repair};
pub use scan::find_balanced_span;

/// Which stage produced the normalized value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryOutcome {
    /// Strict parse of the cleaned text, or a payload that was already structured
    Direct,
    /// Parse after heuristic repairs
    Lenient,
    /// Parse of a bracketed span found inside prose
    Extracted,
    /// Nothing could be structured; the cleaned text is returned
    FallbackText,
}

impl RecoveryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryOutcome::Direct => "direct",
            RecoveryOutcome::Lenient => "lenient",
            RecoveryOutcome::Extracted => "extracted",
            RecoveryOutcome::FallbackText => "fallback_text",
        }
    }
}

impl fmt::Display for RecoveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one normalization pass
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The recovered value, or the cleaned text as a JSON string
    pub value: Value,
    /// Stage that produced the top-level value
    pub outcome: RecoveryOutcome,
    /// Whether a nested `response` envelope was unwrapped
    pub unwrapped: bool,
}

impl Normalized {
    /// Whether the value is a keyed mapping or a list
    ///
    /// Scalars such as `null` or a JSON-quoted string parse directly but are
    /// not structured.
    pub fn is_structured(&self) -> bool {
        matches!(self.value, Value::Object(_) | Value::Array(_))
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Text form of the value: fallback text verbatim, anything else as JSON
    pub fn to_text(&self) -> String {
        match &self.value {
            Value::String(text) if self.outcome == RecoveryOutcome::FallbackText => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Normalize a raw agent payload of unknown shape
pub fn normalize(raw: &Value) -> Normalized {
    let normalized = match raw {
        Value::String(text) => normalize_text(text),
        other => {
            let (value, unwrapped) = unwrap_envelope(other.clone());
            Normalized {
                value,
                outcome: RecoveryOutcome::Direct,
                unwrapped,
            }
        }
    };

    tracing::debug!(
        outcome = %normalized.outcome,
        unwrapped = normalized.unwrapped,
        "normalized agent payload"
    );

    normalized
}

/// Normalize a text payload
pub fn normalize_text(raw: &str) -> Normalized {
    match recover_text(raw) {
        (value, RecoveryOutcome::FallbackText) => Normalized {
            value,
            outcome: RecoveryOutcome::FallbackText,
            unwrapped: false,
        },
        (value, outcome) => {
            let (value, unwrapped) = unwrap_envelope(value);
            Normalized {
                value,
                outcome,
                unwrapped,
            }
        }
    }
}

/// Pre-clean and run the parse cascade, without envelope unwrapping
pub(crate) fn recover_text(raw: &str) -> (Value, RecoveryOutcome) {
    let cleaned = pre_clean(raw);
    match parse_cascade(&cleaned) {
        Some(recovered) => recovered,
        None => (Value::String(cleaned), RecoveryOutcome::FallbackText),
    }
}
