//! Outbound response envelope

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{normalize, Normalized, RecoveryOutcome};
use crate::request::UpstreamPayload;

/// Successful agent call as seen by the caller
///
/// `response` holds the normalized value; `raw_response` is exactly what the
/// agent service returned, so callers can always fall back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub success: bool,
    pub response: Value,
    pub raw_response: Value,
    pub agent_id: String,
    pub user_id: String,
    pub session_id: String,
    /// ISO-8601 with millisecond precision
    pub timestamp: String,
}

impl AgentResponse {
    /// Build the envelope from an already-normalized payload
    pub fn new(
        payload: &UpstreamPayload,
        raw_response: Value,
        normalized: Normalized,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            success: true,
            response: normalized.into_value(),
            raw_response,
            agent_id: payload.agent_id.clone(),
            user_id: payload.user_id.clone(),
            session_id: payload.session_id.clone(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Normalize the `response` field of an agent service body and wrap it
    ///
    /// Returns the envelope together with the normalization diagnostics.
    pub fn from_upstream_body(
        payload: &UpstreamPayload,
        body: &Value,
        now: DateTime<Utc>,
    ) -> (Self, NormalizationReport) {
        let raw = body.get("response").cloned().unwrap_or(Value::Null);
        let normalized = normalize(&raw);
        let report = NormalizationReport::from(&normalized);

        (Self::new(payload, raw, normalized, now), report)
    }

    /// `response.result`, when the normalized value has one
    pub fn result(&self) -> Option<&Value> {
        self.response.get("result")
    }
}

/// Diagnostics for one normalization pass, for logging and stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    pub outcome: RecoveryOutcome,
    pub unwrapped: bool,
    pub structured: bool,
}

impl From<&Normalized> for NormalizationReport {
    fn from(normalized: &Normalized) -> Self {
        Self {
            outcome: normalized.outcome,
            unwrapped: normalized.unwrapped,
            structured: normalized.is_structured(),
        }
    }
}

/// Short label for the JSON type of a raw payload
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
