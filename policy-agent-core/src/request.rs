//! Inbound request coercion and validation
//!
//! Callers (usually the dashboard) post a loosely typed body. The message may
//! arrive as an object, a number or a string, and optional identifiers may be
//! missing. [`AgentRequest::prepare`] turns that into the exact payload the
//! agent service expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AgentError, Result};

/// Body accepted by the agent endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Message for the agent; structured values are stringified
    #[serde(default)]
    pub message: Option<Value>,

    /// Agent to chat with
    #[serde(default)]
    pub agent_id: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub session_id: Option<String>,

    /// Asset IDs from a previous upload, for file attachments
    #[serde(default)]
    pub assets: Option<Value>,
}

/// Body sent to the agent service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamPayload {
    pub user_id: String,
    pub agent_id: String,
    pub session_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<String>>,
}

impl AgentRequest {
    /// Parse a request from a raw JSON body
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| AgentError::InvalidRequestBody {
                reason: e.to_string(),
            })?;

        if !value.is_object() {
            return Err(AgentError::InvalidRequestBody {
                reason: "expected a JSON object".to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| AgentError::InvalidRequestBody {
            reason: e.to_string(),
        })
    }

    /// Coerce and validate into an upstream payload
    ///
    /// Missing identifiers get `user-<millis>` / `session-<millis>` defaults
    /// taken from `now`.
    pub fn prepare(self, now: DateTime<Utc>) -> Result<UpstreamPayload> {
        let message = self.message.as_ref().and_then(coerce_message);
        let agent_id = self.agent_id.filter(|id| !id.is_empty());

        let (Some(message), Some(agent_id)) = (message, agent_id) else {
            return Err(AgentError::missing_message_or_agent());
        };

        let millis = now.timestamp_millis();
        let user_id = self
            .user_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("user-{}", millis));
        let session_id = self
            .session_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("session-{}", millis));

        Ok(UpstreamPayload {
            user_id,
            agent_id,
            session_id,
            message,
            assets: self.assets.as_ref().and_then(collect_assets),
        })
    }
}

/// Coerce a message value to text
///
/// Objects and arrays become compact JSON; numbers and booleans their string
/// form. `null` and the empty string count as absent.
pub fn coerce_message(message: &Value) -> Option<String> {
    let text = match message {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        structured @ (Value::Array(_) | Value::Object(_)) => {
            tracing::debug!("transformed message object to string");
            structured.to_string()
        }
    };

    (!text.is_empty()).then_some(text)
}

/// Keep a non-empty list of asset IDs, ignoring anything that isn't text
fn collect_assets(assets: &Value) -> Option<Vec<String>> {
    let ids: Vec<String> = assets
        .as_array()?
        .iter()
        .filter_map(|asset| asset.as_str().map(str::to_string))
        .collect();

    (!ids.is_empty()).then_some(ids)
}
