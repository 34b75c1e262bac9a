//! Error types for agent gateway operations
//!
//! Errors fall into three tiers:
//! - Configuration errors (the upstream credential is missing)
//! - Request errors (missing fields, a body that is not a JSON object)
//! - Upstream errors (non-2xx upstream, transport failure, unreadable body)
//!
//! Normalization never produces an error. A payload that cannot be structured
//! is returned as text, so nothing in [`crate::normalize`] returns `AgentError`.
//!
//! # Example
//!
//! ```rust
//! use policy_agent_core::error::{AgentError, ErrorCategory};
//!
//! let err = AgentError::UpstreamStatus { status: 503, body: "busy".to_string() };
//! assert_eq!(err.category(), ErrorCategory::Upstream);
//! assert_eq!(err.http_status_code(), 503);
//! assert_eq!(err.error_code(), "UPSTREAM_STATUS");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Server is missing required configuration (500)
    Configuration,
    /// Caller sent an invalid request (400)
    Validation,
    /// Upstream agent service failed or rejected the call
    Upstream,
}

/// Errors that can occur while forwarding a request to the agent service
#[derive(Error, Debug)]
pub enum AgentError {
    /// The upstream credential is not configured on the server
    #[error("{variable} not configured. Set it in the server environment.")]
    MissingCredential { variable: String },

    /// Required request fields are absent after coercion
    #[error("Missing required fields: {fields} are required")]
    MissingFields { fields: String },

    /// Request body is not a JSON object
    #[error("Invalid request body: {reason}")]
    InvalidRequestBody { reason: String },

    /// Upstream answered with a non-success HTTP status
    #[error("API returned status {status}")]
    UpstreamStatus { status: u16, body: String },

    /// Upstream could not be reached or the connection failed mid-flight
    #[error("Upstream request failed: {reason}")]
    UpstreamTransport { reason: String },

    /// Upstream answered 2xx but the body was not JSON
    #[error("Upstream returned an unreadable body: {reason}")]
    UpstreamBody { reason: String },
}

impl AgentError {
    /// Shorthand for the standard missing-fields rejection
    pub fn missing_message_or_agent() -> Self {
        AgentError::MissingFields {
            fields: "message and agent_id".to_string(),
        }
    }

    /// Returns the error category for grouping
    pub fn category(&self) -> ErrorCategory {
        match self {
            AgentError::MissingCredential { .. } => ErrorCategory::Configuration,

            AgentError::MissingFields { .. } | AgentError::InvalidRequestBody { .. } => {
                ErrorCategory::Validation
            }

            AgentError::UpstreamStatus { .. }
            | AgentError::UpstreamTransport { .. }
            | AgentError::UpstreamBody { .. } => ErrorCategory::Upstream,
        }
    }

    /// Returns the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AgentError::MissingCredential { .. } => "MISSING_CREDENTIAL",
            AgentError::MissingFields { .. } => "MISSING_FIELDS",
            AgentError::InvalidRequestBody { .. } => "INVALID_REQUEST_BODY",
            AgentError::UpstreamStatus { .. } => "UPSTREAM_STATUS",
            AgentError::UpstreamTransport { .. } => "UPSTREAM_TRANSPORT",
            AgentError::UpstreamBody { .. } => "UPSTREAM_BODY",
        }
    }

    /// Returns the HTTP status code for this error
    ///
    /// Upstream status errors pass the upstream code through unchanged so the
    /// caller sees exactly what the agent service answered.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AgentError::MissingFields { .. } | AgentError::InvalidRequestBody { .. } => 400,

            AgentError::UpstreamStatus { status, .. } => {
                if (100..=999).contains(status) {
                    *status
                } else {
                    502
                }
            }

            AgentError::UpstreamTransport { .. } | AgentError::UpstreamBody { .. } => 502,

            AgentError::MissingCredential { .. } => 500,
        }
    }

    /// Optional detail text carried next to the message
    pub fn details(&self) -> Option<String> {
        match self {
            AgentError::UpstreamStatus { body, .. } => Some(body.clone()),
            AgentError::UpstreamTransport { reason } | AgentError::UpstreamBody { reason } => {
                Some(reason.clone())
            }
            _ => None,
        }
    }

    /// Converts this error to the wire envelope sent back to callers
    ///
    /// ```json
    /// {
    ///   "success": false,
    ///   "error": "API returned status 503",
    ///   "details": "busy",
    ///   "code": "UPSTREAM_STATUS"
    /// }
    /// ```
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let error = match self {
            AgentError::UpstreamTransport { .. } | AgentError::UpstreamBody { .. } => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        ErrorEnvelope {
            success: false,
            error,
            details: self.details(),
            code: self.error_code().to_string(),
        }
    }
}

/// JSON-serializable error response for the agent endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always false
    pub success: bool,
    /// Human-readable error message
    pub error: String,
    /// Upstream body or failure detail, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Stable error code
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            AgentError::MissingCredential {
                variable: "LYZR_API_KEY".to_string()
            }
            .http_status_code(),
            500
        );
        assert_eq!(AgentError::missing_message_or_agent().http_status_code(), 400);
        assert_eq!(
            AgentError::UpstreamStatus {
                status: 429,
                body: "slow down".to_string()
            }
            .http_status_code(),
            429
        );
        assert_eq!(
            AgentError::UpstreamStatus {
                status: 42,
                body: String::new()
            }
            .http_status_code(),
            502
        );
        assert_eq!(
            AgentError::UpstreamTransport {
                reason: "connection refused".to_string()
            }
            .http_status_code(),
            502
        );
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            AgentError::MissingCredential {
                variable: "LYZR_API_KEY".to_string()
            }
            .category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            AgentError::missing_message_or_agent().category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            AgentError::UpstreamBody {
                reason: "eof".to_string()
            }
            .category(),
            ErrorCategory::Upstream
        );
    }

    #[test]
    fn test_missing_fields_message() {
        let msg = AgentError::missing_message_or_agent().to_string();
        assert_eq!(
            msg,
            "Missing required fields: message and agent_id are required"
        );
    }

    #[test]
    fn test_envelope_carries_upstream_body() {
        let err = AgentError::UpstreamStatus {
            status: 401,
            body: "{\"detail\":\"bad key\"}".to_string(),
        };
        let envelope = err.to_envelope();

        assert!(!envelope.success);
        assert_eq!(envelope.error, "API returned status 401");
        assert_eq!(envelope.details.as_deref(), Some("{\"detail\":\"bad key\"}"));
        assert_eq!(envelope.code, "UPSTREAM_STATUS");
    }

    #[test]
    fn test_envelope_serialization_omits_empty_details() {
        let envelope = AgentError::missing_message_or_agent().to_envelope();
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "MISSING_FIELDS");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_transport_errors_hide_behind_generic_message() {
        let envelope = AgentError::UpstreamTransport {
            reason: "dns failure".to_string(),
        }
        .to_envelope();

        assert_eq!(envelope.error, "Internal server error");
        assert_eq!(envelope.details.as_deref(), Some("dns failure"));
    }

    #[test]
    fn test_unreadable_body_envelope() {
        let err = AgentError::UpstreamBody {
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(err.http_status_code(), 502);
        assert_eq!(err.error_code(), "UPSTREAM_BODY");

        let envelope = err.to_envelope();
        assert_eq!(envelope.error, "Internal server error");
        assert_eq!(
            envelope.details.as_deref(),
            Some("expected value at line 1 column 1")
        );
    }

    #[test]
    fn test_every_category_serializes_snake_case() {
        let categories = [
            (ErrorCategory::Configuration, "configuration"),
            (ErrorCategory::Validation, "validation"),
            (ErrorCategory::Upstream, "upstream"),
        ];
        for (category, expected) in categories {
            assert_eq!(serde_json::to_value(category).unwrap(), expected);
        }
    }
}
