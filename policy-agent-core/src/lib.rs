//! # Policy Agent Core
//!
//! Request shaping and response recovery for the policy agent gateway:
//!
//! - **Request shaping**: coerce a loosely typed caller body into the exact
//!   payload the hosted agent service expects
//! - **Normalization**: recover a structured value from whatever the agent
//!   returned (fenced JSON, double-encoded JSON, JSON with trailing commas or
//!   Python literals, JSON buried in prose, or plain text)
//! - **Digest**: read the drafted policy and compliance report out of a
//!   normalized coordinator response
//!
//! ## Core Principle
//!
//! > Normalization never fails. The worst case is the caller's own text back.
//!
//! ## Example
//!
//! ```rust
//! use policy_agent_core::{normalize, RecoveryOutcome};
//! use serde_json::json;
//!
//! let raw = json!("Here is your result: {\"score\": 5} hope that helps");
//! let normalized = normalize(&raw);
//!
//! assert_eq!(normalized.value, json!({"score": 5}));
//! assert_eq!(normalized.outcome, RecoveryOutcome::Extracted);
//! ```

pub mod digest;
pub mod error;
pub mod normalize;
pub mod request;
pub mod response;

// Re-export main types
pub use digest::{ComplianceReport, Finding, PolicyDigest, Severity};
pub use error::{AgentError, ErrorCategory, ErrorEnvelope, Result};
pub use normalize::{normalize, normalize_text, Normalized, RecoveryOutcome};
pub use request::{coerce_message, AgentRequest, UpstreamPayload};
pub use response::{AgentResponse, NormalizationReport};

/// Version of the policy agent core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Chat endpoint of the hosted agent service
pub const DEFAULT_UPSTREAM_URL: &str = "https://agent-prod.studio.lyzr.ai/v3/inference/chat/";

/// Environment variable holding the agent service credential
pub const CREDENTIAL_VAR: &str = "LYZR_API_KEY";
