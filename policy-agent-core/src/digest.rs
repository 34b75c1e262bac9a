//! Typed reading of a policy coordinator response
//!
//! The coordinator agent answers with a manager envelope:
//!
//! ```text
//! { status, result: { final_output, sub_agent_results: [{agent_name, status, output}],
//!                     summary, workflow_completed }, metadata }
//! ```
//!
//! [`PolicyDigest`] pulls the drafted policy text and the compliance report out
//! of it, falling back to the raw agent text when no draft can be found.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::normalize;
use crate::response::AgentResponse;

/// Placeholder used when neither a draft nor raw text is available
pub const DRAFT_PLACEHOLDER: &str = "Policy draft has been generated";

/// Severity of a compliance finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

/// One compliance finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "unknown_severity")]
    pub severity: Severity,
}

fn unknown_severity() -> Severity {
    Severity::Unknown
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetadata {
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub timestamp: String,
}

/// Compliance analysis produced by the compliance sub-agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    #[serde(default)]
    pub status: String,
    pub result: ComplianceResult,
    #[serde(default)]
    pub metadata: Option<AgentMetadata>,
}

/// What the dashboard needs from one policy generation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyDigest {
    /// Drafted policy text
    pub draft: String,
    /// Whether `draft` came from a structured field rather than a fallback
    pub draft_found: bool,
    pub compliance: Option<ComplianceReport>,
    pub summary: Option<String>,
    pub workflow_completed: Option<bool>,
}

impl PolicyDigest {
    /// Digest a forwarded agent response
    pub fn from_response(response: &AgentResponse) -> Self {
        Self::from_values(&response.response, &response.raw_response)
    }

    /// Digest a normalized value, with the raw payload as draft fallback
    pub fn from_values(normalized: &Value, raw: &Value) -> Self {
        let result = normalized.get("result");
        let sub_agents: &[Value] = result
            .and_then(|r| r.get("sub_agent_results"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let final_output = result.and_then(|r| r.get("final_output"));

        let drafted = find_agent_output(sub_agents, &["Drafter", "draft"])
            .and_then(|output| draft_text(&output))
            .or_else(|| {
                final_output
                    .and_then(|f| f.get("policy_draft"))
                    .and_then(non_empty_str)
            });

        let compliance = find_agent_output(sub_agents, &["Compliance", "compliance"])
            .and_then(|output| serde_json::from_value(output).ok())
            .or_else(|| {
                final_output
                    .and_then(|f| f.get("compliance_report"))
                    .and_then(|report| serde_json::from_value(report.clone()).ok())
            });

        let draft_found = drafted.is_some();
        let draft = drafted.unwrap_or_else(|| raw_text(raw));

        Self {
            draft,
            draft_found,
            compliance,
            summary: result
                .and_then(|r| r.get("summary"))
                .and_then(non_empty_str),
            workflow_completed: result
                .and_then(|r| r.get("workflow_completed"))
                .and_then(Value::as_bool),
        }
    }

    /// Findings from the compliance report, empty when there is none
    pub fn findings(&self) -> &[Finding] {
        self.compliance
            .as_ref()
            .map(|report| report.result.findings.as_slice())
            .unwrap_or_default()
    }
}

/// Output of the first sub-agent whose name contains one of `needles`
///
/// Text outputs are normalized, since sub-agents often stringify their JSON.
fn find_agent_output(sub_agents: &[Value], needles: &[&str]) -> Option<Value> {
    let output = sub_agents
        .iter()
        .find(|agent| {
            agent
                .get("agent_name")
                .and_then(Value::as_str)
                .is_some_and(|name| needles.iter().any(|needle| name.contains(needle)))
        })?
        .get("output")?;

    let output = match output {
        Value::String(_) => normalize(output).into_value(),
        other => other.clone(),
    };

    (!output.is_null()).then_some(output)
}

fn draft_text(output: &Value) -> Option<String> {
    if let Some(text) = non_empty_str(output) {
        return Some(text);
    }

    ["policy_draft", "draft", "content"]
        .iter()
        .find_map(|field| output.get(field).and_then(non_empty_str))
        .or_else(|| Some(output.to_string()))
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn raw_text(raw: &Value) -> String {
    match raw {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Null | Value::String(_) => DRAFT_PLACEHOLDER.to_string(),
        other => other.to_string(),
    }
}
