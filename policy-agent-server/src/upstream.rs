//! Upstream agent service client

use async_trait::async_trait;
use serde_json::Value;

use policy_agent_core::{AgentError, Result, UpstreamPayload};

/// Header carrying the agent service credential
pub const API_KEY_HEADER: &str = "x-api-key";

/// Agent service interface
///
/// One call per inbound request: no retries and no timeout.
#[async_trait]
pub trait AgentUpstream: Send + Sync {
    /// Backend name, for logs
    fn name(&self) -> &str;

    /// Send one chat request and return the decoded JSON body
    async fn chat(&self, payload: &UpstreamPayload, api_key: &str) -> Result<Value>;
}

/// HTTP client for the hosted agent service
pub struct HttpUpstream {
    client: reqwest::Client,
    url: String,
}

impl HttpUpstream {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AgentUpstream for HttpUpstream {
    fn name(&self) -> &str {
        "http"
    }

    async fn chat(&self, payload: &UpstreamPayload, api_key: &str) -> Result<Value> {
        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| AgentError::UpstreamTransport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            // Body text is best effort; the status alone is enough to report.
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AgentError::UpstreamBody {
                reason: e.to_string(),
            })
    }
}
