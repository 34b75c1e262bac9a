//! Server configuration

use std::fmt;

use policy_agent_core::{CREDENTIAL_VAR, DEFAULT_UPSTREAM_URL};

/// Default listen port
pub const DEFAULT_PORT: u16 = 8420;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Agent service chat endpoint
    pub upstream_url: String,
    /// Agent service credential; requests fail until it is set
    pub api_key: Option<String>,
    /// Add `Access-Control-Allow-Origin: *` to agent responses
    pub cors_enabled: bool,
}

impl ServerConfig {
    /// Create a new configuration builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Read configuration from the environment
    ///
    /// `AGENT_PORT`, `AGENT_UPSTREAM_URL` and `AGENT_CORS` fall back to their
    /// defaults when unset or unparsable. The credential has no fallback.
    pub fn from_env() -> Self {
        let port = std::env::var("AGENT_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let cors_enabled = std::env::var("AGENT_CORS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);

        let mut builder = Self::builder().port(port).cors(cors_enabled);
        if let Ok(url) = std::env::var("AGENT_UPSTREAM_URL") {
            builder = builder.upstream_url(url);
        }
        if let Ok(key) = std::env::var(CREDENTIAL_VAR) {
            builder = builder.api_key(key);
        }
        builder.build()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("upstream_url", &self.upstream_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("cors_enabled", &self.cors_enabled)
            .finish()
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    port: Option<u16>,
    upstream_url: Option<String>,
    api_key: Option<String>,
    cors_enabled: Option<bool>,
}

impl ServerConfigBuilder {
    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the agent service endpoint
    pub fn upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = Some(url.into());
        self
    }

    /// Set the agent service credential; an empty key counts as unset
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = Some(enabled);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            port: self.port.unwrap_or(DEFAULT_PORT),
            upstream_url: self
                .upstream_url
                .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
            api_key: self.api_key,
            cors_enabled: self.cors_enabled.unwrap_or(true),
        }
    }
}
