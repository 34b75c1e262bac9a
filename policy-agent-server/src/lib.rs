//! Policy Agent Server - HTTP gateway to the hosted policy agents
//!
//! The dashboard never talks to the agent service directly. It posts to this
//! server, which holds the credential, forwards one chat call and hands back a
//! normalized response.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐      ┌──────────────────────────┐      ┌──────────────┐
//! │  Dashboard  │──────│   Policy Agent Server    │──────│ Agent service│
//! │             │ HTTP │                          │ HTTP │  (hosted)    │
//! └─────────────┘      │  1. Validate + coerce    │      └──────────────┘
//!                      │  2. Forward once         │
//!                      │  3. Normalize response   │
//!                      │  4. Wrap in envelope     │
//!                      └──────────────────────────┘
//! ```
//!
//! The server is a thin wrapper; shaping and normalization live in
//! `policy-agent-core`.

mod config;
pub mod routes;
pub mod upstream;

pub use config::{ServerConfig, ServerConfigBuilder, DEFAULT_PORT};
pub use upstream::{AgentUpstream, HttpUpstream};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::Router;
use serde::Serialize;

use policy_agent_core::{NormalizationReport, RecoveryOutcome};

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    pub upstream: Arc<dyn AgentUpstream>,
    pub stats: ForwarderStats,
}

impl AppState {
    pub fn new(config: ServerConfig, upstream: Arc<dyn AgentUpstream>) -> Self {
        Self {
            config,
            upstream,
            stats: ForwarderStats::default(),
        }
    }
}

/// Request counters for `/stats`
#[derive(Debug, Default)]
pub struct ForwarderStats {
    total: AtomicU64,
    forwarded: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
    direct: AtomicU64,
    lenient: AtomicU64,
    extracted: AtomicU64,
    fallback_text: AtomicU64,
    unwrapped: AtomicU64,
}

impl ForwarderStats {
    pub fn record_request(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Request refused before any upstream call
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Upstream call made but it failed
    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Upstream call succeeded and the response was normalized
    pub fn record_forwarded(&self, report: &NormalizationReport) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);

        let counter = match report.outcome {
            RecoveryOutcome::Direct => &self.direct,
            RecoveryOutcome::Lenient => &self.lenient,
            RecoveryOutcome::Extracted => &self.extracted,
            RecoveryOutcome::FallbackText => &self.fallback_text,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if report.unwrapped {
            self.unwrapped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_total: self.total.load(Ordering::Relaxed),
            requests_forwarded: self.forwarded.load(Ordering::Relaxed),
            requests_rejected: self.rejected.load(Ordering::Relaxed),
            requests_failed: self.failed.load(Ordering::Relaxed),
            outcomes: OutcomeCounts {
                direct: self.direct.load(Ordering::Relaxed),
                lenient: self.lenient.load(Ordering::Relaxed),
                extracted: self.extracted.load(Ordering::Relaxed),
                fallback_text: self.fallback_text.load(Ordering::Relaxed),
                unwrapped: self.unwrapped.load(Ordering::Relaxed),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub requests_total: u64,
    pub requests_forwarded: u64,
    pub requests_rejected: u64,
    pub requests_failed: u64,
    pub outcomes: OutcomeCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeCounts {
    pub direct: u64,
    pub lenient: u64,
    pub extracted: u64,
    pub fallback_text: u64,
    pub unwrapped: u64,
}

/// Policy Agent HTTP Server
///
/// # Example
///
/// ```rust,ignore
/// use policy_agent_server::{AgentServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let config = ServerConfig::builder()
///         .port(8420)
///         .api_key("...")
///         .build();
///
///     let server = AgentServer::new(config);
///     server.run().await.unwrap();
/// }
/// ```
pub struct AgentServer {
    state: Arc<AppState>,
}

impl AgentServer {
    /// Create a server forwarding to the configured agent service endpoint
    pub fn new(config: ServerConfig) -> Self {
        let upstream = Arc::new(HttpUpstream::new(config.upstream_url.clone()));
        Self::with_upstream(config, upstream)
    }

    /// Create a server around any upstream implementation
    pub fn with_upstream(config: ServerConfig, upstream: Arc<dyn AgentUpstream>) -> Self {
        Self {
            state: Arc::new(AppState::new(config, upstream)),
        }
    }

    /// Build the Axum router with all routes
    pub fn router(&self) -> Router {
        routes::create_router(Arc::clone(&self.state))
    }

    /// Get the socket address for the server
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.state.config.port))
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Run the server
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = self.addr();

        if self.state.config.api_key.is_none() {
            tracing::warn!(
                "{} is not set; agent requests will fail until it is configured",
                policy_agent_core::CREDENTIAL_VAR
            );
        }

        tracing::info!("Policy Agent Server listening on http://{}", addr);
        tracing::info!("Upstream: {} ({})", self.state.config.upstream_url, self.state.upstream.name());
        tracing::info!("Endpoints:");
        tracing::info!("  POST    /api/agent  - Forward a chat request to the agent service");
        tracing::info!("  OPTIONS /api/agent  - CORS preflight");
        tracing::info!("  GET     /health     - Health check");
        tracing::info!("  GET     /stats      - Forwarding statistics");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
