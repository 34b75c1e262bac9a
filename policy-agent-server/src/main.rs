//! Policy Agent Server Binary
//!
//! HTTP gateway between the policy dashboard and the hosted agent service.
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults (port 8420)
//! LYZR_API_KEY=... policy-agent-server
//!
//! # Custom port and endpoint
//! AGENT_PORT=3000 AGENT_UPSTREAM_URL=http://localhost:9000/chat policy-agent-server
//!
//! # Without CORS headers
//! AGENT_CORS=false policy-agent-server
//! ```

use policy_agent_server::{AgentServer, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policy_agent_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    tracing::info!("Starting Policy Agent Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(?config, "loaded configuration");

    let server = AgentServer::new(config);
    server.run().await?;

    Ok(())
}
