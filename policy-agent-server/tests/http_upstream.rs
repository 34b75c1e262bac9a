//! HttpUpstream tests against a local axum listener

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use policy_agent_core::{AgentError, UpstreamPayload};
use policy_agent_server::upstream::API_KEY_HEADER;
use policy_agent_server::{AgentUpstream, HttpUpstream};

/// Serve `app` on an ephemeral port and return its chat URL
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v3/inference/chat/", addr)
}

fn payload() -> UpstreamPayload {
    UpstreamPayload {
        user_id: "u-1".to_string(),
        agent_id: "agent-1".to_string(),
        session_id: "s-1".to_string(),
        message: "Draft a leave policy".to_string(),
        assets: None,
    }
}

/// Echo back the credential header and the body that arrived
async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({"response": "ok", "key": key, "received": body}))
}

#[tokio::test]
async fn test_posts_payload_with_credential() {
    let url = spawn(Router::new().route("/v3/inference/chat/", post(echo))).await;
    let upstream = HttpUpstream::new(url);

    let body = upstream.chat(&payload(), "secret-key").await.unwrap();

    assert_eq!(body["response"], "ok");
    assert_eq!(body["key"], "secret-key");
    assert_eq!(
        body["received"],
        json!({
            "user_id": "u-1",
            "agent_id": "agent-1",
            "session_id": "s-1",
            "message": "Draft a leave policy"
        })
    );
}

#[tokio::test]
async fn test_assets_sent_when_present() {
    let url = spawn(Router::new().route("/v3/inference/chat/", post(echo))).await;
    let upstream = HttpUpstream::new(url);

    let mut with_assets = payload();
    with_assets.assets = Some(vec!["asset-1".to_string()]);
    let body = upstream.chat(&with_assets, "k").await.unwrap();

    assert_eq!(body["received"]["assets"], json!(["asset-1"]));
}

#[tokio::test]
async fn test_non_success_status_carries_body() {
    let app = Router::new().route(
        "/v3/inference/chat/",
        post(|| async { (StatusCode::FORBIDDEN, "{\"detail\":\"bad key\"}") }),
    );
    let upstream = HttpUpstream::new(spawn(app).await);

    let err = upstream.chat(&payload(), "k").await.unwrap_err();
    match err {
        AgentError::UpstreamStatus { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "{\"detail\":\"bad key\"}");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_body_is_upstream_body_error() {
    let app = Router::new().route("/v3/inference/chat/", post(|| async { "plain text" }));
    let upstream = HttpUpstream::new(spawn(app).await);

    let err = upstream.chat(&payload(), "k").await.unwrap_err();
    assert!(matches!(err, AgentError::UpstreamBody { .. }));
    assert_eq!(err.http_status_code(), 502);
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let upstream = HttpUpstream::new(format!("http://{}/chat", addr));
    let err = upstream.chat(&payload(), "k").await.unwrap_err();

    assert!(matches!(err, AgentError::UpstreamTransport { .. }));
    assert_eq!(err.error_code(), "UPSTREAM_TRANSPORT");
}
