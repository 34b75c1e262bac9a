//! Agent chat route

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde_json::Value;

use policy_agent_core::response::value_kind;
use policy_agent_core::{AgentError, AgentRequest, AgentResponse, CREDENTIAL_VAR};

use crate::AppState;

/// Path of the agent chat endpoint
pub const AGENT_PATH: &str = "/api/agent";

/// Longest normalized summary written to the debug log
const LOG_SUMMARY_CHARS: usize = 300;

/// Error returned from the agent route
///
/// Serializes as the `{success: false, error, details?, code}` envelope with
/// the status code of the wrapped error.
#[derive(Debug)]
pub struct ApiError(pub AgentError);

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, Json(self.0.to_envelope())).into_response()
    }
}

/// CORS preflight for the agent endpoint
pub async fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
        .into_response()
}

/// Forward one chat request to the agent service
pub async fn forward_chat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    state.stats.record_request();
    let request_id = uuid::Uuid::new_v4().to_string();

    let mut response = match handle_chat(&state, &request_id, &body).await {
        Ok(envelope) => Json(envelope).into_response(),
        Err(err) => {
            tracing::debug!(
                request_id = %request_id,
                code = err.0.error_code(),
                "agent request failed"
            );
            err.into_response()
        }
    };

    if state.config.cors_enabled {
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
    }
    response
}

async fn handle_chat(
    state: &AppState,
    request_id: &str,
    body: &[u8],
) -> Result<AgentResponse, ApiError> {
    let Some(api_key) = state.config.api_key.as_deref() else {
        state.stats.record_rejected();
        tracing::error!(request_id = %request_id, "{} not configured", CREDENTIAL_VAR);
        return Err(AgentError::MissingCredential {
            variable: CREDENTIAL_VAR.to_string(),
        }
        .into());
    };

    let now = Utc::now();
    let payload = AgentRequest::from_json(body)
        .and_then(|request| request.prepare(now))
        .inspect_err(|_| state.stats.record_rejected())?;

    tracing::info!(
        request_id = %request_id,
        agent_id = %payload.agent_id,
        session_id = %payload.session_id,
        has_assets = payload.assets.is_some(),
        "forwarding agent request"
    );

    let upstream_body = match state.upstream.chat(&payload, api_key).await {
        Ok(body) => body,
        Err(err) => {
            state.stats.record_failed();
            match &err {
                AgentError::UpstreamStatus { status, body } => tracing::warn!(
                    request_id = %request_id,
                    status = *status,
                    body = %body,
                    "agent service returned an error status"
                ),
                other => tracing::error!(
                    request_id = %request_id,
                    error = %other,
                    "agent service call failed"
                ),
            }
            return Err(err.into());
        }
    };

    let (envelope, report) =
        AgentResponse::from_upstream_body(&payload, &upstream_body, Utc::now());
    state.stats.record_forwarded(&report);

    tracing::info!(
        request_id = %request_id,
        raw_kind = value_kind(&envelope.raw_response),
        outcome = %report.outcome,
        unwrapped = report.unwrapped,
        "agent response normalized"
    );
    tracing::debug!(
        request_id = %request_id,
        has_result = envelope.result().is_some(),
        has_policy_draft = envelope
            .result()
            .and_then(|result| result.get("policy_draft"))
            .is_some(),
        summary = %summarize(&envelope.response),
        "normalized response shape"
    );

    Ok(envelope)
}

/// Compact text of a value cut to the log limit
fn summarize(value: &Value) -> String {
    let text = value.to_string();
    match text.char_indices().nth(LOG_SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}
