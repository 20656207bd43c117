//! Slack Events API endpoint.
//!
//! Verifies the request signature, answers URL verification inline, drops
//! duplicate deliveries and hands everything else to the Event Router on a
//! background task so Slack gets its 200 within the retry deadline.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use chrono::Utc;

use crate::domains::slack::events::{parse_envelope, InboundEvent};
use crate::domains::slack::router::dispatch;
use crate::kernel::signature::verify_slack_request;
use crate::server::app::AxumAppState;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Build the axum router for the Slack endpoint.
pub fn router(state: AxumAppState) -> Router {
    Router::new()
        .route("/slack/events", post(handle_slack_events))
        .with_state(state)
}

async fn handle_slack_events(
    State(state): State<AxumAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Err(e) = verify_slack_request(
        &state.slack_signing_secret,
        header_str(TIMESTAMP_HEADER),
        header_str(SIGNATURE_HEADER),
        &body,
        Utc::now().timestamp(),
    ) {
        tracing::warn!(error = %e, "Rejected Slack request");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let envelope = match parse_envelope(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable Slack envelope");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if let InboundEvent::UrlVerification { challenge } = envelope.event {
        tracing::info!("Responding to URL verification challenge");
        return ([(header::CONTENT_TYPE, "text/plain")], challenge).into_response();
    }

    if let Some(key) = &envelope.key {
        if let Err(e) = state.deps.seen_events.claim(&key.cache_key()).await {
            tracing::info!(reason = %e, "Skipping Slack delivery");
            return StatusCode::OK.into_response();
        }
    }

    // Runs to completion even if Slack drops the connection
    let deps = state.deps.clone();
    tokio::spawn(async move {
        if let Err(e) = dispatch(&deps, envelope.event).await {
            tracing::error!(error = %e, "Failed to process Slack event");
        }
    });

    StatusCode::OK.into_response()
}
