//! Linear webhook: completed issues become thoughts.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use crate::common::PipelineResult;
use crate::domains::thoughts::actions::capture_thought;
use crate::domains::thoughts::models::{Thought, ThoughtSource};
use crate::kernel::signature::verify_linear_payload;
use crate::kernel::{Categorization, ServerDeps};
use crate::server::app::AxumAppState;

pub const SIGNATURE_HEADER: &str = "linear-signature";

/// Linear webhook payload.
/// See: https://developers.linear.app/docs/graphql/webhooks
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub action: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueData {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: IssueState,
    #[serde(default)]
    pub team: Team,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueState {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub name: String,
}

impl IssueData {
    pub fn dedup_key(&self) -> String {
        format!("linear:issue:{}", self.id)
    }

    pub fn thought_content(&self) -> String {
        let mut content = format!("Completed: {}", self.title);
        if let Some(description) = self.description.as_deref().filter(|d| !d.trim().is_empty()) {
            content.push_str(&format!("\n\nDetails: {}", description));
        }
        content
    }

    fn fallback(&self) -> Categorization {
        Categorization {
            category: "product_update".to_string(),
            tags: vec!["development".to_string(), self.team.name.clone()],
            readiness: "needs_brainstorm".to_string(),
        }
    }
}

/// What a delivery amounts to once parsed
#[derive(Debug)]
pub enum Delivery {
    CompletedIssue(IssueData),
    Ignored,
}

pub fn classify(payload: WebhookPayload) -> Result<Delivery, serde_json::Error> {
    if payload.kind != "Issue" || payload.action != "update" {
        return Ok(Delivery::Ignored);
    }
    let issue: IssueData = serde_json::from_value(payload.data)?;
    if issue.state.kind != "completed" {
        return Ok(Delivery::Ignored);
    }
    Ok(Delivery::CompletedIssue(issue))
}

/// Build the axum router for the Linear endpoint.
pub fn router(state: AxumAppState) -> Router {
    Router::new()
        .route("/linear/webhook", post(handle_linear_webhook))
        .with_state(state)
}

/// Returns 200 for anything that parses, whether or not it was processed.
async fn handle_linear_webhook(
    State(state): State<AxumAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(secret) = &state.linear_webhook_secret {
        let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        if let Err(e) = verify_linear_payload(secret, signature, &body) {
            tracing::warn!(error = %e, "Rejected Linear webhook");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let delivery = match serde_json::from_slice::<WebhookPayload>(&body).and_then(classify) {
        Ok(delivery) => delivery,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse Linear webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    let Delivery::CompletedIssue(issue) = delivery else {
        return StatusCode::OK;
    };

    if let Err(e) = state.deps.seen_events.claim(&issue.dedup_key()).await {
        tracing::info!(issue_id = %issue.id, reason = %e, "Skipping Linear delivery");
        return StatusCode::OK;
    }

    tracing::info!(issue_id = %issue.id, title = %issue.title, "Issue completed");

    if let Err(e) = ingest_completed_issue(&state.deps, &issue).await {
        tracing::error!(issue_id = %issue.id, error = %e, "Failed to create thought from issue");
    }

    StatusCode::OK
}

pub async fn ingest_completed_issue(deps: &ServerDeps, issue: &IssueData) -> PipelineResult<Thought> {
    capture_thought(
        deps,
        &issue.thought_content(),
        ThoughtSource::Linear,
        issue.fallback(),
    )
    .await
}
