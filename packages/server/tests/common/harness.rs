//! Test harness driving the full axum app over in-memory dependencies.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so no socket is bound.
//! Slack dispatch runs on a spawned task; use [`TestHarness::wait_for_messages`]
//! before asserting on anything it produces.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;

use ghostwriter_core::kernel::signature::{sign_linear_payload, sign_slack_request};
use ghostwriter_core::kernel::TestDependencies;
use ghostwriter_core::server::app::{build_app, AxumAppState};

pub const SLACK_SECRET: &str = "test-slack-signing-secret";
pub const LINEAR_SECRET: &str = "test-linear-secret";

/// Status and body of a completed request
pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

pub struct TestHarness {
    pub deps: TestDependencies,
    app: Router,
}

impl TestHarness {
    /// Harness with Linear signature checks disabled
    pub fn new() -> Self {
        Self::with_deps(TestDependencies::new(), None)
    }

    /// Harness that requires signed Linear deliveries
    pub fn with_linear_secret() -> Self {
        Self::with_deps(TestDependencies::new(), Some(LINEAR_SECRET.to_string()))
    }

    pub fn with_deps(deps: TestDependencies, linear_secret: Option<String>) -> Self {
        init_tracing();
        let state = AxumAppState::new(deps.server_deps(), SLACK_SECRET.to_string(), linear_secret);
        Self {
            deps,
            app: build_app(state),
        }
    }

    /// POST a body to the Slack endpoint with a valid signature
    pub async fn slack(&self, body: &str) -> TestResponse {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_slack_request(SLACK_SECRET, &timestamp, body.as_bytes());
        self.slack_with_headers(body, &timestamp, &signature).await
    }

    pub async fn slack_with_headers(
        &self,
        body: &str,
        timestamp: &str,
        signature: &str,
    ) -> TestResponse {
        let request = Request::post("/slack/events")
            .header("content-type", "application/json")
            .header("x-slack-request-timestamp", timestamp)
            .header("x-slack-signature", signature)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// POST to the Linear endpoint, signed with the test secret
    pub async fn linear(&self, body: &str) -> TestResponse {
        let signature = sign_linear_payload(LINEAR_SECRET, body.as_bytes());
        self.linear_with_signature(body, Some(&signature)).await
    }

    pub async fn linear_with_signature(&self, body: &str, signature: Option<&str>) -> TestResponse {
        let mut request = Request::post("/linear/webhook").header("content-type", "application/json");
        if let Some(signature) = signature {
            request = request.header("linear-signature", signature);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Wait until at least `count` chat messages were sent, or give up after
    /// two seconds and return whatever is there.
    pub async fn wait_for_messages(&self, count: usize) -> Vec<String> {
        for _ in 0..200 {
            let sent = self.deps.chat.messages();
            if sent.len() >= count {
                return sent.into_iter().map(|m| m.text).collect();
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.deps
            .chat
            .messages()
            .into_iter()
            .map(|m| m.text)
            .collect()
    }

    /// Give spawned work a moment when asserting that nothing happened.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

// Respects RUST_LOG. Run tests with: RUST_LOG=debug cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
