//! Application setup and server configuration.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::domains::{linear, slack};
use crate::kernel::ServerDeps;
use crate::server::routes::health_handler;

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: Arc<ServerDeps>,
    pub slack_signing_secret: String,
    /// Linear deliveries are verified only when this is set
    pub linear_webhook_secret: Option<String>,
}

impl AxumAppState {
    pub fn new(
        deps: ServerDeps,
        slack_signing_secret: String,
        linear_webhook_secret: Option<String>,
    ) -> Self {
        Self {
            deps: Arc::new(deps),
            slack_signing_secret,
            linear_webhook_secret,
        }
    }
}

/// Build the Axum application router
pub fn build_app(state: AxumAppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(slack::webhook::router(state.clone()))
        .merge(linear::webhook::router(state))
        .layer(TraceLayer::new_for_http())
}
