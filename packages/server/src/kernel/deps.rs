//! Server dependencies for domain actions (using traits for testability)
//!
//! This module provides the central dependency container used by every
//! handler. All external services sit behind trait objects so tests can
//! swap in the in-memory versions from `test_dependencies`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::common::PipelineResult;
use crate::config::Config;
use crate::kernel::postgres::{PgBrainstormStore, PgPostStore, PgThoughtStore};
use crate::kernel::{
    timeout, BaseBrainstormStore, BaseChatTransport, BaseContentService, BasePostStore,
    BaseThoughtStore, DraftCorrelationCache, IdempotencyCache,
};

/// Server dependencies accessible to handlers
#[derive(Clone)]
pub struct ServerDeps {
    pub posts: Arc<dyn BasePostStore>,
    pub thoughts: Arc<dyn BaseThoughtStore>,
    pub brainstorms: Arc<dyn BaseBrainstormStore>,
    pub content: Arc<dyn BaseContentService>,
    pub chat: Arc<dyn BaseChatTransport>,
    /// Event keys already processed (Slack event ids, Linear issue keys)
    pub seen_events: IdempotencyCache,
    /// Generated message id -> drafts it presented
    pub drafts: DraftCorrelationCache,
    pub schedule_timezone: String,
    /// Upper bound on any single store or transport call
    pub call_timeout: Duration,
}

impl ServerDeps {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        posts: Arc<dyn BasePostStore>,
        thoughts: Arc<dyn BaseThoughtStore>,
        brainstorms: Arc<dyn BaseBrainstormStore>,
        content: Arc<dyn BaseContentService>,
        chat: Arc<dyn BaseChatTransport>,
        seen_events: IdempotencyCache,
        drafts: DraftCorrelationCache,
        schedule_timezone: String,
        call_timeout: Duration,
    ) -> Self {
        Self {
            posts,
            thoughts,
            brainstorms,
            content,
            chat,
            seen_events,
            drafts,
            schedule_timezone,
            call_timeout,
        }
    }

    /// Production wiring: Postgres stores plus the given collaborators,
    /// caches sized from config.
    pub fn from_config(
        pool: PgPool,
        content: Arc<dyn BaseContentService>,
        chat: Arc<dyn BaseChatTransport>,
        config: &Config,
    ) -> Self {
        Self::new(
            Arc::new(PgPostStore(pool.clone())),
            Arc::new(PgThoughtStore(pool.clone())),
            Arc::new(PgBrainstormStore(pool)),
            content,
            chat,
            IdempotencyCache::new(config.event_cache_capacity, config.event_cache_ttl),
            DraftCorrelationCache::new(config.draft_cache_capacity, config.draft_cache_ttl),
            config.schedule_timezone.clone(),
            config.external_call_timeout,
        )
    }

    /// Run a store or transport call under the configured deadline.
    pub async fn upstream<T, F>(&self, operation: &str, call: F) -> PipelineResult<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        timeout::upstream(self.call_timeout, operation, call).await
    }
}
