//! Processed-event set for inbound webhook deliveries.

use std::time::Duration;

use moka::future::Cache;

use crate::common::{PipelineError, PipelineResult};

/// Bounded, time-evicting set of event keys that have already been
/// processed. Eviction makes dedup best-effort: a key can be reprocessed
/// once it has aged out or been pushed out by capacity.
#[derive(Clone)]
pub struct IdempotencyCache {
    seen: Cache<String, ()>,
}

impl IdempotencyCache {
    pub fn new(max_capacity: u64, time_to_live: Duration) -> Self {
        let seen = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(time_to_live)
            .build();
        Self { seen }
    }

    pub fn has_seen(&self, key: &str) -> bool {
        self.seen.contains_key(key)
    }

    pub async fn mark_seen(&self, key: &str) {
        self.seen.insert(key.to_string(), ()).await;
    }

    /// Marks `key` and reports whether this caller was the first to do so.
    /// Exactly one of any number of concurrent callers gets `true`.
    pub async fn check_and_mark(&self, key: &str) -> bool {
        self.seen
            .entry(key.to_string())
            .or_insert(())
            .await
            .is_fresh()
    }

    /// [`check_and_mark`](Self::check_and_mark) for handlers that stop on
    /// a repeat: `DuplicateEvent` when the key was already processed.
    pub async fn claim(&self, key: &str) -> PipelineResult<()> {
        if self.check_and_mark(key).await {
            Ok(())
        } else {
            Err(PipelineError::DuplicateEvent(key.to_string()))
        }
    }

    #[cfg(test)]
    async fn len(&self) -> u64 {
        self.seen.run_pending_tasks().await;
        self.seen.entry_count()
    }
}
