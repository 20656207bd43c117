//! Message id to draft batch mapping.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::common::{PipelineError, PipelineResult, PostId};

/// Remembers which drafts a generated message presented, in the order they
/// were numbered. Entries are written once and never updated; they leave
/// only through the capacity or TTL bound.
#[derive(Clone)]
pub struct DraftCorrelationCache {
    batches: Cache<String, Arc<Vec<PostId>>>,
}

impl DraftCorrelationCache {
    pub fn new(max_capacity: u64, time_to_live: Duration) -> Self {
        let batches = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(time_to_live)
            .build();
        Self { batches }
    }

    pub async fn store(&self, message_id: &str, post_ids: Vec<PostId>) {
        self.batches
            .insert(message_id.to_string(), Arc::new(post_ids))
            .await;
    }

    pub async fn lookup(&self, message_id: &str) -> Option<Vec<PostId>> {
        self.batches
            .get(message_id)
            .await
            .map(|ids| ids.as_ref().clone())
    }

    /// Like [`lookup`](Self::lookup), with a miss as `UnknownCorrelation`.
    pub async fn batch(&self, message_id: &str) -> PipelineResult<Vec<PostId>> {
        self.lookup(message_id)
            .await
            .ok_or_else(|| PipelineError::UnknownCorrelation(message_id.to_string()))
    }
}
