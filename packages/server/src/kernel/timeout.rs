//! Deadline wrapper for store and transport calls.

use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;

use crate::common::{PipelineError, PipelineResult};

/// Await `call` for at most `limit`. Both a failed call and an elapsed
/// deadline come back as `UpstreamUnavailable`.
pub async fn upstream<T, F>(limit: Duration, operation: &str, call: F) -> PipelineResult<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(PipelineError::UpstreamUnavailable(
            e.context(format!("{} failed", operation)),
        )),
        Err(_) => Err(PipelineError::UpstreamUnavailable(anyhow!(
            "{} timed out after {:?}",
            operation,
            limit
        ))),
    }
}
