use thiserror::Error;

use crate::common::PostId;
use crate::domains::posts::models::PostStatus;

/// Failure taxonomy of the ingestion and approval/scheduling core.
///
/// None of these is fatal to the process. Batch operations log the error
/// for the affected item and keep going.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The inbound event was already processed. Handlers short-circuit on
    /// this instead of propagating it.
    #[error("Duplicate event: {0}")]
    DuplicateEvent(String),

    /// Reaction on a message that never carried drafts.
    #[error("No drafts tracked for message {0}")]
    UnknownCorrelation(String),

    #[error("Post {post_id} is {actual}, expected {expected}")]
    PreconditionFailed {
        post_id: PostId,
        expected: PostStatus,
        actual: PostStatus,
    },

    #[error("Post {0} not found")]
    NotFound(PostId),

    /// Store or transport call failed or timed out. Never retried here.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] anyhow::Error),

    /// Rejected before any state mutation; the message is shown to the user.
    #[error("{0}")]
    InvalidConfiguration(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
