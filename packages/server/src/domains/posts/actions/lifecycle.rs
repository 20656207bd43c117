//! Apply lifecycle events to stored posts.

use tracing::{debug, info};

use crate::common::{PipelineError, PipelineResult, PostId};
use crate::domains::posts::machines::{decide, LifecycleEvent, Transition};
use crate::domains::posts::models::{Post, TransitionOutcome};
use crate::kernel::ServerDeps;

/// Move `post_id` through `event`. The store applies the write only while
/// the post is still in the event's source state.
pub async fn apply(deps: &ServerDeps, post_id: PostId, event: LifecycleEvent) -> PipelineResult<Post> {
    let post = apply_transition(deps, post_id, &event.transition()).await?;
    info!(post_id = %post_id, event = event.name(), status = %post.status, "Post transitioned");
    Ok(post)
}

/// Read the post first and reject an event that does not fit its current
/// status without touching the store. The write is still conditional.
pub async fn load_and_apply(
    deps: &ServerDeps,
    post_id: PostId,
    event: LifecycleEvent,
) -> PipelineResult<Post> {
    let post = deps
        .upstream("fetch post", deps.posts.find_by_id(post_id))
        .await?
        .ok_or(PipelineError::NotFound(post_id))?;

    let transition = decide(&post, event)?;
    let post = apply_transition(deps, post_id, &transition).await?;
    info!(post_id = %post_id, event = event.name(), status = %post.status, "Post transitioned");
    Ok(post)
}

pub(crate) async fn apply_transition(
    deps: &ServerDeps,
    post_id: PostId,
    transition: &Transition,
) -> PipelineResult<Post> {
    let outcome = deps
        .upstream("post transition", deps.posts.transition(post_id, transition))
        .await?;

    match outcome {
        TransitionOutcome::Applied(post) => Ok(post),
        TransitionOutcome::Conflict(actual) => {
            debug!(post_id = %post_id, expected = %transition.from, actual = %actual, "Transition lost to concurrent writer or stale state");
            Err(PipelineError::PreconditionFailed {
                post_id,
                expected: transition.from,
                actual,
            })
        }
        TransitionOutcome::Missing => Err(PipelineError::NotFound(post_id)),
    }
}
