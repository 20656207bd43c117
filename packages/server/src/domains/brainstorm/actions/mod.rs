use tracing::{info, warn};

use crate::common::{PipelineError, PipelineResult};
use crate::domains::brainstorm::models::BrainstormSession;
use crate::kernel::ServerDeps;

/// Ask the content service to explore `topic` and keep the session. A
/// failed save is logged; the session is still returned for display.
pub async fn run_brainstorm(deps: &ServerDeps, topic: &str) -> PipelineResult<BrainstormSession> {
    info!(topic = %topic, "Starting brainstorm");

    let idea = deps
        .content
        .brainstorm(topic)
        .await
        .map_err(PipelineError::UpstreamUnavailable)?;

    let session = BrainstormSession::new(topic.to_string(), idea.exploration, idea.angles);

    if let Err(e) = deps
        .upstream("save brainstorm", deps.brainstorms.create(&session))
        .await
    {
        warn!(session_id = %session.id, error = %e, "Failed to save brainstorm");
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::TestDependencies;

    #[tokio::test]
    async fn session_is_persisted_in_progress() {
        let test = TestDependencies::new();
        let session = run_brainstorm(&test.server_deps(), "edge caching")
            .await
            .unwrap();

        assert_eq!(session.status, "in_progress");
        assert_eq!(session.content, "Exploring edge caching");
        assert_eq!(session.key_angles.len(), 2);
        assert_eq!(test.brainstorms.all().len(), 1);
    }
}
