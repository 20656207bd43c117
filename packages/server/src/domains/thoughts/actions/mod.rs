//! Thought capture and statistics.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::common::PipelineResult;
use crate::domains::thoughts::models::{Thought, ThoughtSource};
use crate::kernel::{Categorization, ServerDeps};

/// Categorize and persist a thought. A failed categorization keeps the
/// thought with `fallback` labels instead of dropping it.
pub async fn capture_thought(
    deps: &ServerDeps,
    content: &str,
    source: ThoughtSource,
    fallback: Categorization,
) -> PipelineResult<Thought> {
    let mut thought = Thought::new(content.to_string(), source);

    let labels = match deps.content.categorize(content).await {
        Ok(labels) => labels,
        Err(e) => {
            warn!(error = %e, source = %source, "Categorization failed, using fallback");
            fallback
        }
    };
    thought.category = labels.category;
    thought.topic_tags = labels.tags;

    deps.upstream("save thought", deps.thoughts.create(&thought))
        .await?;

    info!(thought_id = %thought.id, category = %thought.category, tags = ?thought.topic_tags, "Captured thought");
    Ok(thought)
}

/// Categorization used when the chat categorizer is unavailable
pub fn chat_fallback() -> Categorization {
    Categorization {
        category: "uncategorized".to_string(),
        tags: vec!["general".to_string()],
        readiness: "needs_brainstorm".to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ThoughtStats {
    pub total: i64,
    pub by_category: BTreeMap<String, usize>,
    /// Newest first, at most three
    pub recent: Vec<Thought>,
}

pub async fn thought_stats(deps: &ServerDeps) -> PipelineResult<ThoughtStats> {
    let total = deps.upstream("count thoughts", deps.thoughts.count()).await?;
    let thoughts = deps
        .upstream("fetch thoughts", deps.thoughts.find_all())
        .await?;

    let mut by_category = BTreeMap::new();
    for thought in &thoughts {
        *by_category.entry(thought.category.clone()).or_insert(0) += 1;
    }

    Ok(ThoughtStats {
        total,
        by_category,
        recent: thoughts.into_iter().take(3).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockContentService;
    use crate::kernel::TestDependencies;

    #[tokio::test]
    async fn categorized_thought_is_saved() {
        let test = TestDependencies::new()
            .with_content(MockContentService::new().with_category("learning"));

        let thought = capture_thought(
            &test.server_deps(),
            "TIL moka has an entry API",
            ThoughtSource::Slack,
            chat_fallback(),
        )
        .await
        .unwrap();

        assert_eq!(thought.category, "learning");
        assert_eq!(thought.status, "raw");
        assert_eq!(test.thoughts.all().len(), 1);
    }

    #[tokio::test]
    async fn categorizer_failure_uses_fallback() {
        let test =
            TestDependencies::new().with_content(MockContentService::new().failing_categorize());

        let thought = capture_thought(
            &test.server_deps(),
            "half an idea",
            ThoughtSource::Slack,
            chat_fallback(),
        )
        .await
        .unwrap();

        assert_eq!(thought.category, "uncategorized");
        assert_eq!(thought.topic_tags, vec!["general"]);
        assert_eq!(test.thoughts.all().len(), 1);
    }

    #[tokio::test]
    async fn stats_group_by_category() {
        let test = TestDependencies::new();
        test.seed_thought("a", "technical");
        test.seed_thought("b", "technical");
        test.seed_thought("c", "business");
        test.seed_thought("d", "personal");

        let stats = thought_stats(&test.server_deps()).await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_category.get("technical"), Some(&2));
        assert_eq!(stats.by_category.get("business"), Some(&1));
        assert_eq!(stats.recent.len(), 3);
    }
}
