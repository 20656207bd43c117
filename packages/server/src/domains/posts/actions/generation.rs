//! Draft generation from captured thoughts.

use tracing::{info, warn};

use crate::common::{PipelineError, PipelineResult, PostId};
use crate::domains::posts::models::Post;
use crate::domains::thoughts::models::{Thought, THOUGHT_STATUS_RAW};
use crate::kernel::ServerDeps;

/// Most recent thoughts fed into one generation
pub const MAX_SOURCE_THOUGHTS: usize = 3;

const DEFAULT_POST_TYPE: &str = "insight";
const DEFAULT_TONE: &str = "professional";
const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone)]
pub struct GeneratedDrafts {
    pub source_count: usize,
    /// Saved drafts, in variation order
    pub drafts: Vec<Post>,
}

impl GeneratedDrafts {
    pub fn post_ids(&self) -> Vec<PostId> {
        self.drafts.iter().map(|p| p.id).collect()
    }

    /// Numbering matches the ids stored for the approval reactions.
    pub fn summary_message(&self) -> String {
        let mut message = String::from("🎯 *Generated LinkedIn Post Drafts*\n\n");
        message.push_str(&format!(
            "_Based on {} recent thought(s)_\n\n",
            self.source_count
        ));

        for (i, draft) in self.drafts.iter().enumerate() {
            message.push_str(DIVIDER);
            message.push('\n');
            message.push_str(&format!("*Variation {}:*\n\n{}\n\n", i + 1, draft.content));
        }

        message.push_str(DIVIDER);
        message.push_str("\n\n💡 *React to approve:*\n");
        message.push_str("• ✅ to approve all drafts\n");
        message.push_str("• 1️⃣ 2️⃣ 3️⃣ to keep one variation and reject the rest\n");
        message.push_str("• ❌ to reject all drafts\n");
        message.push_str("• 📅 to mark for scheduling\n\n");
        message.push_str("_Or use: `@Ghostwriter schedule`_");
        message
    }
}

/// Draft post variations from the newest thoughts of `category` (all raw
/// thoughts when `None` or `"all"`). `Ok(None)` when there is nothing to
/// draft from.
pub async fn generate_drafts(
    deps: &ServerDeps,
    category: Option<&str>,
) -> PipelineResult<Option<GeneratedDrafts>> {
    let thoughts: Vec<Thought> = match category {
        Some(category) if category != "all" => {
            deps.upstream(
                "fetch thoughts by category",
                deps.thoughts.find_by_category(category),
            )
            .await?
        }
        _ => {
            deps.upstream(
                "fetch raw thoughts",
                deps.thoughts.find_by_status(THOUGHT_STATUS_RAW),
            )
            .await?
        }
    };

    if thoughts.is_empty() {
        return Ok(None);
    }

    let selected: Vec<Thought> = thoughts.into_iter().take(MAX_SOURCE_THOUGHTS).collect();
    let contents: Vec<String> = selected.iter().map(|t| t.content.clone()).collect();
    let thought_ids: Vec<_> = selected.iter().map(|t| t.id).collect();

    info!(category = ?category, thoughts = selected.len(), "Generating drafts");

    // Model calls run under the client's own (longer) timeout
    let variations = deps
        .content
        .generate_variations(&contents)
        .await
        .map_err(PipelineError::UpstreamUnavailable)?;

    let mut drafts = Vec::with_capacity(variations.len());
    for (i, variation) in variations.into_iter().enumerate() {
        let post = Post::new_draft(variation, thought_ids.clone(), DEFAULT_POST_TYPE, DEFAULT_TONE);
        match deps.upstream("save draft", deps.posts.create(&post)).await {
            Ok(()) => drafts.push(post),
            Err(e) => warn!(variation = i + 1, error = %e, "Failed to save draft"),
        }
    }

    Ok(Some(GeneratedDrafts {
        source_count: selected.len(),
        drafts,
    }))
}

/// Send the drafts summary to `channel` and remember which drafts that
/// message carries so reactions on it can be resolved.
pub async fn announce_drafts(
    deps: &ServerDeps,
    channel: &str,
    generated: &GeneratedDrafts,
) -> PipelineResult<String> {
    let message_id = deps
        .upstream(
            "send drafts message",
            deps.chat.send_message(channel, &generated.summary_message()),
        )
        .await?;

    deps.drafts.store(&message_id, generated.post_ids()).await;
    info!(message_id = %message_id, drafts = generated.drafts.len(), "Tracking drafts message");
    Ok(message_id)
}
