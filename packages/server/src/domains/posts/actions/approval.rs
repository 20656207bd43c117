//! Approval Resolver - turns a reaction on a generated message into
//! lifecycle transitions on the drafts that message presented.

use tracing::{info, warn};

use crate::common::PostId;
use crate::domains::posts::actions::lifecycle;
use crate::domains::posts::machines::LifecycleEvent;
use crate::kernel::ServerDeps;

/// What a reaction asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionAction {
    ApproveAll,
    RejectAll,
    /// 1-based variation number
    ApproveVariation(usize),
    /// Same transitions as approve-all, different confirmation
    MarkForScheduling,
}

impl ReactionAction {
    /// Accepts Slack short names and the literal emoji.
    pub fn from_reaction(reaction: &str) -> Option<Self> {
        match reaction {
            "white_check_mark" | "heavy_check_mark" | "✅" => Some(Self::ApproveAll),
            "x" | "❌" => Some(Self::RejectAll),
            "one" | "1️⃣" => Some(Self::ApproveVariation(1)),
            "two" | "2️⃣" => Some(Self::ApproveVariation(2)),
            "three" | "3️⃣" => Some(Self::ApproveVariation(3)),
            "calendar" | "📅" => Some(Self::MarkForScheduling),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No draft batch is correlated with the reacted message
    UntrackedMessage,
    UnknownReaction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Ignored(IgnoreReason),
    InvalidVariation { requested: usize, available: usize },
    Applied {
        action: ReactionAction,
        /// Successful transitions across the batch
        transitioned: usize,
    },
}

impl Resolution {
    /// Confirmation posted back into the channel, if any.
    pub fn confirmation(&self) -> Option<String> {
        match self {
            Resolution::Ignored(_) => None,
            Resolution::InvalidVariation { .. } => Some("❌ Invalid variation number".to_string()),
            Resolution::Applied {
                action,
                transitioned,
            } => Some(match action {
                ReactionAction::ApproveAll => format!(
                    "✅ Approved {} draft(s)! They're ready for scheduling.\n\nUse `@Ghostwriter schedule` to schedule them for posting.",
                    transitioned
                ),
                ReactionAction::RejectAll => format!(
                    "❌ Rejected {} draft(s). Generate new ones with `@Ghostwriter generate`",
                    transitioned
                ),
                ReactionAction::ApproveVariation(n) if *transitioned > 0 => format!(
                    "✅ Approved Variation {}! Ready for scheduling.\n\nUse `@Ghostwriter schedule` to schedule it.",
                    n
                ),
                ReactionAction::ApproveVariation(n) => {
                    format!("⚠️ Variation {} could not be approved.", n)
                }
                ReactionAction::MarkForScheduling => format!(
                    "📅 Marked {} draft(s) for scheduling. Use `@Ghostwriter schedule` to set posting times.",
                    transitioned
                ),
            }),
        }
    }
}

/// Resolve a reaction on `message_id`. Per-post failures are logged and
/// skipped; they only lower the returned count.
pub async fn resolve(deps: &ServerDeps, message_id: &str, reaction: &str) -> Resolution {
    let post_ids = match deps.drafts.batch(message_id).await {
        Ok(ids) => ids,
        Err(e) => {
            info!(reaction = %reaction, reason = %e, "Ignoring reaction");
            return Resolution::Ignored(IgnoreReason::UntrackedMessage);
        }
    };

    let Some(action) = ReactionAction::from_reaction(reaction) else {
        info!(reaction = %reaction, "Ignoring unrecognised reaction");
        return Resolution::Ignored(IgnoreReason::UnknownReaction);
    };

    info!(message_id = %message_id, ?action, drafts = post_ids.len(), "Resolving reaction");

    let transitioned = match action {
        ReactionAction::ApproveAll | ReactionAction::MarkForScheduling => {
            apply_all(deps, &post_ids, LifecycleEvent::Approve).await
        }
        ReactionAction::RejectAll => apply_all(deps, &post_ids, LifecycleEvent::Reject).await,
        ReactionAction::ApproveVariation(n) => {
            if n == 0 || n > post_ids.len() {
                return Resolution::InvalidVariation {
                    requested: n,
                    available: post_ids.len(),
                };
            }
            approve_one(deps, &post_ids, n - 1).await
        }
    };

    Resolution::Applied {
        action,
        transitioned,
    }
}

async fn apply_all(deps: &ServerDeps, post_ids: &[PostId], event: LifecycleEvent) -> usize {
    let mut count = 0;
    for &post_id in post_ids {
        match lifecycle::apply(deps, post_id, event).await {
            Ok(_) => count += 1,
            Err(e) => warn!(post_id = %post_id, event = event.name(), error = %e, "Skipping draft"),
        }
    }
    count
}

/// Approve the chosen draft; the rest of the batch is rejected only once
/// that approval has landed.
async fn approve_one(deps: &ServerDeps, post_ids: &[PostId], index: usize) -> usize {
    let chosen = post_ids[index];
    if let Err(e) = lifecycle::apply(deps, chosen, LifecycleEvent::Approve).await {
        warn!(post_id = %chosen, error = %e, "Selected variation not approved, leaving batch untouched");
        return 0;
    }

    let others: Vec<PostId> = post_ids
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, id)| *id)
        .collect();

    1 + apply_all(deps, &others, LifecycleEvent::Reject).await
}
