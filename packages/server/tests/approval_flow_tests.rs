//! Drafts generated through a mention, then approved with reactions on
//! the bot's summary message.

mod common;

use axum::http::StatusCode;

use crate::common::*;
use ghostwriter_core::domains::posts::PostStatus;

/// Seed thoughts, run `@Ghostwriter generate` and return the summary
/// message id the reactions target.
async fn generate(harness: &TestHarness) -> String {
    harness.deps.seed_thought("Moved the event cache to moka", "technical");
    harness.deps.seed_thought("Reaction-based approvals are fun", "technical");

    let response = harness.slack(&mention_event("EvGen", "generate")).await;
    assert_eq!(response.status, StatusCode::OK);

    // progress note, then the summary
    let sent = harness.wait_for_messages(2).await;
    assert_eq!(sent.len(), 2);
    assert!(sent[1].starts_with("🎯 *Generated LinkedIn Post Drafts*"));
    harness.deps.chat.messages()[1].ts.clone()
}

#[tokio::test]
async fn generate_creates_three_tracked_drafts() {
    let harness = TestHarness::new();
    generate(&harness).await;

    let drafts = harness.deps.posts.with_status(PostStatus::Draft);
    assert_eq!(drafts.len(), 3);
    assert_eq!(drafts[0].content, "Variation one");

    let calls = harness.deps.content.generate_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 2);
}

#[tokio::test]
async fn numbered_reaction_keeps_one_variation() {
    let harness = TestHarness::new();
    let message_ts = generate(&harness).await;

    harness
        .slack(&reaction_event("EvReact", "two", &message_ts))
        .await;

    let sent = harness.wait_for_messages(3).await;
    assert!(sent[2].starts_with("✅ Approved Variation 2!"));

    let posts = harness.deps.posts.all();
    let statuses: Vec<_> = posts.iter().map(|p| p.status).collect();
    assert_eq!(
        statuses,
        vec![PostStatus::Rejected, PostStatus::Approved, PostStatus::Rejected]
    );
}

#[tokio::test]
async fn check_mark_approves_all_drafts() {
    let harness = TestHarness::new();
    let message_ts = generate(&harness).await;

    harness
        .slack(&reaction_event("EvReact", "white_check_mark", &message_ts))
        .await;

    let sent = harness.wait_for_messages(3).await;
    assert!(sent[2].starts_with("✅ Approved 3 draft(s)!"));
    assert_eq!(harness.deps.posts.with_status(PostStatus::Approved).len(), 3);
}

#[tokio::test]
async fn reaction_on_untracked_message_is_silent() {
    let harness = TestHarness::new();
    generate(&harness).await;

    harness
        .slack(&reaction_event("EvReact", "white_check_mark", "1699999999.000001"))
        .await;

    harness.settle().await;
    assert_eq!(harness.deps.chat.messages().len(), 2);
    assert_eq!(harness.deps.posts.with_status(PostStatus::Draft).len(), 3);
}

#[tokio::test]
async fn out_of_range_variation_reports_and_changes_nothing() {
    let harness = TestHarness::with_deps(
        TestDependencies::new().with_content(
            MockContentService::new().with_variations(vec!["Only one", "Only two"]),
        ),
        None,
    );
    let message_ts = generate(&harness).await;

    harness
        .slack(&reaction_event("EvReact", "three", &message_ts))
        .await;

    let sent = harness.wait_for_messages(3).await;
    assert_eq!(sent[2], "❌ Invalid variation number");
    assert_eq!(harness.deps.posts.with_status(PostStatus::Draft).len(), 2);
}

#[tokio::test]
async fn redelivered_reaction_applies_once() {
    let harness = TestHarness::new();
    let message_ts = generate(&harness).await;
    let body = reaction_event("EvReact", "x", &message_ts);

    harness.slack(&body).await;
    harness.slack(&body).await;

    harness.wait_for_messages(3).await;
    harness.settle().await;
    assert_eq!(harness.deps.chat.messages().len(), 3);
    assert_eq!(harness.deps.posts.with_status(PostStatus::Rejected).len(), 3);
    assert_eq!(harness.deps.posts.transition_writes(), 3);
}
