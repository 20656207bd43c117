//! Schedule commands driven through mentions.

mod common;

use crate::common::*;
use ghostwriter_core::domains::posts::PostStatus;

#[tokio::test]
async fn schedule_assigns_approved_posts() {
    let harness = TestHarness::new();
    for i in 0..3 {
        harness
            .deps
            .seed_post(&format!("Approved post {}", i), PostStatus::Approved);
    }
    harness.deps.seed_post("Still a draft", PostStatus::Draft);

    harness.slack(&mention_event("EvSched", "schedule 2")).await;

    let sent = harness.wait_for_messages(2).await;
    assert_eq!(sent[0], "📅 Scheduling approved posts... (2 posts per day)");
    assert!(sent[1].starts_with("✅ *Scheduled 3 posts!*"));

    let scheduled = harness.deps.posts.with_status(PostStatus::Scheduled);
    assert_eq!(scheduled.len(), 3);
    assert!(scheduled.iter().all(|p| p.scheduled_at.is_some()));
    assert_eq!(harness.deps.posts.with_status(PostStatus::Draft).len(), 1);
}

#[tokio::test]
async fn out_of_range_posts_per_day_is_reported() {
    let harness = TestHarness::new();
    harness.deps.seed_post("Approved", PostStatus::Approved);

    harness.slack(&mention_event("EvSched", "schedule 9")).await;

    let sent = harness.wait_for_messages(1).await;
    assert_eq!(sent, vec!["❌ Posts per day must be between 1 and 4"]);
    assert_eq!(harness.deps.posts.with_status(PostStatus::Approved).len(), 1);
}

#[tokio::test]
async fn nothing_approved_is_reported() {
    let harness = TestHarness::new();

    harness.slack(&mention_event("EvSched", "schedule")).await;

    let sent = harness.wait_for_messages(2).await;
    assert!(sent[1].starts_with("📭 No approved posts to schedule."));
}

#[tokio::test]
async fn unschedule_returns_post_to_approved() {
    let harness = TestHarness::new();
    let post = harness.deps.seed_post("Scheduled", PostStatus::Scheduled);

    harness
        .slack(&mention_event("EvUnsched", &format!("unschedule {}", post.id)))
        .await;

    let sent = harness.wait_for_messages(1).await;
    assert!(sent[0].starts_with("↩️"));
    let stored = harness.deps.posts.get(post.id).unwrap();
    assert_eq!(stored.status, PostStatus::Approved);
    assert!(stored.scheduled_at.is_none());
}

#[tokio::test]
async fn unschedule_unknown_post_is_reported() {
    let harness = TestHarness::new();
    let missing = ghostwriter_core::common::PostId::new();

    harness
        .slack(&mention_event("EvUnsched", &format!("unschedule {}", missing)))
        .await;

    let sent = harness.wait_for_messages(1).await;
    assert_eq!(sent, vec![format!("⚠️ Post `{}` not found.", missing)]);
}

#[tokio::test]
async fn empty_schedule_view() {
    let harness = TestHarness::new();

    harness.slack(&mention_event("EvView", "view schedule")).await;

    let sent = harness.wait_for_messages(1).await;
    assert!(sent[0].starts_with("📭 No posts scheduled."));
}
