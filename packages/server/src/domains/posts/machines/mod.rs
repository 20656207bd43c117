//! Post lifecycle state machine
//!
//! Pure decision logic - NO IO, only state transitions.
//!
//! ```text
//! draft ──approve──▶ approved ──schedule──▶ scheduled ──publish──▶ published
//!   │                    ▲                      │
//!   └──reject──▶ rejected └──────unschedule─────┘
//! ```
//!
//! `rejected` and `published` are terminal. Every event names exactly one
//! source state; the store applies the resulting [`Transition`] as a
//! conditional write so a post that has moved on in the meantime surfaces
//! as `PreconditionFailed` instead of being silently overwritten.

use chrono::{DateTime, Utc};

use crate::common::{PipelineError, PipelineResult, PostId};
use crate::domains::posts::models::{Post, PostStatus};

/// Something that asks a post to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Approval reaction on a draft
    Approve,
    /// Rejection reaction on a draft
    Reject,
    /// Scheduling Assigner picked a slot
    Schedule { at: DateTime<Utc> },
    /// Explicit cancel of a scheduled post
    Unschedule,
    /// Move a scheduled post to a different time, status unchanged
    Reschedule { at: DateTime<Utc> },
    /// External publisher reports the post is live
    Publish { at: DateTime<Utc> },
}

/// How a nullable timestamp column changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampChange {
    Keep,
    Set(DateTime<Utc>),
    Clear,
}

impl TimestampChange {
    pub fn apply_to(&self, field: &mut Option<DateTime<Utc>>) {
        match self {
            TimestampChange::Keep => {}
            TimestampChange::Set(at) => *field = Some(*at),
            TimestampChange::Clear => *field = None,
        }
    }
}

/// A fully decided state change, ready for the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PostStatus,
    pub to: PostStatus,
    pub scheduled_at: TimestampChange,
    pub published_at: TimestampChange,
}

impl LifecycleEvent {
    /// The transition this event requests. The source state is fixed per
    /// event; no event starts from a terminal state.
    pub fn transition(&self) -> Transition {
        use PostStatus::*;
        use TimestampChange::*;

        match *self {
            LifecycleEvent::Approve => Transition {
                from: Draft,
                to: Approved,
                scheduled_at: Keep,
                published_at: Keep,
            },
            LifecycleEvent::Reject => Transition {
                from: Draft,
                to: Rejected,
                scheduled_at: Keep,
                published_at: Keep,
            },
            LifecycleEvent::Schedule { at } => Transition {
                from: Approved,
                to: Scheduled,
                scheduled_at: Set(at),
                published_at: Keep,
            },
            LifecycleEvent::Unschedule => Transition {
                from: Scheduled,
                to: Approved,
                scheduled_at: Clear,
                published_at: Keep,
            },
            LifecycleEvent::Reschedule { at } => Transition {
                from: Scheduled,
                to: Scheduled,
                scheduled_at: Set(at),
                published_at: Keep,
            },
            LifecycleEvent::Publish { at } => Transition {
                from: Scheduled,
                to: Published,
                scheduled_at: Keep,
                published_at: Set(at),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Approve => "approve",
            LifecycleEvent::Reject => "reject",
            LifecycleEvent::Schedule { .. } => "schedule",
            LifecycleEvent::Unschedule => "unschedule",
            LifecycleEvent::Reschedule { .. } => "reschedule",
            LifecycleEvent::Publish { .. } => "publish",
        }
    }
}

/// Decide whether `event` may be applied to `post` in its current state.
pub fn decide(post: &Post, event: LifecycleEvent) -> PipelineResult<Transition> {
    let transition = event.transition();
    check_source(post.id, post.status, &transition)?;
    Ok(transition)
}

pub fn check_source(
    post_id: PostId,
    current: PostStatus,
    transition: &Transition,
) -> PipelineResult<()> {
    if current != transition.from {
        return Err(PipelineError::PreconditionFailed {
            post_id,
            expected: transition.from,
            actual: current,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    fn all_events() -> Vec<LifecycleEvent> {
        vec![
            LifecycleEvent::Approve,
            LifecycleEvent::Reject,
            LifecycleEvent::Schedule { at: at() },
            LifecycleEvent::Unschedule,
            LifecycleEvent::Reschedule { at: at() },
            LifecycleEvent::Publish { at: at() },
        ]
    }

    fn post_in(status: PostStatus) -> Post {
        let mut post = Post::new_draft("body".into(), vec![], "insight", "professional");
        post.status = status;
        post
    }

    #[test]
    fn no_event_leaves_a_terminal_state() {
        for status in [PostStatus::Rejected, PostStatus::Published] {
            let post = post_in(status);
            for event in all_events() {
                let err = decide(&post, event).unwrap_err();
                assert!(
                    matches!(err, PipelineError::PreconditionFailed { actual, .. } if actual == status),
                    "{} from {} should fail",
                    event.name(),
                    status
                );
            }
        }
    }

    #[test]
    fn draft_can_be_approved_or_rejected_only() {
        let draft = post_in(PostStatus::Draft);
        assert_eq!(
            decide(&draft, LifecycleEvent::Approve).unwrap().to,
            PostStatus::Approved
        );
        assert_eq!(
            decide(&draft, LifecycleEvent::Reject).unwrap().to,
            PostStatus::Rejected
        );
        assert!(decide(&draft, LifecycleEvent::Schedule { at: at() }).is_err());
        assert!(decide(&draft, LifecycleEvent::Publish { at: at() }).is_err());
    }

    #[test]
    fn schedule_sets_and_unschedule_clears_timestamp() {
        let mut post = post_in(PostStatus::Approved);

        let schedule = decide(&post, LifecycleEvent::Schedule { at: at() }).unwrap();
        post.apply(&schedule);
        assert_eq!(post.status, PostStatus::Scheduled);
        assert_eq!(post.scheduled_at, Some(at()));

        let unschedule = decide(&post, LifecycleEvent::Unschedule).unwrap();
        post.apply(&unschedule);
        assert_eq!(post.status, PostStatus::Approved);
        assert_eq!(post.scheduled_at, None);
    }

    #[test]
    fn publish_keeps_schedule_and_sets_published_at() {
        let mut post = post_in(PostStatus::Approved);
        post.apply(&LifecycleEvent::Schedule { at: at() }.transition());

        let published = at() + chrono::Duration::minutes(1);
        let transition = decide(&post, LifecycleEvent::Publish { at: published }).unwrap();
        post.apply(&transition);

        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.scheduled_at, Some(at()));
        assert_eq!(post.published_at, Some(published));
    }

    #[test]
    fn precondition_error_reports_expected_and_actual() {
        let post = post_in(PostStatus::Approved);
        match decide(&post, LifecycleEvent::Approve) {
            Err(PipelineError::PreconditionFailed {
                post_id,
                expected,
                actual,
            }) => {
                assert_eq!(post_id, post.id);
                assert_eq!(expected, PostStatus::Draft);
                assert_eq!(actual, PostStatus::Approved);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
