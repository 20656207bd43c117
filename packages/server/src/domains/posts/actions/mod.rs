//! Posts domain actions - entry-point business logic
//!
//! Called from the chat command handlers and the reaction router.

pub mod approval;
pub mod generation;
pub mod lifecycle;
pub mod scheduling;

pub use approval::{resolve, IgnoreReason, ReactionAction, Resolution};
pub use generation::{announce_drafts, generate_drafts, GeneratedDrafts};
pub use scheduling::{
    cancel_schedule, mark_published, next_due_post, reschedule_post, schedule_approved_posts,
    upcoming_schedule, ScheduleConfig,
};
