// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Approval, scheduling and routing are domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BasePostStore, BaseChatTransport)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::PostId;
use crate::domains::brainstorm::models::BrainstormSession;
use crate::domains::posts::machines::Transition;
use crate::domains::posts::models::{Post, PostStatus, TransitionOutcome};
use crate::domains::thoughts::models::Thought;

// =============================================================================
// Storage Traits
// =============================================================================

#[async_trait]
pub trait BasePostStore: Send + Sync {
    async fn create(&self, post: &Post) -> Result<()>;

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>>;

    /// Posts in a status, in the store's natural order (newest first for SQL)
    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>>;

    /// Conditional write: applies only while the post is in `transition.from`
    async fn transition(&self, id: PostId, transition: &Transition) -> Result<TransitionOutcome>;
}

#[async_trait]
pub trait BaseThoughtStore: Send + Sync {
    async fn create(&self, thought: &Thought) -> Result<()>;

    async fn find_by_status(&self, status: &str) -> Result<Vec<Thought>>;

    async fn find_by_category(&self, category: &str) -> Result<Vec<Thought>>;

    /// All thoughts, most recent first
    async fn find_all(&self) -> Result<Vec<Thought>>;

    async fn count(&self) -> Result<i64>;
}

#[async_trait]
pub trait BaseBrainstormStore: Send + Sync {
    async fn create(&self, session: &BrainstormSession) -> Result<()>;
}

// =============================================================================
// Content Service Trait (Infrastructure - LLM capabilities)
// =============================================================================

/// Category, tags and readiness assigned to a captured thought
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorization {
    pub category: String,
    pub tags: Vec<String>,
    /// 'draft_ready' or 'needs_brainstorm'
    pub readiness: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrainstormIdea {
    pub exploration: String,
    pub angles: Vec<String>,
}

#[async_trait]
pub trait BaseContentService: Send + Sync {
    async fn categorize(&self, text: &str) -> Result<Categorization>;

    /// Post variations drafted from a batch of thoughts, in presentation order
    async fn generate_variations(&self, thoughts: &[String]) -> Result<Vec<String>>;

    async fn brainstorm(&self, topic: &str) -> Result<BrainstormIdea>;
}

// =============================================================================
// Chat Transport Trait
// =============================================================================

#[async_trait]
pub trait BaseChatTransport: Send + Sync {
    /// Send a message to a channel, returning the platform message id
    async fn send_message(&self, channel: &str, text: &str) -> Result<String>;
}
