use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::{BrainstormSessionId, PostId, ThoughtId};
use crate::domains::posts::machines::{TimestampChange, Transition};

/// Post - a drafted, approved, scheduled or published piece of content
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: PostId,
    pub content: String,
    #[sqlx(try_from = "String")]
    pub status: PostStatus,
    pub source_thought_ids: Vec<ThoughtId>,
    pub brainstorm_session_id: Option<BrainstormSessionId>,
    pub post_type: String, // 'story', 'insight', 'update', 'how-to'
    pub tone: String,      // 'professional', 'casual', 'technical'
    pub created_at: DateTime<Utc>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub metrics: Json<PostMetrics>,
    pub performance_score: f64,
}

/// Engagement counters, filled in by the external publisher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetrics {
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub views: i64,
}

/// Lifecycle status of a post
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Approved,
    Rejected,
    Scheduled,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Approved => "approved",
            PostStatus::Rejected => "rejected",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
        }
    }

    /// Terminal states admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PostStatus::Rejected | PostStatus::Published)
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid post status: {0}")]
pub struct InvalidPostStatus(String);

impl std::str::FromStr for PostStatus {
    type Err = InvalidPostStatus;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "approved" => Ok(PostStatus::Approved),
            "rejected" => Ok(PostStatus::Rejected),
            "scheduled" => Ok(PostStatus::Scheduled),
            "published" => Ok(PostStatus::Published),
            other => Err(InvalidPostStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for PostStatus {
    type Error = InvalidPostStatus;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Result of a conditional status write.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Applied(Post),
    /// The row exists but is not in the transition's source state.
    Conflict(PostStatus),
    Missing,
}

impl Post {
    /// Build a new draft (not yet persisted)
    pub fn new_draft(
        content: String,
        source_thought_ids: Vec<ThoughtId>,
        post_type: &str,
        tone: &str,
    ) -> Self {
        Self {
            id: PostId::new(),
            content,
            status: PostStatus::Draft,
            source_thought_ids,
            brainstorm_session_id: None,
            post_type: post_type.to_string(),
            tone: tone.to_string(),
            created_at: Utc::now(),
            scheduled_at: None,
            published_at: None,
            metrics: Json(PostMetrics::default()),
            performance_score: 0.0,
        }
    }

    /// Apply a transition's field changes in memory (used by non-SQL stores).
    pub fn apply(&mut self, transition: &Transition) {
        self.status = transition.to;
        transition.scheduled_at.apply_to(&mut self.scheduled_at);
        transition.published_at.apply_to(&mut self.published_at);
    }

    /// Short single-line preview for chat listings
    pub fn preview(&self, max_chars: usize) -> String {
        preview(&self.content, max_chars)
    }
}

/// Truncate on a char boundary and append an ellipsis when shortened.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated)
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Post {
    pub async fn insert(post: &Post, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                id,
                content,
                status,
                source_thought_ids,
                brainstorm_session_id,
                post_type,
                tone,
                created_at,
                scheduled_at,
                published_at,
                metrics,
                performance_score
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(post.id)
        .bind(&post.content)
        .bind(post.status.as_str())
        .bind(&post.source_thought_ids)
        .bind(post.brainstorm_session_id)
        .bind(&post.post_type)
        .bind(&post.tone)
        .bind(post.created_at)
        .bind(post.scheduled_at)
        .bind(post.published_at)
        .bind(&post.metrics)
        .bind(post.performance_score)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(id: PostId, pool: &PgPool) -> Result<Option<Self>> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(post)
    }

    /// Find posts by status, newest first
    pub async fn find_by_status(status: PostStatus, pool: &PgPool) -> Result<Vec<Self>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts
             WHERE status = $1
             ORDER BY created_at DESC",
        )
        .bind(status.as_str())
        .fetch_all(pool)
        .await?;
        Ok(posts)
    }

    /// Conditional status write: only succeeds while the row is still in
    /// `transition.from`. Concurrent writers racing on one post therefore
    /// see a conflict instead of overwriting each other.
    pub async fn apply_transition(
        id: PostId,
        transition: &Transition,
        pool: &PgPool,
    ) -> Result<TransitionOutcome> {
        let (touch_scheduled, scheduled_at) = transition.scheduled_at.as_binds();
        let (touch_published, published_at) = transition.published_at.as_binds();

        let updated = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET
                status = $3,
                scheduled_at = CASE WHEN $4 THEN $5 ELSE scheduled_at END,
                published_at = CASE WHEN $6 THEN $7 ELSE published_at END
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(transition.from.as_str())
        .bind(transition.to.as_str())
        .bind(touch_scheduled)
        .bind(scheduled_at)
        .bind(touch_published)
        .bind(published_at)
        .fetch_optional(pool)
        .await?;

        if let Some(post) = updated {
            return Ok(TransitionOutcome::Applied(post));
        }

        let current: Option<String> = sqlx::query_scalar("SELECT status FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match current {
            Some(status) => Ok(TransitionOutcome::Conflict(status.parse()?)),
            None => Ok(TransitionOutcome::Missing),
        }
    }
}

impl TimestampChange {
    /// (should the column be written, value to write)
    fn as_binds(&self) -> (bool, Option<DateTime<Utc>>) {
        match self {
            TimestampChange::Keep => (false, None),
            TimestampChange::Set(at) => (true, Some(*at)),
            TimestampChange::Clear => (true, None),
        }
    }
}
