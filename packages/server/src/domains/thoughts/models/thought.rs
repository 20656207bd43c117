use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::ThoughtId;

/// Thought - a short captured idea from chat or the issue tracker
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Thought {
    pub id: ThoughtId,
    pub source: String, // 'slack', 'linear'
    pub content: String,
    pub category: String,
    pub topic_tags: Vec<String>,
    pub status: String, // 'raw', 'in_brainstorm', 'used_in_draft'
    pub captured_at: DateTime<Utc>,
    pub related_thoughts: Vec<ThoughtId>,
}

/// Where a thought came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThoughtSource {
    Slack,
    Linear,
}

impl std::fmt::Display for ThoughtSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThoughtSource::Slack => write!(f, "slack"),
            ThoughtSource::Linear => write!(f, "linear"),
        }
    }
}

pub const THOUGHT_STATUS_RAW: &str = "raw";

impl Thought {
    pub fn new(content: String, source: ThoughtSource) -> Self {
        Self {
            id: ThoughtId::new(),
            source: source.to_string(),
            content,
            category: "uncategorized".to_string(),
            topic_tags: Vec::new(),
            status: THOUGHT_STATUS_RAW.to_string(),
            captured_at: Utc::now(),
            related_thoughts: Vec::new(),
        }
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Thought {
    pub async fn insert(thought: &Thought, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO thoughts (
                id, source, content, category, topic_tags, status, captured_at, related_thoughts
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(thought.id)
        .bind(&thought.source)
        .bind(&thought.content)
        .bind(&thought.category)
        .bind(&thought.topic_tags)
        .bind(&thought.status)
        .bind(thought.captured_at)
        .bind(&thought.related_thoughts)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Thoughts in a status, most recent first
    pub async fn find_by_status(status: &str, pool: &PgPool) -> Result<Vec<Self>> {
        let thoughts = sqlx::query_as::<_, Thought>(
            "SELECT * FROM thoughts WHERE status = $1 ORDER BY captured_at DESC",
        )
        .bind(status)
        .fetch_all(pool)
        .await?;
        Ok(thoughts)
    }

    /// Thoughts in a category, most recent first
    pub async fn find_by_category(category: &str, pool: &PgPool) -> Result<Vec<Self>> {
        let thoughts = sqlx::query_as::<_, Thought>(
            "SELECT * FROM thoughts WHERE category = $1 ORDER BY captured_at DESC",
        )
        .bind(category)
        .fetch_all(pool)
        .await?;
        Ok(thoughts)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let thoughts =
            sqlx::query_as::<_, Thought>("SELECT * FROM thoughts ORDER BY captured_at DESC")
                .fetch_all(pool)
                .await?;
        Ok(thoughts)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM thoughts")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
