use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{BrainstormSessionId, ThoughtId};

/// BrainstormSession - an ideation pass over a half-formed topic
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BrainstormSession {
    pub id: BrainstormSessionId,
    pub topic: String,
    pub thought_ids: Vec<ThoughtId>,
    pub content: String,
    pub key_angles: Vec<String>,
    pub status: String, // 'in_progress', 'ready_for_draft', 'archived'
    pub created_at: DateTime<Utc>,
}

impl BrainstormSession {
    pub fn new(topic: String, content: String, key_angles: Vec<String>) -> Self {
        Self {
            id: BrainstormSessionId::new(),
            topic,
            thought_ids: Vec::new(),
            content,
            key_angles,
            status: "in_progress".to_string(),
            created_at: Utc::now(),
        }
    }

    pub async fn insert(session: &BrainstormSession, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO brainstorm_sessions (
                id, topic, thought_ids, content, key_angles, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.id)
        .bind(&session.topic)
        .bind(&session.thought_ids)
        .bind(&session.content)
        .bind(&session.key_angles)
        .bind(&session.status)
        .bind(session.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }
}
