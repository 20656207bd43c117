//! Postgres-backed stores. Queries live on the models; these adapters only
//! bridge them to the kernel traits.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use super::{BaseBrainstormStore, BasePostStore, BaseThoughtStore};
use crate::common::PostId;
use crate::domains::brainstorm::models::BrainstormSession;
use crate::domains::posts::machines::Transition;
use crate::domains::posts::models::{Post, PostStatus, TransitionOutcome};
use crate::domains::thoughts::models::Thought;

pub struct PgPostStore(pub PgPool);

#[async_trait]
impl BasePostStore for PgPostStore {
    async fn create(&self, post: &Post) -> Result<()> {
        Post::insert(post, &self.0).await
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>> {
        Post::find_by_id(id, &self.0).await
    }

    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>> {
        Post::find_by_status(status, &self.0).await
    }

    async fn transition(&self, id: PostId, transition: &Transition) -> Result<TransitionOutcome> {
        Post::apply_transition(id, transition, &self.0).await
    }
}

pub struct PgThoughtStore(pub PgPool);

#[async_trait]
impl BaseThoughtStore for PgThoughtStore {
    async fn create(&self, thought: &Thought) -> Result<()> {
        Thought::insert(thought, &self.0).await
    }

    async fn find_by_status(&self, status: &str) -> Result<Vec<Thought>> {
        Thought::find_by_status(status, &self.0).await
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Thought>> {
        Thought::find_by_category(category, &self.0).await
    }

    async fn find_all(&self) -> Result<Vec<Thought>> {
        Thought::find_all(&self.0).await
    }

    async fn count(&self) -> Result<i64> {
        Thought::count(&self.0).await
    }
}

pub struct PgBrainstormStore(pub PgPool);

#[async_trait]
impl BaseBrainstormStore for PgBrainstormStore {
    async fn create(&self, session: &BrainstormSession) -> Result<()> {
        BrainstormSession::insert(session, &self.0).await
    }
}
