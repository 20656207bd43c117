// TestDependencies - in-memory implementations for testing
//
// Provides stores and mock services that can be injected into ServerDeps
// for tests. Each mock records its calls so tests can assert on them.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::{
    BaseBrainstormStore, BaseChatTransport, BaseContentService, BasePostStore, BaseThoughtStore,
    BrainstormIdea, Categorization, DraftCorrelationCache, IdempotencyCache, ServerDeps,
};
use crate::common::PostId;
use crate::domains::brainstorm::models::BrainstormSession;
use crate::domains::posts::machines::Transition;
use crate::domains::posts::models::{Post, PostStatus, TransitionOutcome};
use crate::domains::thoughts::models::Thought;

// =============================================================================
// In-memory Post Store
// =============================================================================

/// Keeps posts in insertion order; `find_by_status` returns that order.
#[derive(Default)]
pub struct InMemoryPostStore {
    posts: Mutex<Vec<Post>>,
    transition_writes: AtomicUsize,
    failing_transitions: Mutex<HashSet<PostId>>,
    fail_reads: AtomicBool,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, post: Post) {
        self.posts.lock().unwrap().push(post);
    }

    pub fn get(&self, id: PostId) -> Option<Post> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn all(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    pub fn with_status(&self, status: PostStatus) -> Vec<Post> {
        self.all()
            .into_iter()
            .filter(|p| p.status == status)
            .collect()
    }

    /// Number of successful status writes
    pub fn transition_writes(&self) -> usize {
        self.transition_writes.load(Ordering::SeqCst)
    }

    /// Make every transition on `id` fail as if the database were down
    pub fn fail_transitions_for(&self, id: PostId) {
        self.failing_transitions.lock().unwrap().insert(id);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BasePostStore for InMemoryPostStore {
    async fn create(&self, post: &Post) -> Result<()> {
        self.insert(post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("post store unavailable"));
        }
        Ok(self.get(id))
    }

    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("post store unavailable"));
        }
        Ok(self.with_status(status))
    }

    async fn transition(&self, id: PostId, transition: &Transition) -> Result<TransitionOutcome> {
        if self.failing_transitions.lock().unwrap().contains(&id) {
            return Err(anyhow!("post store unavailable"));
        }

        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(TransitionOutcome::Missing);
        };
        if post.status != transition.from {
            return Ok(TransitionOutcome::Conflict(post.status));
        }
        post.apply(transition);
        self.transition_writes.fetch_add(1, Ordering::SeqCst);
        Ok(TransitionOutcome::Applied(post.clone()))
    }
}

// =============================================================================
// In-memory Thought Store
// =============================================================================

#[derive(Default)]
pub struct InMemoryThoughtStore {
    thoughts: Mutex<Vec<Thought>>,
}

impl InMemoryThoughtStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, thought: Thought) {
        self.thoughts.lock().unwrap().push(thought);
    }

    pub fn all(&self) -> Vec<Thought> {
        self.thoughts.lock().unwrap().clone()
    }

    /// Most recent first, like the SQL store
    fn newest_first(&self, keep: impl Fn(&Thought) -> bool) -> Vec<Thought> {
        let mut found: Vec<Thought> = self.all().into_iter().filter(|t| keep(t)).collect();
        found.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        found
    }
}

#[async_trait]
impl BaseThoughtStore for InMemoryThoughtStore {
    async fn create(&self, thought: &Thought) -> Result<()> {
        self.insert(thought.clone());
        Ok(())
    }

    async fn find_by_status(&self, status: &str) -> Result<Vec<Thought>> {
        Ok(self.newest_first(|t| t.status == status))
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Thought>> {
        Ok(self.newest_first(|t| t.category == category))
    }

    async fn find_all(&self) -> Result<Vec<Thought>> {
        Ok(self.newest_first(|_| true))
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.thoughts.lock().unwrap().len() as i64)
    }
}

// =============================================================================
// In-memory Brainstorm Store
// =============================================================================

#[derive(Default)]
pub struct InMemoryBrainstormStore {
    sessions: Mutex<Vec<BrainstormSession>>,
}

impl InMemoryBrainstormStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<BrainstormSession> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseBrainstormStore for InMemoryBrainstormStore {
    async fn create(&self, session: &BrainstormSession) -> Result<()> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }
}

// =============================================================================
// Mock Content Service
// =============================================================================

pub struct MockContentService {
    categorization: Mutex<Categorization>,
    variations: Mutex<Vec<String>>,
    fail_categorize: AtomicBool,
    categorize_calls: Mutex<Vec<String>>,
    generate_calls: Mutex<Vec<Vec<String>>>,
}

impl Default for MockContentService {
    fn default() -> Self {
        Self {
            categorization: Mutex::new(Categorization {
                category: "technical".to_string(),
                tags: vec!["rust".to_string()],
                readiness: "draft_ready".to_string(),
            }),
            variations: Mutex::new(vec![
                "Variation one".to_string(),
                "Variation two".to_string(),
                "Variation three".to_string(),
            ]),
            fail_categorize: AtomicBool::new(false),
            categorize_calls: Mutex::new(Vec::new()),
            generate_calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockContentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(self, category: &str) -> Self {
        self.categorization.lock().unwrap().category = category.to_string();
        self
    }

    pub fn with_variations(self, variations: Vec<&str>) -> Self {
        *self.variations.lock().unwrap() = variations.into_iter().map(String::from).collect();
        self
    }

    pub fn failing_categorize(self) -> Self {
        self.fail_categorize.store(true, Ordering::SeqCst);
        self
    }

    pub fn categorize_calls(&self) -> Vec<String> {
        self.categorize_calls.lock().unwrap().clone()
    }

    /// Thought batches passed to `generate_variations`
    pub fn generate_calls(&self) -> Vec<Vec<String>> {
        self.generate_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseContentService for MockContentService {
    async fn categorize(&self, text: &str) -> Result<Categorization> {
        self.categorize_calls.lock().unwrap().push(text.to_string());
        if self.fail_categorize.load(Ordering::SeqCst) {
            return Err(anyhow!("categorizer unavailable"));
        }
        Ok(self.categorization.lock().unwrap().clone())
    }

    async fn generate_variations(&self, thoughts: &[String]) -> Result<Vec<String>> {
        self.generate_calls.lock().unwrap().push(thoughts.to_vec());
        Ok(self.variations.lock().unwrap().clone())
    }

    async fn brainstorm(&self, topic: &str) -> Result<BrainstormIdea> {
        Ok(BrainstormIdea {
            exploration: format!("Exploring {}", topic),
            angles: vec!["First angle".to_string(), "Second angle".to_string()],
        })
    }
}

// =============================================================================
// Mock Chat Transport
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel: String,
    pub text: String,
    pub ts: String,
}

#[derive(Default)]
pub struct MockChatTransport {
    sent: Mutex<Vec<SentMessage>>,
    counter: AtomicUsize,
    failing: AtomicBool,
}

impl MockChatTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_message(&self) -> Option<SentMessage> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn fail_sends(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BaseChatTransport for MockChatTransport {
    async fn send_message(&self, channel: &str, text: &str) -> Result<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("chat transport unavailable"));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let ts = format!("1700000000.{:06}", n);
        self.sent.lock().unwrap().push(SentMessage {
            channel: channel.to_string(),
            text: text.to_string(),
            ts: ts.clone(),
        });
        Ok(ts)
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Concrete handles to every in-memory collaborator, plus the caches, so a
/// test can both drive `ServerDeps` and inspect what happened.
#[derive(Clone)]
pub struct TestDependencies {
    pub posts: Arc<InMemoryPostStore>,
    pub thoughts: Arc<InMemoryThoughtStore>,
    pub brainstorms: Arc<InMemoryBrainstormStore>,
    pub content: Arc<MockContentService>,
    pub chat: Arc<MockChatTransport>,
    pub seen_events: IdempotencyCache,
    pub drafts: DraftCorrelationCache,
    pub schedule_timezone: String,
    pub call_timeout: Duration,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self {
            posts: Arc::new(InMemoryPostStore::new()),
            thoughts: Arc::new(InMemoryThoughtStore::new()),
            brainstorms: Arc::new(InMemoryBrainstormStore::new()),
            content: Arc::new(MockContentService::new()),
            chat: Arc::new(MockChatTransport::new()),
            seen_events: IdempotencyCache::new(10_000, Duration::from_secs(86_400)),
            drafts: DraftCorrelationCache::new(5_000, Duration::from_secs(604_800)),
            schedule_timezone: "UTC".to_string(),
            call_timeout: Duration::from_secs(5),
        }
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, content: MockContentService) -> Self {
        self.content = Arc::new(content);
        self
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.schedule_timezone = timezone.to_string();
        self
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.posts.clone(),
            self.thoughts.clone(),
            self.brainstorms.clone(),
            self.content.clone(),
            self.chat.clone(),
            self.seen_events.clone(),
            self.drafts.clone(),
            self.schedule_timezone.clone(),
            self.call_timeout,
        )
    }

    /// Seed a post directly in the given status
    pub fn seed_post(&self, content: &str, status: PostStatus) -> Post {
        let mut post = Post::new_draft(content.to_string(), vec![], "insight", "professional");
        post.status = status;
        if matches!(status, PostStatus::Scheduled | PostStatus::Published) {
            post.scheduled_at = Some(chrono::Utc::now());
        }
        if status == PostStatus::Published {
            post.published_at = Some(chrono::Utc::now());
        }
        self.posts.insert(post.clone());
        post
    }

    pub fn seed_thought(&self, content: &str, category: &str) -> Thought {
        let mut thought = Thought::new(
            content.to_string(),
            crate::domains::thoughts::models::ThoughtSource::Slack,
        );
        thought.category = category.to_string();
        self.thoughts.insert(thought.clone());
        thought
    }
}
