//! Typed ID definitions for the pipeline's entities.

pub use super::id::Id;

/// Marker type for Post entities (drafted and scheduled content).
pub struct Post;

/// Marker type for Thought entities (captured raw ideas).
pub struct Thought;

/// Marker type for BrainstormSession entities.
pub struct BrainstormSession;

pub type PostId = Id<Post>;

pub type ThoughtId = Id<Thought>;

pub type BrainstormSessionId = Id<BrainstormSession>;
