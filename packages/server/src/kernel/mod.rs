//! Kernel module - server infrastructure and dependencies.

pub mod ai;
pub mod correlation;
pub mod deps;
pub mod idempotency;
pub mod postgres;
pub mod signature;
pub mod slack_client;
pub mod test_dependencies;
pub mod timeout;
pub mod traits;

pub use ai::AnthropicClient;
pub use correlation::DraftCorrelationCache;
pub use deps::ServerDeps;
pub use idempotency::IdempotencyCache;
pub use slack_client::SlackClient;
pub use test_dependencies::TestDependencies;
pub use traits::*;
