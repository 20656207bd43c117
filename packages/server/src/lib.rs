// Ghostwriter - chat-driven content pipeline
//
// Thoughts arrive from Slack messages and Linear webhooks, get drafted
// into post variations, approved with emoji reactions and scheduled for
// an external publisher.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
