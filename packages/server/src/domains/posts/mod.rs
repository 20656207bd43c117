pub mod actions;
pub mod machines;
pub mod models;

pub use models::post::{Post, PostStatus};
