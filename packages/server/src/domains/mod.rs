pub mod brainstorm;
pub mod linear;
pub mod posts;
pub mod slack;
pub mod thoughts;
