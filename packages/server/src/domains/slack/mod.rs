pub mod commands;
pub mod events;
pub mod router;
pub mod webhook;

pub use events::{parse_envelope, EventKey, InboundEvent};
pub use router::dispatch;
