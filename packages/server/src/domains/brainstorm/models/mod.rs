pub mod session;

pub use session::BrainstormSession;
