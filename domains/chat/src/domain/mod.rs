//! Chat domain model: message entity and reply relay

pub mod entities;
pub mod relay;

pub use entities::{Message, MessageRole};
pub use relay::{ReplyRelay, SubmitOutcome};
