//! Chat domain: append-only message log and reply relay

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Message, MessageRole};
pub use domain::relay::{ReplyRelay, SubmitOutcome};

// Re-export repository types
pub use repository::MessageStore;

// Re-export API types
pub use api::routes;
pub use api::ChatState;
