//! Chat domain state

use crate::domain::relay::ReplyRelay;
use crate::repository::MessageStore;
use std::sync::Arc;

/// Application state for the Chat domain
#[derive(Clone)]
pub struct ChatState {
    pub store: Arc<MessageStore>,
    pub relay: ReplyRelay,
}

impl ChatState {
    /// Build state sharing one store between the relay and history reads
    pub fn new(relay: ReplyRelay) -> Self {
        Self {
            store: Arc::clone(relay.store()),
            relay,
        }
    }
}
