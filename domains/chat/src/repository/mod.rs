//! Repository implementations for the Chat domain

pub mod messages;

pub use messages::MessageStore;
