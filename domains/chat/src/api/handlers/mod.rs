//! HTTP handlers for the Chat domain

pub mod health;
pub mod messages;
