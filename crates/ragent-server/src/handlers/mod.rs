//! HTTP route handlers for the assistant server.

pub mod chat;
pub mod conversation;
pub mod settings;
pub mod vector_store;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
