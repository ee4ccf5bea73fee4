//! Chat turn handler.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use ragent_core::MessageRole;
use tracing::info;

use crate::conversation::MetadataView;
use crate::dto::{ChatRequest, ChatResponse, WebSearchRequest, WebSearchResponse};
use crate::error::AppError;
use crate::ServerState;

/// Answers one message and records both sides in the conversation.
pub async fn chat(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".into()));
    }

    info!(
        "Chat request (model: {}): {}...",
        req.tools.model,
        message.get(..50).unwrap_or(message)
    );

    state
        .conversation
        .lock()
        .await
        .add(MessageRole::User, message, MetadataView::default());

    let start = Instant::now();
    let result = state.assistant().await.respond(message, &req.tools).await;
    info!("Chat reply in {}ms", start.elapsed().as_millis());

    let metadata = MetadataView::from(result.metadata);
    let mut conversation = state.conversation.lock().await;
    conversation.add(MessageRole::Assistant, result.reply.clone(), metadata.clone());

    Ok(Json(ChatResponse {
        reply: result.reply,
        metadata,
        conversation_id: conversation.id().to_string(),
    }))
}

/// Standalone web search, outside the conversation history.
pub async fn web_search(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<WebSearchRequest>,
) -> Result<Json<WebSearchResponse>, AppError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("query must not be empty".into()));
    }

    info!("Web search (model: {}): {}", req.model, query);
    let reply = state.assistant().await.web_search(query, req.model).await;
    Ok(Json(WebSearchResponse { reply }))
}
