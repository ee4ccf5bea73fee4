//! Conversation history handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{error, info};

use crate::conversation::Conversation;
use crate::dto::{ConversationView, LoadConversationRequest, SaveConversationRequest, SavedResponse};
use crate::error::AppError;
use crate::ServerState;

fn view(conversation: &Conversation) -> ConversationView {
    ConversationView {
        id: conversation.id().to_string(),
        messages: conversation.messages().to_vec(),
    }
}

pub async fn get(State(state): State<Arc<ServerState>>) -> Json<ConversationView> {
    Json(view(&*state.conversation.lock().await))
}

/// Clears the history and starts a new conversation id.
pub async fn clear(State(state): State<Arc<ServerState>>) -> Json<ConversationView> {
    let mut conversation = state.conversation.lock().await;
    conversation.clear();
    info!("Conversation cleared, new id {}", conversation.id());
    Json(view(&conversation))
}

pub async fn save(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<SaveConversationRequest>,
) -> Result<Json<SavedResponse>, AppError> {
    let conversation = state.conversation.lock().await;
    let filename = req
        .filename
        .unwrap_or_else(|| format!("{}.json", conversation.id()));
    let path = state.conversation_path(&filename)?;

    conversation.save(&path).map_err(|e| {
        error!("Failed to save conversation: {:#}", e);
        AppError::Internal(format!("save failed: {}", e))
    })?;

    info!("Saved conversation {} to {}", conversation.id(), path.display());
    Ok(Json(SavedResponse { success: true, path: path.display().to_string() }))
}

pub async fn load(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<LoadConversationRequest>,
) -> Result<Json<ConversationView>, AppError> {
    let path = state.conversation_path(&req.filename)?;
    let mut conversation = state.conversation.lock().await;

    conversation.load(&path).map_err(|e| {
        error!("Failed to load conversation: {:#}", e);
        AppError::BadRequest(format!("load failed: {}", e))
    })?;

    info!("Loaded conversation {} ({} messages)", conversation.id(), conversation.messages().len());
    Ok(Json(view(&conversation)))
}
