use std::sync::Arc;

use axum::{extract::State, Json};
use ragent_engine::prompts::{DEVELOPER_PROMPT, SYSTEM_MESSAGE};

use crate::dto::{ApiKeyRequest, PromptResponse, SuccessResponse};
use crate::error::AppError;
use crate::ServerState;

/// Replaces the upstream credential for all later requests.
pub async fn set_api_key(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<ApiKeyRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let api_key = req.api_key.trim();
    if api_key.is_empty() {
        return Err(AppError::BadRequest("api_key must not be empty".into()));
    }
    state.rotate_api_key(api_key).await;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn prompt() -> Json<PromptResponse> {
    Json(PromptResponse {
        developer_prompt: DEVELOPER_PROMPT,
        system_message: SYSTEM_MESSAGE,
    })
}
