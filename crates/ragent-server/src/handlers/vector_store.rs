//! Document index handlers.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use ragent_engine::{upload_files, UploadStats};
use ragent_network::{SearchHit, VectorStoreDetails};
use tracing::info;

use crate::dto::{AskRequest, AskResponse, CreateStoreRequest, SearchRequest, UploadRequest};
use crate::error::AppError;
use crate::ServerState;

pub async fn create(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<CreateStoreRequest>,
) -> Result<Json<VectorStoreDetails>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    let details = state.index().await?.create_store(req.name.trim()).await?;
    Ok(Json(details))
}

pub async fn details(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<VectorStoreDetails>, AppError> {
    Ok(Json(state.index().await?.store_details(&id).await?))
}

/// Uploads server-local files, reporting per-file failures in the stats.
pub async fn upload(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadStats>, AppError> {
    let index = state.index().await?;
    info!("Uploading {} file(s) to {}", req.paths.len(), id);
    let stats = upload_files(index.as_ref(), &req.paths, &id, state.settings().upload_concurrency).await;
    Ok(Json(stats))
}

pub async fn search(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let hits = state
        .index()
        .await?
        .search(&id, &req.query, req.max_results)
        .await?;
    Ok(Json(hits))
}

/// File-search answer restricted to this store.
pub async fn ask(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    state.index().await?;
    let (reply, sources) = state
        .assistant()
        .await
        .search_files(&req.message, &[id], req.model)
        .await;

    Ok(Json(AskResponse {
        reply,
        source_files: sources.into_iter().collect::<BTreeSet<_>>().into_iter().collect(),
    }))
}
