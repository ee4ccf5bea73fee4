//! HTTP server entry point and Axum router setup.
//!
//! Loads settings (optional JSON file named by `RAGENT_CONFIG`, then
//! environment overrides), builds the shared state and serves the API.

mod conversation;
mod dto;
mod error;
mod handlers;
mod state;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post, put};
use axum::Router;
use ragent_config::Settings;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use crate::state::ServerState;

fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route("/web-search", post(handlers::chat::web_search))
        .route(
            "/conversation",
            get(handlers::conversation::get).delete(handlers::conversation::clear),
        )
        .route("/conversation/save", post(handlers::conversation::save))
        .route("/conversation/load", post(handlers::conversation::load))
        .route("/settings/api-key", put(handlers::settings::set_api_key))
        .route("/prompt", get(handlers::settings::prompt))
        .route("/vector-stores", post(handlers::vector_store::create))
        .route("/vector-stores/{id}", get(handlers::vector_store::details))
        .route("/vector-stores/{id}/files", post(handlers::vector_store::upload))
        .route("/vector-stores/{id}/search", post(handlers::vector_store::search))
        .route("/vector-stores/{id}/ask", post(handlers::vector_store::ask))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .compact()
        .init();

    let config_path = std::env::var("RAGENT_CONFIG").ok().map(PathBuf::from);
    let settings = Settings::load(config_path.as_deref())?;
    if settings.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; use PUT /settings/api-key before chatting");
    }

    let addr = settings.bind_addr.clone();
    let state = Arc::new(ServerState::new(settings));
    let app = router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
