//! Shared server state and credential rotation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ragent_config::Settings;
use ragent_engine::{Assistant, RetryPolicy};
use ragent_network::{DocumentIndex, LlmClient, VectorStoreClient};
use ragent_tools::WeatherService;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::conversation::Conversation;
use crate::error::AppError;

/// Clients bound to one API credential.
struct Backend {
    assistant: Arc<Assistant>,
    index: Arc<dyn DocumentIndex>,
    has_credential: bool,
}

impl Backend {
    fn build(settings: &Settings, api_key: Option<&str>, weather: Arc<WeatherService>) -> Self {
        let llm = LlmClient::new(api_key, &settings.openai_api_base);
        let has_credential = llm.has_credential();
        Self {
            assistant: Arc::new(Assistant::new(
                Arc::new(llm),
                weather,
                RetryPolicy::from(&settings.retry),
            )),
            index: Arc::new(VectorStoreClient::new(api_key, &settings.openai_api_base)),
            has_credential,
        }
    }
}

pub struct ServerState {
    settings: Settings,
    weather: Arc<WeatherService>,
    backend: RwLock<Backend>,
    pub conversation: Mutex<Conversation>,
}

impl ServerState {
    pub fn new(settings: Settings) -> Self {
        let weather = Arc::new(WeatherService::from_urls(
            &settings.geocoding_base_url,
            &settings.forecast_base_url,
            &settings.user_agent,
        ));
        let backend = Backend::build(&settings, settings.openai_api_key.as_deref(), weather.clone());

        Self {
            settings,
            weather,
            backend: RwLock::new(backend),
            conversation: Mutex::new(Conversation::new()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn assistant(&self) -> Arc<Assistant> {
        self.backend.read().await.assistant.clone()
    }

    /// The document index, if a credential has been supplied.
    pub async fn index(&self) -> Result<Arc<dyn DocumentIndex>, AppError> {
        let backend = self.backend.read().await;
        if !backend.has_credential {
            return Err(AppError::BadRequest("OpenAI API key is not set".into()));
        }
        Ok(backend.index.clone())
    }

    /// Swaps in clients built for `api_key`. Requests already running keep
    /// the clients they started with.
    pub async fn rotate_api_key(&self, api_key: &str) {
        let backend = Backend::build(&self.settings, Some(api_key), self.weather.clone());
        *self.backend.write().await = backend;
        info!("API key updated");
    }

    /// Resolves a bare file name inside the conversation directory.
    pub fn conversation_path(&self, filename: &str) -> Result<PathBuf, AppError> {
        let name = Path::new(filename);
        let is_bare = name.components().count() == 1 && name.file_name().is_some();
        if filename.is_empty() || !is_bare {
            return Err(AppError::BadRequest(format!("invalid file name: {:?}", filename)));
        }
        Ok(self.settings.conversation_dir.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_requires_credential() {
        let state = ServerState::new(Settings::default());
        assert!(matches!(state.index().await, Err(AppError::BadRequest(_))));

        state.rotate_api_key("sk-new").await;
        assert!(state.index().await.is_ok());
    }

    #[test]
    fn test_conversation_path_rejects_traversal() {
        let state = ServerState::new(Settings::default());
        assert!(state.conversation_path("chat.json").is_ok());
        assert!(state.conversation_path("../etc/passwd").is_err());
        assert!(state.conversation_path("a/b.json").is_err());
        assert!(state.conversation_path("..").is_err());
        assert!(state.conversation_path("").is_err());
    }
}
