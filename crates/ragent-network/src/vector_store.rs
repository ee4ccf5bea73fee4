//! Hosted document index (OpenAI vector stores).
//!
//! Store and file management goes through `async-openai`. Direct search
//! has no typed endpoint there and is sent with reqwest.

use std::path::Path;

use async_openai::{
    config::OpenAIConfig,
    types::{
        CreateFileRequestArgs, CreateVectorStoreFileRequestArgs, CreateVectorStoreRequestArgs,
        FilePurpose, VectorStoreObject,
    },
    Client,
};
use async_trait::async_trait;
use ragent_core::AgentError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

/// Summary of a vector store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorStoreDetails {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    /// Number of files that finished processing.
    pub file_count: u64,
}

/// One ranked result of a direct vector store search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub file_id: String,
    pub filename: String,
    pub score: f64,
    pub text: String,
}

/// Operations on the hosted document index.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    async fn create_store(&self, name: &str) -> Result<VectorStoreDetails, AgentError>;

    async fn store_details(&self, store_id: &str) -> Result<VectorStoreDetails, AgentError>;

    /// Uploads a local file and attaches it to the store. Returns the file id.
    async fn upload_file(&self, path: &Path, store_id: &str) -> Result<String, AgentError>;

    async fn search(&self, store_id: &str, query: &str, max_results: u32) -> Result<Vec<SearchHit>, AgentError>;
}

impl From<VectorStoreObject> for VectorStoreDetails {
    fn from(raw: VectorStoreObject) -> Self {
        Self {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            created_at: i64::from(raw.created_at),
            file_count: u64::from(raw.file_counts.completed),
        }
    }
}

#[derive(Deserialize)]
struct SearchContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct SearchResult {
    file_id: String,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    content: Vec<SearchContent>,
}

#[derive(Deserialize)]
struct SearchPage {
    #[serde(default)]
    data: Vec<SearchResult>,
}

fn api_err(e: impl ToString) -> AgentError {
    AgentError::ExternalApi(e.to_string())
}

/// Client for the vector store and file endpoints.
pub struct VectorStoreClient {
    client: Client<OpenAIConfig>,
    http: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl VectorStoreClient {
    pub fn new(api_key: Option<&str>, api_base: &str) -> Self {
        let api_key = api_key.unwrap_or_default().to_string();
        let api_base = api_base.trim_end_matches('/').to_string();
        let config = OpenAIConfig::new()
            .with_api_base(&api_base)
            .with_api_key(&api_key);

        Self {
            client: Client::with_config(config),
            http: reqwest::Client::new(),
            api_key,
            api_base,
        }
    }
}

#[async_trait]
impl DocumentIndex for VectorStoreClient {
    async fn create_store(&self, name: &str) -> Result<VectorStoreDetails, AgentError> {
        let request = CreateVectorStoreRequestArgs::default()
            .name(name)
            .build()
            .map_err(api_err)?;
        let raw = self.client.vector_stores().create(request).await.map_err(api_err)?;
        info!("Created vector store {} ({})", raw.id, name);
        Ok(raw.into())
    }

    async fn store_details(&self, store_id: &str) -> Result<VectorStoreDetails, AgentError> {
        let raw = self.client.vector_stores().retrieve(store_id).await.map_err(api_err)?;
        Ok(raw.into())
    }

    async fn upload_file(&self, path: &Path, store_id: &str) -> Result<String, AgentError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tokio::fs::metadata(path)
            .await
            .map_err(|e| AgentError::ExternalApi(format!("{}: {}", file_name, e)))?;

        let request = CreateFileRequestArgs::default()
            .file(path)
            .purpose(FilePurpose::Assistants)
            .build()
            .map_err(api_err)?;
        let file = self.client.files().create(request).await.map_err(api_err)?;
        debug!("Uploaded {} as {}", file_name, file.id);

        let attach = CreateVectorStoreFileRequestArgs::default()
            .file_id(file.id.clone())
            .build()
            .map_err(api_err)?;
        self.client
            .vector_stores()
            .files(store_id)
            .create(attach)
            .await
            .map_err(api_err)?;

        Ok(file.id)
    }

    async fn search(&self, store_id: &str, query: &str, max_results: u32) -> Result<Vec<SearchHit>, AgentError> {
        let response = self
            .http
            .post(format!("{}/vector_stores/{}/search", self.api_base, store_id))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .json(&json!({ "query": query, "max_num_results": max_results }))
            .send()
            .await
            .map_err(api_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::ExternalApi(format!(
                "Error code: {} - {}",
                status.as_u16(),
                body
            )));
        }

        let page: SearchPage = response.json().await.map_err(api_err)?;
        Ok(page
            .data
            .into_iter()
            .map(|r| SearchHit {
                file_id: r.file_id,
                filename: r.filename,
                score: r.score,
                text: r.content.into_iter().map(|c| c.text).collect::<Vec<_>>().join("\n"),
            })
            .collect())
    }
}
