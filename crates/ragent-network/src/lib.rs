//! Upstream API boundary: language model and document index clients.
//!
//! Everything that crosses the network to the model provider lives here.
//! Raw payloads are parsed into tagged enums and normalized into
//! [`ModelReply`] before any orchestration logic sees them.

mod client;
mod responses;
mod vector_store;

pub use client::{LanguageModel, LlmClient, LlmMetrics, LlmResponse};
pub use responses::{
    Annotation, Citation, ContentPart, FunctionCall, ModelReply, OutputItem, RequestTool,
    ResponseObject, ResponseRequest, ResponseUsage, ToolChoice,
};
pub use vector_store::{DocumentIndex, SearchHit, VectorStoreClient, VectorStoreDetails};
