use std::collections::HashSet;

use ragent_core::Model;
use ragent_network::{LanguageModel, RequestTool, ResponseRequest};
use tracing::{info, warn};

use crate::prompts::DEVELOPER_PROMPT;
use crate::reconcile::collect_source_files;
use crate::retry::{RetryingInvoker, FILE_SEARCH};

/// One web-search-enabled call; the reply text is returned verbatim.
pub async fn web_search(llm: &dyn LanguageModel, query: &str, model: Model) -> String {
    let request = ResponseRequest::new(model, query)
        .instructions(DEVELOPER_PROMPT)
        .tool(RequestTool::WebSearchPreview);

    match llm.respond(&request).await {
        Ok(reply) => reply.output_text,
        Err(e) => {
            warn!("Web search failed: {}", e);
            format!("Error: {}", e.detail())
        }
    }
}

/// File-search-only answer with the filenames it cites.
///
/// The top tier is kept only when explicitly requested; everything else
/// runs on gpt-4o-mini.
pub async fn search_files(
    llm: &dyn LanguageModel,
    invoker: &RetryingInvoker,
    message: &str,
    vector_store_ids: &[String],
    model: Model,
) -> (String, HashSet<String>) {
    let search_model = if model.is_top_tier() { model } else { Model::Gpt4oMini };
    let request = ResponseRequest::new(search_model, message)
        .instructions(DEVELOPER_PROMPT)
        .tool(RequestTool::FileSearch { vector_store_ids: vector_store_ids.to_vec() })
        .temperature(0.7);

    let result = invoker
        .invoke(search_model, |model| {
            let request = request.with_model(model);
            async move { llm.respond(&request).await }
        })
        .await;

    match result {
        Ok((reply, used)) => {
            let sources = collect_source_files(&reply);
            info!("File search on {}: {} source file(s)", used, sources.len());
            (reply.output_text, sources)
        }
        Err(e) => (FILE_SEARCH.recover(&e), HashSet::new()),
    }
}
