//! Tool orchestration for the assistant.
//!
//! A chat turn flows through [`select`] (which capabilities to use), the
//! [`RetryingInvoker`] (backoff and model downgrade on transient upstream
//! failures) and [`reconcile`] (function calls, citations or plain text into
//! an `ApiResult`). [`Assistant`] wires these together.

mod assistant;
mod ingest;
pub mod prompts;
mod reconcile;
mod retry;
mod search;
mod selector;
mod weather;

#[cfg(test)]
mod testing;

pub use assistant::Assistant;
pub use ingest::{upload_files, UploadFailure, UploadStats};
pub use reconcile::{collect_source_files, reconcile, weather_request};
pub use retry::{CallSite, InvokeError, RetryPolicy, RetryState, RetryingInvoker, FILE_SEARCH, TOOL_RESPONSE};
pub use search::{search_files, web_search};
pub use selector::{select, Route, ToolPlan};
pub use weather::WeatherAgent;
