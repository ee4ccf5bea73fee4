//! Bulk upload of local files into a vector store.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use ragent_network::DocumentIndex;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFailure {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadStats {
    pub total_files: usize,
    pub successful_uploads: usize,
    pub failed_uploads: usize,
    pub errors: Vec<UploadFailure>,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Uploads every path with at most `concurrency` uploads in flight.
///
/// A failed file is recorded and the batch carries on.
pub async fn upload_files(
    index: &dyn DocumentIndex,
    paths: &[PathBuf],
    store_id: &str,
    concurrency: usize,
) -> UploadStats {
    let mut stats = UploadStats { total_files: paths.len(), ..Default::default() };

    let uploads: Vec<_> = paths
        .iter()
        .map(|path| async move { (display_name(path), index.upload_file(path, store_id).await) })
        .collect();
    let mut results = stream::iter(uploads).buffer_unordered(concurrency.max(1));

    while let Some((file, result)) = results.next().await {
        match result {
            Ok(file_id) => {
                info!("Uploaded {} ({})", file, file_id);
                stats.successful_uploads += 1;
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", file, e);
                stats.failed_uploads += 1;
                stats.errors.push(UploadFailure { file, error: e.to_string() });
            }
        }
    }

    info!(
        "Upload to {} finished: {}/{} succeeded",
        store_id, stats.successful_uploads, stats.total_files
    );
    stats
}
