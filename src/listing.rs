//! Remote folder listing.
//!
//! Walks a folder listing page by page, following the continuation cursor
//! while the server reports `has_more`, and keeps only plain files. Folders,
//! deleted entries and unknown entry types are dropped after accumulation, as
//! are files the server returned without a path (links are looked up by path).
//!
//! Every page is appended exactly once, so the result holds each entry as many
//! times as the server returned it.

use crate::dropbox::{ApiError, Metadata, StorageClient};
use crate::types::RemoteFile;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
#[error("Error listing directory [{directory}]: {source}")]
pub struct ListError {
    pub directory: String,
    #[source]
    pub source: ApiError,
}

/// List every file directly under `directory`, in server order.
pub fn list_files(
    client: &dyn StorageClient,
    directory: &str,
) -> Result<Vec<RemoteFile>, ListError> {
    let tag = |source: ApiError| ListError {
        directory: directory.to_string(),
        source,
    };

    let mut page = client.list_folder(directory).map_err(tag)?;
    let mut entries = std::mem::take(&mut page.entries);
    let mut pages = 1;

    while page.has_more {
        page = client.list_folder_continue(&page.cursor).map_err(tag)?;
        pages += 1;
        debug!(directory, page = pages, count = page.entries.len(), "listing page");
        entries.append(&mut page.entries);
    }

    let files: Vec<RemoteFile> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Metadata::File(f) if f.path_lower.is_empty() => {
                debug!(directory, file = %f.name, "skipping file without path");
                None
            }
            Metadata::File(f) => Some(RemoteFile {
                name: f.name,
                path_lower: f.path_lower,
            }),
            _ => None,
        })
        .collect();

    debug!(directory, pages, files = files.len(), "listing complete");
    Ok(files)
}
