//! Shared link resolution.
//!
//! Every listed file needs a public URL before it can appear in a post. For
//! each file, in listing order:
//!
//! - existing links scoped to the file's path are listed (all pages);
//! - if there are none, exactly one link is created;
//! - only file links are kept; folder links are dropped.
//!
//! Results are flattened, so a file with several existing links contributes
//! several entries. The first failure aborts resolution for all files; links
//! created before the failure are left in place.

use crate::dropbox::{ApiError, SharedLinkMetadata, StorageClient};
use crate::types::{RemoteFile, ShareLink};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Error getting shared link for [{file}]: {source}")]
    List {
        file: String,
        #[source]
        source: ApiError,
    },
    #[error("Error creating shared link for [{file}]: {source}")]
    Create {
        file: String,
        #[source]
        source: ApiError,
    },
}

/// Resolve public links for all `files`, creating missing ones.
pub fn resolve_links(
    client: &dyn StorageClient,
    files: &[RemoteFile],
) -> Result<Vec<ShareLink>, LinkError> {
    let mut links = Vec::new();
    for file in files {
        links.extend(links_for_file(client, file)?);
    }
    Ok(links)
}

fn links_for_file(
    client: &dyn StorageClient,
    file: &RemoteFile,
) -> Result<Vec<ShareLink>, LinkError> {
    let list_error = |source: ApiError| LinkError::List {
        file: file.name.clone(),
        source,
    };

    let mut page = client
        .list_shared_links(&file.path_lower, None)
        .map_err(list_error)?;

    if page.links.is_empty() {
        debug!(file = %file.name, "no shared link, creating one");
        let created = client
            .create_shared_link(&file.path_lower)
            .map_err(|source| LinkError::Create {
                file: file.name.clone(),
                source,
            })?;
        return Ok(file_link(created, true).into_iter().collect());
    }

    let mut links: Vec<ShareLink> = page
        .links
        .drain(..)
        .filter_map(|link| file_link(link, false))
        .collect();

    while page.has_more {
        let Some(cursor) = page.cursor.take() else {
            warn!(file = %file.name, "link listing reports more results but no cursor");
            break;
        };
        page = client
            .list_shared_links(&file.path_lower, Some(cursor.as_str()))
            .map_err(list_error)?;
        links.extend(page.links.drain(..).filter_map(|link| file_link(link, false)));
    }

    debug!(file = %file.name, count = links.len(), "existing shared links");
    Ok(links)
}

fn file_link(link: SharedLinkMetadata, created: bool) -> Option<ShareLink> {
    match link {
        SharedLinkMetadata::File(f) => Some(ShareLink {
            name: f.name,
            url: f.url,
            created,
        }),
        _ => None,
    }
}
