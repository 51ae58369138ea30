//! Dropbox API access.
//!
//! The rest of the crate talks to remote storage only through the
//! [`StorageClient`] trait, which covers the four RPC calls foglio needs:
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | [`list_folder`](StorageClient::list_folder) | `files/list_folder` |
//! | [`list_folder_continue`](StorageClient::list_folder_continue) | `files/list_folder/continue` |
//! | [`list_shared_links`](StorageClient::list_shared_links) | `sharing/list_shared_links` |
//! | [`create_shared_link`](StorageClient::create_shared_link) | `sharing/create_shared_link_with_settings` |
//!
//! The production implementation is [`DropboxClient`], a blocking `reqwest`
//! client. Every call is a JSON `POST` authorized with the bearer token; a
//! non-success status is surfaced as [`ApiError::Status`] together with the
//! response body, which is where Dropbox puts its error summary.
//!
//! Metadata is tagged by a `.tag` field (`file`, `folder`, `deleted`). Tags
//! foglio does not know about deserialize to an `Other` variant instead of
//! failing, so new server-side types don't break listing.

use crate::types::AccessToken;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("Malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// Wire types
// ============================================================================

/// An entry returned by `files/list_folder`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
pub enum Metadata {
    File(FileMetadata),
    Folder(FolderMetadata),
    Deleted(DeletedMetadata),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    /// Empty when the server omits it; such files are not listed.
    #[serde(default)]
    pub path_lower: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FolderMetadata {
    pub name: String,
    #[serde(default)]
    pub path_lower: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeletedMetadata {
    pub name: String,
}

/// One page of a folder listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListFolderResult {
    pub entries: Vec<Metadata>,
    pub cursor: String,
    pub has_more: bool,
}

/// A shared link, as returned by the sharing endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
pub enum SharedLinkMetadata {
    File(FileLinkMetadata),
    Folder(FolderLinkMetadata),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileLinkMetadata {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FolderLinkMetadata {
    pub url: String,
    pub name: String,
}

/// One page of a shared link listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListSharedLinksResult {
    pub links: Vec<SharedLinkMetadata>,
    pub has_more: bool,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Serialize)]
struct PathArg<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct CursorArg<'a> {
    cursor: &'a str,
}

#[derive(Serialize)]
struct ListSharedLinksArg<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
}

// ============================================================================
// Client
// ============================================================================

/// Remote storage operations used by the pipeline.
///
/// Implemented by [`DropboxClient`] in production and by in-memory fakes in
/// tests.
pub trait StorageClient {
    /// First page of the entries directly under `path`.
    fn list_folder(&self, path: &str) -> Result<ListFolderResult, ApiError>;

    /// Next page of a listing started by [`list_folder`](Self::list_folder).
    fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResult, ApiError>;

    /// Shared links for the file at `path`, resuming from `cursor` if given.
    fn list_shared_links(
        &self,
        path: &str,
        cursor: Option<&str>,
    ) -> Result<ListSharedLinksResult, ApiError>;

    /// Create a public link for the file at `path`.
    fn create_shared_link(&self, path: &str) -> Result<SharedLinkMetadata, ApiError>;
}

/// Blocking Dropbox API v2 client.
pub struct DropboxClient {
    http: Client,
    api_url: String,
    token: AccessToken,
}

impl DropboxClient {
    pub fn new(api_url: &str, token: AccessToken) -> Result<Self, ApiError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn rpc<A: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        arg: &A,
    ) -> Result<R, ApiError> {
        let url = format!("{}/{}", self.api_url, endpoint);
        debug!(%url, "dropbox rpc");
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token.as_str())
            .json(arg)
            .send()?;
        let body = success_body(endpoint, response)?;
        decode(endpoint, &body)
    }
}

impl StorageClient for DropboxClient {
    fn list_folder(&self, path: &str) -> Result<ListFolderResult, ApiError> {
        self.rpc("files/list_folder", &PathArg { path })
    }

    fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResult, ApiError> {
        self.rpc("files/list_folder/continue", &CursorArg { cursor })
    }

    fn list_shared_links(
        &self,
        path: &str,
        cursor: Option<&str>,
    ) -> Result<ListSharedLinksResult, ApiError> {
        self.rpc("sharing/list_shared_links", &ListSharedLinksArg { path, cursor })
    }

    fn create_shared_link(&self, path: &str) -> Result<SharedLinkMetadata, ApiError> {
        self.rpc("sharing/create_shared_link_with_settings", &PathArg { path })
    }
}

/// Read a response body, turning a non-success status into [`ApiError::Status`].
pub(crate) fn success_body(endpoint: &str, response: Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body: body.trim().to_string(),
        });
    }
    Ok(body)
}

/// Parse a JSON response body, tagging failures with the endpoint.
pub(crate) fn decode<R: DeserializeOwned>(endpoint: &str, body: &str) -> Result<R, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
