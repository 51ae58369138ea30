//! Shared test utilities for the foglio test suite.
//!
//! Provides [`FakeStorage`], an in-memory [`StorageClient`] with scripted
//! pagination and failure injection, plus constructors for wire metadata.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let storage = FakeStorage::new()
//!     .with_folder_pages(vec![vec![file_entry("a.jpg")], vec![file_entry("b.jpg")]])
//!     .with_link_pages("/p/a.jpg", vec![vec![file_link_meta("a.jpg", "https://...")]]);
//!
//! let files = list_files(&storage, "/p").unwrap();
//! ```
//!
//! Every entry built by [`file_entry`] lives under `/p`.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::dropbox::{
    ApiError, DeletedMetadata, FileLinkMetadata, FileMetadata, FolderLinkMetadata,
    FolderMetadata, ListFolderResult, ListSharedLinksResult, Metadata, SharedLinkMetadata,
    StorageClient,
};

// =========================================================================
// Metadata constructors
// =========================================================================

pub fn file_entry(name: &str) -> Metadata {
    Metadata::File(FileMetadata {
        name: name.to_string(),
        path_lower: format!("/p/{}", name.to_lowercase()),
    })
}

pub fn folder_entry(name: &str) -> Metadata {
    Metadata::Folder(FolderMetadata {
        name: name.to_string(),
        path_lower: format!("/p/{}", name.to_lowercase()),
    })
}

pub fn deleted_entry(name: &str) -> Metadata {
    Metadata::Deleted(DeletedMetadata {
        name: name.to_string(),
    })
}

pub fn file_link_meta(name: &str, url: &str) -> SharedLinkMetadata {
    SharedLinkMetadata::File(FileLinkMetadata {
        url: url.to_string(),
        name: name.to_string(),
        path_lower: None,
    })
}

pub fn folder_link_meta(name: &str, url: &str) -> SharedLinkMetadata {
    SharedLinkMetadata::Folder(FolderLinkMetadata {
        url: url.to_string(),
        name: name.to_string(),
    })
}

// =========================================================================
// Fake storage
// =========================================================================

/// A call observed by [`FakeStorage`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListFolder(String),
    ListFolderContinue(String),
    ListLinks(String, Option<String>),
    CreateLink(String),
}

/// In-memory storage with scripted pages.
///
/// Folder pages are served in order: page 0 from `list_folder`, page N from
/// `list_folder_continue("folder:N")`. Link pages work the same way per path,
/// with cursors `"links:N"`. A path with no scripted link pages has no links;
/// creating one returns `https://www.dropbox.com/s/new<n>/<file>?dl=0`.
#[derive(Default)]
pub struct FakeStorage {
    folder_pages: Vec<Vec<Metadata>>,
    link_pages: HashMap<String, Vec<Vec<SharedLinkMetadata>>>,
    failing_folder_page: Option<usize>,
    failing_links: HashSet<String>,
    failing_create: HashSet<String>,
    cursorless_links: HashSet<String>,
    created: Cell<usize>,
    calls: RefCell<Vec<Call>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder_pages(mut self, pages: Vec<Vec<Metadata>>) -> Self {
        self.folder_pages = pages;
        self
    }

    pub fn with_link_pages(mut self, path: &str, pages: Vec<Vec<SharedLinkMetadata>>) -> Self {
        self.link_pages.insert(path.to_string(), pages);
        self
    }

    /// Fail when folder page `index` is requested (0 = first call).
    pub fn failing_folder_page(mut self, index: usize) -> Self {
        self.failing_folder_page = Some(index);
        self
    }

    pub fn failing_links_for(mut self, path: &str) -> Self {
        self.failing_links.insert(path.to_string());
        self
    }

    pub fn failing_create_for(mut self, path: &str) -> Self {
        self.failing_create.insert(path.to_string());
        self
    }

    /// Link pages for `path` report `has_more` without handing out a cursor.
    pub fn without_link_cursor(mut self, path: &str) -> Self {
        self.cursorless_links.insert(path.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn folder_page(&self, index: usize) -> Result<ListFolderResult, ApiError> {
        if self.failing_folder_page == Some(index) {
            return Err(conflict("files/list_folder"));
        }
        let entries = self.folder_pages.get(index).cloned().unwrap_or_default();
        let has_more = index + 1 < self.folder_pages.len();
        Ok(ListFolderResult {
            entries,
            cursor: format!("folder:{}", index + 1),
            has_more,
        })
    }
}

fn conflict(endpoint: &str) -> ApiError {
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status: 409,
        body: "scripted failure".to_string(),
    }
}

fn cursor_index(cursor: &str) -> usize {
    cursor
        .rsplit(':')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or_else(|| panic!("unexpected cursor '{cursor}'"))
}

impl StorageClient for FakeStorage {
    fn list_folder(&self, path: &str) -> Result<ListFolderResult, ApiError> {
        self.record(Call::ListFolder(path.to_string()));
        self.folder_page(0)
    }

    fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResult, ApiError> {
        self.record(Call::ListFolderContinue(cursor.to_string()));
        self.folder_page(cursor_index(cursor))
    }

    fn list_shared_links(
        &self,
        path: &str,
        cursor: Option<&str>,
    ) -> Result<ListSharedLinksResult, ApiError> {
        self.record(Call::ListLinks(path.to_string(), cursor.map(String::from)));
        if self.failing_links.contains(path) {
            return Err(conflict("sharing/list_shared_links"));
        }
        let pages = self.link_pages.get(path).cloned().unwrap_or_default();
        let index = cursor.map(cursor_index).unwrap_or(0);
        let has_more = index + 1 < pages.len();
        Ok(ListSharedLinksResult {
            links: pages.get(index).cloned().unwrap_or_default(),
            has_more,
            cursor: (has_more && !self.cursorless_links.contains(path))
                .then(|| format!("links:{}", index + 1)),
        })
    }

    fn create_shared_link(&self, path: &str) -> Result<SharedLinkMetadata, ApiError> {
        self.record(Call::CreateLink(path.to_string()));
        if self.failing_create.contains(path) {
            return Err(conflict("sharing/create_shared_link_with_settings"));
        }
        let n = self.created.get() + 1;
        self.created.set(n);
        let name = path.rsplit('/').next().unwrap_or(path);
        Ok(file_link_meta(
            name,
            &format!("https://www.dropbox.com/s/new{n}/{name}?dl=0"),
        ))
    }
}
