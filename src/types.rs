//! Shared types passed between pipeline stages.
//!
//! Listing produces [`RemoteFile`]s, link resolution turns them into
//! [`ShareLink`]s, and every remote call is authorized by an [`AccessToken`].

use std::fmt;

/// Opaque OAuth access token.
///
/// Never expires from foglio's point of view: once cached it is reused until
/// the cache file is removed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// A plain file found in the remote folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// File name as displayed, e.g. `Sunset.jpg`.
    pub name: String,
    /// Lower-cased full path, used to scope link queries.
    pub path_lower: String,
}

/// A public link to one remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    /// Name of the linked file.
    pub name: String,
    /// Public URL as returned by the sharing API.
    pub url: String,
    /// True when the link was created during this run.
    pub created: bool,
}
