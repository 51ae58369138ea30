//! # Foglio
//!
//! Turns a Dropbox folder of photos into markdown posts for a static site.
//! Each photo is uploaded in two sizes; foglio pairs the two files, makes sure
//! both have a public link, and renders one post per photo from a template.
//!
//! # Architecture: Five-Step Pipeline
//!
//! A run is a single linear pass. Each step consumes the previous step's
//! output and any error aborts the run:
//!
//! ```text
//! 1. Auth       token cache / OAuth   →  AccessToken
//! 2. List       remote folder         →  Vec<RemoteFile>
//! 3. Link       files                 →  Vec<ShareLink>      (creates missing links)
//! 4. Assemble   links                 →  Vec<PortfolioElement>
//! 5. Generate   elements + template   →  <output>/<title>.md
//! ```
//!
//! Only steps 1-3 talk to the network, and they do so through traits
//! ([`dropbox::StorageClient`], [`auth::AuthorizationPrompt`],
//! [`auth::CodeExchange`]) so the whole pipeline runs against in-memory fakes
//! in tests. Steps 4 and 5 are plain functions of their inputs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`auth`] | Step 1: cached token or interactive authorization-code flow |
//! | [`listing`] | Step 2: paginated folder listing, files only |
//! | [`links`] | Step 3: existing or newly created shared links per file |
//! | [`portfolio`] | Step 4: pairs small/large variants into titled elements |
//! | [`posts`] | Step 5: renders and writes one post per complete element |
//! | [`template`] | `[[field]]` templates compiled to Tera |
//! | [`dropbox`] | Dropbox RPC client and wire types |
//! | [`config`] | `config.toml` loading, validation, and merging over defaults |
//! | [`types`] | Types shared between steps (`AccessToken`, `RemoteFile`, `ShareLink`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Square-Bracket Template Fields
//!
//! Posts are usually consumed by another site generator (Hugo, Jekyll) whose
//! own syntax is `{{ }}`. Template fields are written `[[name]]` so that text
//! passes through untouched and the same file can hold both.
//!
//! ## Links Are Created, Never Removed
//!
//! A file without a shared link gets one. foglio never revokes links, and a
//! failed run leaves any links it created in place. Running it again is safe:
//! existing links are reused.
//!
//! ## Skips Are Not Errors
//!
//! A photo with only one size uploaded is reported and left out. Everything
//! else that goes wrong (network, API status, template, file write) stops the
//! run with a non-zero exit.

pub mod auth;
pub mod config;
pub mod dropbox;
pub mod links;
pub mod listing;
pub mod output;
pub mod portfolio;
pub mod posts;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
