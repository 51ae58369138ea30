//! Access token acquisition.
//!
//! foglio authorizes once and then reuses the token indefinitely:
//!
//! 1. If the token cache file exists and is non-empty, its contents are the
//!    token, verbatim. Nothing checks that the token is still valid.
//! 2. Otherwise the OAuth authorization-code flow runs: the user is sent to
//!    the consent page, pastes back the code, and the code is exchanged for an
//!    access token at the token endpoint.
//! 3. The new token is written to the cache file. A failed write is only
//!    logged; the token is still returned for the current run.
//!
//! The two interactive/remote steps are capabilities so the flow can be driven
//! without a terminal or network:
//!
//! - [`AuthorizationPrompt`] shows the consent URL and returns the code
//!   ([`StdinPrompt`] in production).
//! - [`CodeExchange`] trades a code for a token ([`OAuthClient`] in production).

use crate::config::{Config, ConfigError};
use crate::dropbox::{self, ApiError};
use crate::types::AccessToken;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

const TOKEN_ENDPOINT: &str = "oauth2/token";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Error expanding path for token file: {0}")]
    TokenPath(#[from] ConfigError),
    #[error("dropbox.client_id and dropbox.client_secret must be configured to authorize")]
    MissingClientCredentials,
    #[error("Invalid authorization URL: {0}")]
    AuthorizeUrl(#[from] url::ParseError),
    #[error("Error getting code: {0}")]
    Prompt(#[source] io::Error),
    #[error("Error getting token from code [{code}]: {source}")]
    Exchange {
        code: String,
        #[source]
        source: ApiError,
    },
}

/// OAuth client registration and endpoints.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
}

impl OAuthSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client_id: config.dropbox.client_id.clone(),
            client_secret: config.dropbox.client_secret.clone(),
            authorize_url: config.auth.authorize_url.clone(),
            token_url: config.auth.token_url.clone(),
        }
    }

    /// Consent page URL for the authorization-code flow.
    pub fn authorization_url(&self) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &self.authorize_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("state", "state"),
            ],
        )
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Shows the consent URL to the user and returns the authorization code.
pub trait AuthorizationPrompt {
    fn request_code(&self, authorize_url: &str) -> io::Result<String>;
}

/// Exchanges an authorization code for an access token.
pub trait CodeExchange {
    fn exchange(&self, settings: &OAuthSettings, code: &str) -> Result<AccessToken, ApiError>;
}

/// Prints the URL to stdout and reads one line from stdin.
pub struct StdinPrompt;

impl AuthorizationPrompt for StdinPrompt {
    fn request_code(&self, authorize_url: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "Visit the URL for the auth dialog: {authorize_url}")?;
        write!(stdout, "Enter code: ")?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no authorization code entered",
            ));
        }
        Ok(line.trim().to_string())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Token endpoint client using HTTP basic client authentication.
pub struct OAuthClient {
    http: Client,
}

impl OAuthClient {
    pub fn new() -> Result<Self, ApiError> {
        Ok(Self {
            http: Client::builder().build()?,
        })
    }
}

impl CodeExchange for OAuthClient {
    fn exchange(&self, settings: &OAuthSettings, code: &str) -> Result<AccessToken, ApiError> {
        debug!(url = %settings.token_url, "exchanging authorization code");
        let response = self
            .http
            .post(&settings.token_url)
            .basic_auth(&settings.client_id, Some(&settings.client_secret))
            .form(&[("grant_type", "authorization_code"), ("code", code)])
            .send()?;
        let body = dropbox::success_body(TOKEN_ENDPOINT, response)?;
        let token: TokenResponse = dropbox::decode(TOKEN_ENDPOINT, &body)?;
        Ok(AccessToken::new(token.access_token))
    }
}

// ============================================================================
// Token provider
// ============================================================================

/// Hands out the access token, authorizing interactively when needed.
pub struct TokenProvider<'a> {
    token_path: PathBuf,
    settings: OAuthSettings,
    prompt: &'a dyn AuthorizationPrompt,
    exchange: &'a dyn CodeExchange,
}

impl<'a> TokenProvider<'a> {
    pub fn new(
        token_path: PathBuf,
        settings: OAuthSettings,
        prompt: &'a dyn AuthorizationPrompt,
        exchange: &'a dyn CodeExchange,
    ) -> Self {
        Self {
            token_path,
            settings,
            prompt,
            exchange,
        }
    }

    /// Build a provider from config, expanding the token cache path.
    pub fn from_config(
        config: &Config,
        prompt: &'a dyn AuthorizationPrompt,
        exchange: &'a dyn CodeExchange,
    ) -> Result<Self, AuthError> {
        Ok(Self::new(
            config.token_path()?,
            OAuthSettings::from_config(config),
            prompt,
            exchange,
        ))
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Cached token if present, otherwise a freshly authorized one.
    pub fn access_token(&self) -> Result<AccessToken, AuthError> {
        if let Some(token) = self.cached_token() {
            debug!(path = %self.token_path.display(), "using cached token");
            return Ok(token);
        }
        self.authorize()
    }

    /// Contents of the token cache file, if it exists and is non-empty.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than discarding the
    /// cache. Read failures other than a missing file are logged.
    pub fn cached_token(&self) -> Option<AccessToken> {
        let bytes = match fs::read(&self.token_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(
                    path = %self.token_path.display(),
                    error = %e,
                    "error reading token file"
                );
                return None;
            }
        };
        if bytes.is_empty() {
            return None;
        }
        Some(AccessToken::new(String::from_utf8_lossy(&bytes)))
    }

    /// Run the authorization-code flow, ignoring any cached token.
    pub fn authorize(&self) -> Result<AccessToken, AuthError> {
        if self.settings.client_id.is_empty() || self.settings.client_secret.is_empty() {
            return Err(AuthError::MissingClientCredentials);
        }

        let url = self.settings.authorization_url()?;
        let code = self
            .prompt
            .request_code(url.as_str())
            .map_err(AuthError::Prompt)?;

        let token = self
            .exchange
            .exchange(&self.settings, &code)
            .map_err(|source| AuthError::Exchange { code, source })?;

        if let Err(e) = save_token(&self.token_path, &token) {
            warn!(
                path = %self.token_path.display(),
                error = %e,
                "error saving token to file"
            );
        }
        Ok(token)
    }
}

/// Write the token cache, readable by the owner only.
fn save_token(path: &Path, token: &AccessToken) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)?.write_all(token.as_str().as_bytes())
}
