//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user config file overrides only the keys it names.
//!
//! ## Config File Location
//!
//! By default foglio looks for `config.toml` in the platform config directory
//! (`~/.config/foglio/config.toml` on Linux). A different file can be passed
//! with `--config`. When the default file is missing, stock defaults are used.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [dropbox]
//! client_id = ""                        # App key, needed for first authorization
//! client_secret = ""                    # App secret, needed for first authorization
//! folder = "/photo.heyitsalex.net"      # Remote folder holding the photos
//! api_url = "https://api.dropboxapi.com/2"
//!
//! [auth]
//! token_file = "~/.foglioToken"         # Cached access token
//! authorize_url = "https://www.dropbox.com/oauth2/authorize"
//! token_url = "https://api.dropboxapi.com/oauth2/token"
//!
//! [naming]
//! small_suffix = "-small"               # Marks the small variant of a photo
//! extensions = [".jpg", ".png"]         # Stripped from names, first match wins
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Cannot expand [{0}]: home directory unknown")]
    HomeDirectory(String),
}

/// Application configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dropbox app credentials and remote folder.
    pub dropbox: DropboxConfig,
    /// OAuth endpoints and token cache location.
    pub auth: AuthConfig,
    /// Filename conventions used to pair photo variants.
    pub naming: NamingConfig,
}

/// Dropbox app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DropboxConfig {
    /// OAuth client id (the Dropbox "app key").
    pub client_id: String,
    /// OAuth client secret (the Dropbox "app secret").
    pub client_secret: String,
    /// Remote folder whose files become portfolio entries.
    pub folder: String,
    /// Base URL of the Dropbox RPC endpoints.
    pub api_url: String,
}

impl Default for DropboxConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            folder: "/photo.heyitsalex.net".to_string(),
            api_url: "https://api.dropboxapi.com/2".to_string(),
        }
    }
}

/// OAuth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Where the access token is cached. A leading `~/` is expanded.
    pub token_file: String,
    /// Consent page the user visits to obtain an authorization code.
    pub authorize_url: String,
    /// Endpoint exchanging an authorization code for an access token.
    pub token_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_file: "~/.foglioToken".to_string(),
            authorize_url: "https://www.dropbox.com/oauth2/authorize".to_string(),
            token_url: "https://api.dropboxapi.com/oauth2/token".to_string(),
        }
    }
}

/// Naming conventions for photo files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Suffix (before the extension) marking the small variant.
    pub small_suffix: String,
    /// Extensions stripped from file names. Checked in order, at most one is removed.
    pub extensions: Vec<String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            small_suffix: "-small".to_string(),
            extensions: vec![".jpg".to_string(), ".png".to_string()],
        }
    }
}

impl Config {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dropbox.folder.starts_with('/') {
            return Err(ConfigError::Validation(
                "dropbox.folder must be an absolute path starting with '/'".into(),
            ));
        }
        if self.naming.small_suffix.is_empty() {
            return Err(ConfigError::Validation(
                "naming.small_suffix must not be empty".into(),
            ));
        }
        if self.naming.extensions.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "naming.extensions must not contain empty values".into(),
            ));
        }
        for (key, value) in [
            ("dropbox.api_url", &self.dropbox.api_url),
            ("auth.authorize_url", &self.auth.authorize_url),
            ("auth.token_url", &self.auth.token_url),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::Validation(format!(
                    "{key} is not a valid URL: {value}"
                )));
            }
        }
        Ok(())
    }

    /// Token cache path with `~/` expanded.
    pub fn token_path(&self) -> Result<PathBuf, ConfigError> {
        expand_home(&self.auth.token_file)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Load an explicitly requested config file. A missing file is an error.
pub fn load_required_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    load_config(path)
}

/// Default config location in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("net", "heyitsalex", "foglio")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Expand a leading `~` or `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf, ConfigError> {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(path)),
    };
    let home = home_dir().ok_or_else(|| ConfigError::HomeDirectory(path.to_string()))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

fn home_dir() -> Option<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# foglio configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Dropbox app
# ---------------------------------------------------------------------------
[dropbox]
# App key and secret from the Dropbox app console. Only needed the first
# time, when no cached token exists yet.
client_id = ""
client_secret = ""

# Remote folder whose images become portfolio posts.
folder = "/photo.heyitsalex.net"

# Base URL of the Dropbox API.
api_url = "https://api.dropboxapi.com/2"

# ---------------------------------------------------------------------------
# Authorization
# ---------------------------------------------------------------------------
[auth]
# Cached access token. Delete the file (or run `foglio auth --reauthorize`)
# to authorize again.
token_file = "~/.foglioToken"

authorize_url = "https://www.dropbox.com/oauth2/authorize"
token_url = "https://api.dropboxapi.com/oauth2/token"

# ---------------------------------------------------------------------------
# File naming
# ---------------------------------------------------------------------------
[naming]
# `sunset-small.jpg` is the small variant of `sunset.jpg`.
small_suffix = "-small"

# Extensions stripped from file names, checked in order.
extensions = [".jpg", ".png"]
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.dropbox.folder, "/photo.heyitsalex.net");
        assert_eq!(config.auth.token_file, "~/.foglioToken");
        assert_eq!(config.naming.small_suffix, "-small");
        assert_eq!(config.naming.extensions, vec![".jpg", ".png"]);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[dropbox]
client_id = "key"
client_secret = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.dropbox.client_id, "key");
        assert_eq!(config.dropbox.client_secret, "secret");
        // Defaults preserved
        assert_eq!(config.dropbox.folder, "/photo.heyitsalex.net");
        assert_eq!(config.naming.small_suffix, "-small");
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.dropbox.folder, defaults.dropbox.folder);
        assert_eq!(config.auth.token_url, defaults.auth.token_url);
        assert_eq!(config.naming.extensions, defaults.naming.extensions);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.dropbox.folder, "/photo.heyitsalex.net");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[dropbox]
folder = "/portfolio"

[naming]
small_suffix = "_sm"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.dropbox.folder, "/portfolio");
        assert_eq!(config.naming.small_suffix, "_sm");
        assert_eq!(config.naming.extensions, vec![".jpg", ".png"]);
    }

    #[test]
    fn load_required_config_missing_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_required_config(&tmp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[dropbox]\nfolde = \"/typo\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let toml = "[bogus]\nkey = 1\n";
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[naming]\nsmall_suffix = \"-s\"\n").unwrap();
        let merged = merge_toml(base, overlay);
        let naming = merged.get("naming").unwrap();
        assert_eq!(naming.get("small_suffix").unwrap().as_str(), Some("-s"));
        // extensions preserved from base
        assert_eq!(naming.get("extensions").unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn merge_toml_array_replaced_not_merged() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[naming]\nextensions = [\".jpeg\"]\n").unwrap();
        let config: Config = merge_toml(base, overlay).try_into().unwrap();
        assert_eq!(config.naming.extensions, vec![".jpeg"]);
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_relative_folder() {
        let mut config = Config::default();
        config.dropbox.folder = "photos".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_empty_suffix() {
        let mut config = Config::default();
        config.naming.small_suffix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_extension() {
        let mut config = Config::default();
        config.naming.extensions.push(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bad_url() {
        let mut config = Config::default();
        config.auth.token_url = "not a url".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("auth.token_url"));
    }

    // =========================================================================
    // Home expansion
    // =========================================================================

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/out").unwrap(), PathBuf::from("/tmp/out"));
        assert_eq!(expand_home("out/posts").unwrap(), PathBuf::from("out/posts"));
    }

    #[test]
    fn expand_home_tilde_user_form_untouched() {
        assert_eq!(expand_home("~bob/x").unwrap(), PathBuf::from("~bob/x"));
    }

    #[test]
    fn expand_home_replaces_tilde() {
        let home = home_dir().unwrap();
        assert_eq!(expand_home("~").unwrap(), home);
        assert_eq!(expand_home("~/.foglioToken").unwrap(), home.join(".foglioToken"));
    }
}
