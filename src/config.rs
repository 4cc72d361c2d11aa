//! Configuration and credential loading.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PublishError, Result};

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const DEFAULT_USER_AGENT: &str = "gh-publish";
const CONFIG_DIR: &str = "gh-publish";
const CONFIG_FILE: &str = "config.json";

/// A GitHub bearer token.
///
/// The token is never printed through `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "githubToken")]
    pub github_token: String,
}

impl Config {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PublishError::Config(format!(
                "config file was not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            PublishError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;

        if config.github_token.trim().is_empty() {
            return Err(PublishError::Config(format!(
                "githubToken is empty in {}",
                path.display()
            )));
        }

        Ok(config)
    }

    /// The default configuration location, `<config dir>/gh-publish/config.json`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            PublishError::Config("Cannot determine configuration directory".into())
        })?;
        Ok(dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }
}

/// Supplies the bearer token, possibly re-reading it on every call.
pub trait TokenSource {
    fn load(&self) -> Result<Credential>;
}

/// Reads the token from a JSON configuration file on every load, so edits
/// made between retries take effect.
#[derive(Debug, Clone)]
pub struct FileTokenSource {
    path: PathBuf,
}

impl FileTokenSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenSource for FileTokenSource {
    fn load(&self) -> Result<Credential> {
        log::debug!("Loading GitHub token from {}", self.path.display());
        Config::load(&self.path).map(|config| Credential::new(config.github_token))
    }
}

/// Reads the token from the `GITHUB_TOKEN` environment variable.
#[derive(Debug, Clone, Default)]
pub struct EnvTokenSource;

impl TokenSource for EnvTokenSource {
    fn load(&self) -> Result<Credential> {
        match std::env::var("GITHUB_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Ok(Credential::new(token)),
            _ => Err(PublishError::Config(
                "GITHUB_TOKEN environment variable not set".into(),
            )),
        }
    }
}

/// A fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub Credential);

impl TokenSource for StaticToken {
    fn load(&self) -> Result<Credential> {
        Ok(self.0.clone())
    }
}

/// Settings for the GitHub API client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds; `None` leaves it to the HTTP client.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSettings {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: Some(30),
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }

    /// Point the client at a GitHub Enterprise instance.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        while url.ends_with('/') {
            url.pop();
        }
        self.base_url = url;
        self
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}
