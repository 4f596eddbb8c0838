//! # Client Configuration
//!
//! Configuration for connecting to a manager's REST API.
//! Supports environment variables, config files, and programmatic construction.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Default size of each chunk streamed during local archive uploads
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 8192;

/// Client configuration for API connections
///
/// # Examples
///
/// ```rust
/// use cloudify_rest_client::config::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.base_url, "http://localhost/api/v3.1");
/// assert_eq!(config.timeout_ms, 30000);
/// ```
///
/// ```rust,no_run
/// use cloudify_rest_client::config::ClientConfig;
///
/// // Load configuration from environment and config files
/// let config = ClientConfig::load().expect("Failed to load config");
/// println!("Manager URL: {}", config.base_url);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL including the API version prefix (e.g., "<https://manager/api/v3.1>")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Tenant the requests are scoped to (sent as the `Tenant` header)
    pub tenant: Option<String>,
    /// Chunk size used when streaming local archives
    pub upload_chunk_size: usize,
    /// Credentials sent with every request
    pub auth: Option<AuthConfig>,
}

/// Manager credentials
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Pre-issued token, sent as `Authentication-Token`
    Token { token: String },
    /// HTTP basic auth
    Basic { username: String, password: String },
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::Token { .. } => f.debug_struct("Token").field("token", &"***").finish(),
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("auth", &self.auth)
            .field("tenant", &self.tenant)
            .field("upload_chunk_size", &self.upload_chunk_size)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/api/v3.1".to_string(),
            timeout_ms: 30000,
            auth: None,
            tenant: None,
            upload_chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `base_url` with every other setting defaulted
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(AuthConfig::Token {
            token: token.into(),
        });
        self
    }

    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(AuthConfig::Basic {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Load configuration from environment variables and config file
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file (./cloudify-client.toml, ~/.cloudify/client.toml)
    /// 3. Default values
    pub fn load() -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(config_path) = Self::find_config_file() {
            debug!("Loading config from: {}", config_path.display());
            match Self::load_from_file(&config_path) {
                Ok(file_config) => config = file_config,
                Err(e) => {
                    debug!("Failed to load config file: {}", e);
                }
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        debug!("Loaded client configuration: {:?}", config);
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::config_error(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ClientError::config_error(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        let mut possible_paths = vec![
            PathBuf::from("./cloudify-client.toml"),
            PathBuf::from("./config/cloudify-client.toml"),
        ];
        if let Some(home) = dirs::home_dir() {
            possible_paths.push(home.join(".cloudify").join("client.toml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            possible_paths.push(config_dir.join("cloudify").join("client.toml"));
        }

        possible_paths.into_iter().find(|path| path.is_file())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("CLOUDIFY_BASE_URL") {
            self.base_url = url;
        }
        if let Some(timeout_ms) = lookup("CLOUDIFY_TIMEOUT_MS").and_then(|t| t.parse().ok()) {
            self.timeout_ms = timeout_ms;
        }
        if let Some(tenant) = lookup("CLOUDIFY_TENANT") {
            self.tenant = Some(tenant);
        }

        if let Some(token) = lookup("CLOUDIFY_TOKEN") {
            self.auth = Some(AuthConfig::Token { token });
        } else if let (Some(username), Some(password)) =
            (lookup("CLOUDIFY_USERNAME"), lookup("CLOUDIFY_PASSWORD"))
        {
            self.auth = Some(AuthConfig::Basic { username, password });
        }
    }

    /// Check that the configuration can produce a working transport
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::config_error(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::config_error(format!(
                "Unsupported scheme '{}' in base URL",
                url.scheme()
            )));
        }
        if self.upload_chunk_size == 0 {
            return Err(ClientError::config_error(
                "upload_chunk_size must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> ClientResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClientError::config_error(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ClientError::config_error(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            ClientError::config_error(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get default config file path
    pub fn default_config_path() -> ClientResult<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| ClientError::config_error("Could not determine home directory"))?;

        Ok(home_dir.join(".cloudify").join("client.toml"))
    }
}
