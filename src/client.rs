//! # Manager Client
//!
//! Entry point that owns one transport and hands out the resource clients
//! bound to it.

use std::sync::Arc;

use crate::api_clients::{BlueprintsClient, SecretsClient, ServiceTemplatesClient};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::transport::{RestTransport, Transport};

/// Client for a single manager
///
/// # Examples
///
/// ```rust,no_run
/// use cloudify_rest_client::{ClientConfig, CloudifyClient, CreateSecretOptions};
///
/// # async fn example() -> cloudify_rest_client::ClientResult<()> {
/// let config = ClientConfig::new("https://manager.example.com/api/v3.1")
///     .with_basic_auth("admin", "admin")
///     .with_tenant("default_tenant");
/// let client = CloudifyClient::new(config)?;
///
/// let secret = client
///     .secrets()
///     .create("db_password", "s3cr3t", CreateSecretOptions::default())
///     .await?;
/// println!("created {}", secret.key);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CloudifyClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl CloudifyClient {
    /// Create a client talking REST to `config.base_url`
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let transport = Arc::new(RestTransport::new(&config)?);
        Ok(Self { transport, config })
    }

    /// Create a client from environment variables and config files
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::load()?)
    }

    /// Create a client over a caller-supplied transport
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    pub fn secrets(&self) -> SecretsClient {
        SecretsClient::new(Arc::clone(&self.transport))
    }

    pub fn blueprints(&self) -> BlueprintsClient {
        BlueprintsClient::with_chunk_size(Arc::clone(&self.transport), self.config.upload_chunk_size)
    }

    pub fn service_templates(&self) -> ServiceTemplatesClient {
        ServiceTemplatesClient::with_chunk_size(
            Arc::clone(&self.transport),
            self.config.upload_chunk_size,
        )
    }
}
