//! # Secrets API Client
//!
//! CRUD and visibility operations over `/secrets/{key}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::path_segment;
use crate::constants::AvailabilityState;
use crate::error::ClientResult;
use crate::responses::{decode, ListOptions, ListResponse};
use crate::transport::{ApiRequest, Transport};

/// A key/value pair stored by the manager
///
/// A transient view of server state; nothing is cached client-side.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    pub key: String,
    /// Absent when the server withholds it (e.g. `_include` without `value`)
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Raw value as reported; see [`Secret::availability_state`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Fields this client does not model yet
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("key", &self.key)
            .field("value", &self.value.as_ref().map(|_| "***"))
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("availability", &self.availability)
            .field("tenant_name", &self.tenant_name)
            .field("created_by", &self.created_by)
            .field("extra", &self.extra)
            .finish()
    }
}

impl Secret {
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Reported availability, if it is one this client knows
    pub fn availability_state(&self) -> Option<AvailabilityState> {
        self.availability.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Options for [`SecretsClient::create`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateSecretOptions {
    /// Overwrite the value when the key already exists instead of failing with a conflict
    pub update_if_exists: bool,
    pub availability: AvailabilityState,
}

#[derive(Serialize)]
struct CreateSecretRequest<'a> {
    value: &'a str,
    update_if_exists: bool,
    availability: AvailabilityState,
}

#[derive(Serialize)]
struct UpdateSecretRequest<'a> {
    value: &'a str,
}

#[derive(Serialize)]
struct SetAvailabilityRequest {
    availability: AvailabilityState,
}

/// HTTP client for secret operations
#[derive(Debug, Clone)]
pub struct SecretsClient {
    transport: Arc<dyn Transport>,
}

impl SecretsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create a secret, or overwrite it when `update_if_exists` is set
    pub async fn create(
        &self,
        key: &str,
        value: &str,
        options: CreateSecretOptions,
    ) -> ClientResult<Secret> {
        let path = format!("/secrets/{}", path_segment("secret key", key)?);
        let request = ApiRequest::put(path).with_json(&CreateSecretRequest {
            value,
            update_if_exists: options.update_if_exists,
            availability: options.availability,
        })?;

        debug!(key = %key, availability = %options.availability, "Creating secret");
        let secret = self.call(request).await?;
        info!(key = %secret.key, "Created secret");
        Ok(secret)
    }

    /// Replace the value of an existing secret
    pub async fn update(&self, key: &str, value: &str) -> ClientResult<Secret> {
        let path = format!("/secrets/{}", path_segment("secret key", key)?);
        let request = ApiRequest::patch(path).with_json(&UpdateSecretRequest { value })?;

        debug!(key = %key, "Updating secret");
        self.call(request).await
    }

    /// Fetch a secret; fails with `NotFound` if the key is absent
    pub async fn get(&self, key: &str) -> ClientResult<Secret> {
        let path = format!("/secrets/{}", path_segment("secret key", key)?);
        debug!(key = %key, "Getting secret");
        self.call(ApiRequest::get(path)).await
    }

    /// List secrets in server order, filtered and sorted per `options`
    pub async fn list(&self, options: &ListOptions) -> ClientResult<ListResponse<Secret>> {
        let request = ApiRequest::get("/secrets").with_params(options.to_query_params());

        debug!(params = ?request.params, "Listing secrets");
        let response = self.transport.send(request).await?;
        let secrets: ListResponse<Secret> = decode("secret list", response)?;
        info!("Retrieved {} secrets", secrets.len());
        Ok(secrets)
    }

    /// Delete a secret and return its last known representation
    pub async fn delete(&self, key: &str) -> ClientResult<Secret> {
        let path = format!("/secrets/{}", path_segment("secret key", key)?);
        debug!(key = %key, "Deleting secret");
        let secret = self.call(ApiRequest::delete(path)).await?;
        info!(key = %key, "Deleted secret");
        Ok(secret)
    }

    /// Make a secret visible across all tenants
    pub async fn set_global(&self, key: &str) -> ClientResult<Secret> {
        self.set_availability(key, AvailabilityState::Global).await
    }

    /// Change the visibility scope of a secret
    pub async fn set_availability(
        &self,
        key: &str,
        availability: AvailabilityState,
    ) -> ClientResult<Secret> {
        let path = format!(
            "/secrets/{}/set-availability",
            path_segment("secret key", key)?
        );
        let request = ApiRequest::patch(path).with_json(&SetAvailabilityRequest { availability })?;

        debug!(key = %key, availability = %availability, "Setting secret availability");
        self.call(request).await
    }

    async fn call(&self, request: ApiRequest) -> ClientResult<Secret> {
        let response = self.transport.send(request).await?;
        decode("secret", response)
    }
}
