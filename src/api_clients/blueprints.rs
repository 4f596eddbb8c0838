//! # Archive Resource Clients
//!
//! Blueprints and service templates are both uploaded as archives to
//! `PUT /{prefix}/{id}`, either streamed from a local file or registered by
//! URL for the manager to fetch. [`ArchiveResourceClient`] implements that
//! flow once; each collection supplies its prefix, URL parameter and entity
//! type through [`ArchiveResource`].

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::path_segment;
use crate::bytes_stream::{FileUpload, ProgressCallback};
use crate::config::DEFAULT_UPLOAD_CHUNK_SIZE;
use crate::constants::AvailabilityState;
use crate::error::ClientResult;
use crate::responses::{decode, ListOptions, ListResponse};
use crate::transport::{ApiRequest, Transport};

/// Escapes everything but alphanumerics and `_.-~/`
const FILE_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// A collection of archive-backed entities
pub trait ArchiveResource: Send + Sync + 'static {
    /// Human-readable name used in logs and validation errors
    const KIND: &'static str;
    /// Collection path, without slashes
    const URI_PREFIX: &'static str;
    /// Query parameter carrying a remote archive URL
    const ARCHIVE_URL_PARAM: &'static str;

    type Entity: DeserializeOwned + Send;
}

/// Where an archive comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
    /// Registered by URL; the manager downloads it
    Url(String),
    /// Streamed from the local filesystem
    LocalPath(PathBuf),
}

impl ArchiveSource {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::LocalPath(path.into())
    }

    /// Guess the source kind from a bare string.
    ///
    /// A location is a URL when it parses with a scheme of two or more
    /// characters and nothing exists at that path locally. Single-letter
    /// schemes are Windows drive letters (`C:\archive.zip`). Prefer the explicit
    /// constructors when the caller knows which one it has.
    pub fn infer(location: &str) -> Self {
        let has_url_scheme = Url::parse(location)
            .map(|url| url.scheme().len() > 1)
            .unwrap_or(false);

        if has_url_scheme && !Path::new(location).exists() {
            Self::Url(location.to_string())
        } else {
            Self::LocalPath(PathBuf::from(location))
        }
    }
}

impl From<PathBuf> for ArchiveSource {
    fn from(path: PathBuf) -> Self {
        Self::LocalPath(path)
    }
}

impl From<&Path> for ArchiveSource {
    fn from(path: &Path) -> Self {
        Self::LocalPath(path.to_path_buf())
    }
}

impl From<Url> for ArchiveSource {
    fn from(url: Url) -> Self {
        Self::Url(url.to_string())
    }
}

/// Options for archive uploads
#[derive(Clone, Default)]
pub struct UploadOptions {
    /// Main file inside the archive; percent-encoded before sending
    pub application_file_name: Option<String>,
    pub private_resource: bool,
    /// Called with `(bytes_sent, total_bytes)` while a local file streams
    pub progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOptions")
            .field("application_file_name", &self.application_file_name)
            .field("private_resource", &self.private_resource)
            .field("has_progress", &self.progress.is_some())
            .finish()
    }
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn application_file_name(mut self, name: impl Into<String>) -> Self {
        self.application_file_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn private_resource(mut self, private_resource: bool) -> Self {
        self.private_resource = private_resource;
        self
    }

    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }
}

/// An uploaded blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: String,
    #[serde(default)]
    pub main_file_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Parsed deployment plan, when requested
    #[serde(default)]
    pub plan: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Raw value as reported; see [`Blueprint::availability_state`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Blueprint {
    /// Reported availability, if it is one this client knows
    pub fn availability_state(&self) -> Option<AvailabilityState> {
        self.availability.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Generic client for an archive-backed collection
pub struct ArchiveResourceClient<R: ArchiveResource> {
    transport: Arc<dyn Transport>,
    chunk_size: usize,
    _resource: PhantomData<fn() -> R>,
}

impl<R: ArchiveResource> Clone for ArchiveResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            chunk_size: self.chunk_size,
            _resource: PhantomData,
        }
    }
}

impl<R: ArchiveResource> std::fmt::Debug for ArchiveResourceClient<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveResourceClient")
            .field("resource", &R::KIND)
            .field("uri_prefix", &R::URI_PREFIX)
            .field("transport", &self.transport)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl<R: ArchiveResource> ArchiveResourceClient<R> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_chunk_size(transport, DEFAULT_UPLOAD_CHUNK_SIZE)
    }

    pub fn with_chunk_size(transport: Arc<dyn Transport>, chunk_size: usize) -> Self {
        Self {
            transport,
            chunk_size,
            _resource: PhantomData,
        }
    }

    fn entity_path(id: &str) -> ClientResult<String> {
        Ok(format!(
            "/{}/{}",
            R::URI_PREFIX,
            path_segment(&format!("{} id", R::KIND), id)?
        ))
    }

    /// Upload an archive under `id`; the manager answers 201 on success
    pub async fn upload(
        &self,
        source: impl Into<ArchiveSource>,
        id: &str,
        options: UploadOptions,
    ) -> ClientResult<R::Entity> {
        let mut request = ApiRequest::put(Self::entity_path(id)?)
            .with_param("private_resource", options.private_resource.to_string())
            .expect_status(201);

        if let Some(name) = &options.application_file_name {
            request = request.with_param(
                "application_file_name",
                utf8_percent_encode(name, FILE_NAME).to_string(),
            );
        }

        request = match source.into() {
            ArchiveSource::Url(url) => {
                debug!(kind = R::KIND, id = %id, url = %url, "Registering archive by URL");
                request.with_param(R::ARCHIVE_URL_PARAM, url)
            }
            ArchiveSource::LocalPath(path) => {
                let upload = FileUpload::open(&path, self.chunk_size, options.progress).await?;
                debug!(
                    kind = R::KIND,
                    id = %id,
                    path = %path.display(),
                    total_bytes = upload.total_bytes(),
                    "Uploading archive"
                );
                request.with_file(upload)
            }
        };

        let response = self.transport.send(request).await?;
        info!(kind = R::KIND, id = %id, "Uploaded archive");
        decode(R::KIND, response)
    }

    /// Upload an archive given only its location, guessing URL vs. local path
    pub async fn publish_archive(
        &self,
        archive_location: &str,
        id: &str,
        options: UploadOptions,
    ) -> ClientResult<R::Entity> {
        self.upload(ArchiveSource::infer(archive_location), id, options)
            .await
    }

    /// Fetch one entity, optionally restricted to `include` fields
    pub async fn get(&self, id: &str, include: &[&str]) -> ClientResult<R::Entity> {
        let mut request = ApiRequest::get(Self::entity_path(id)?);
        if !include.is_empty() {
            request = request.with_param("_include", include.join(","));
        }

        debug!(kind = R::KIND, id = %id, "Getting entity");
        let response = self.transport.send(request).await?;
        decode(R::KIND, response)
    }

    pub async fn list(&self, options: &ListOptions) -> ClientResult<ListResponse<R::Entity>> {
        let request =
            ApiRequest::get(format!("/{}", R::URI_PREFIX)).with_params(options.to_query_params());

        debug!(kind = R::KIND, params = ?request.params, "Listing entities");
        let response = self.transport.send(request).await?;
        let entities: ListResponse<R::Entity> =
            decode(&format!("{} list", R::KIND), response)?;
        info!(kind = R::KIND, "Retrieved {} entities", entities.len());
        Ok(entities)
    }

    /// Delete an entity and return its last known representation
    pub async fn delete(&self, id: &str) -> ClientResult<R::Entity> {
        debug!(kind = R::KIND, id = %id, "Deleting entity");
        let response = self
            .transport
            .send(ApiRequest::delete(Self::entity_path(id)?))
            .await?;
        info!(kind = R::KIND, id = %id, "Deleted entity");
        decode(R::KIND, response)
    }
}

/// `/blueprints`
#[derive(Debug, Clone, Copy)]
pub struct BlueprintResource;

impl ArchiveResource for BlueprintResource {
    const KIND: &'static str = "blueprint";
    const URI_PREFIX: &'static str = "blueprints";
    const ARCHIVE_URL_PARAM: &'static str = "blueprint_archive_url";

    type Entity = Blueprint;
}

pub type BlueprintsClient = ArchiveResourceClient<BlueprintResource>;
