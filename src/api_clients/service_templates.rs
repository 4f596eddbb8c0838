//! # Service Templates API Client
//!
//! ARIA service templates are CSAR archives managed exactly like blueprints,
//! under `/aria-service-templates`.

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

use super::blueprints::{ArchiveResource, ArchiveResourceClient, ArchiveSource, Blueprint, UploadOptions};
use crate::config::DEFAULT_UPLOAD_CHUNK_SIZE;
use crate::error::ClientResult;
use crate::responses::{ListOptions, ListResponse};
use crate::transport::Transport;

/// An uploaded CSAR; carries the same fields as a [`Blueprint`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceTemplate(pub Blueprint);

impl Deref for ServiceTemplate {
    type Target = Blueprint;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ServiceTemplate> for Blueprint {
    fn from(template: ServiceTemplate) -> Self {
        template.0
    }
}

/// `/aria-service-templates`
#[derive(Debug, Clone, Copy)]
pub struct ServiceTemplateResource;

impl ArchiveResource for ServiceTemplateResource {
    const KIND: &'static str = "service template";
    const URI_PREFIX: &'static str = "aria-service-templates";
    const ARCHIVE_URL_PARAM: &'static str = "service_template_csar_url";

    type Entity = ServiceTemplate;
}

/// HTTP client for service template operations
#[derive(Debug, Clone)]
pub struct ServiceTemplatesClient {
    inner: ArchiveResourceClient<ServiceTemplateResource>,
}

impl ServiceTemplatesClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_chunk_size(transport, DEFAULT_UPLOAD_CHUNK_SIZE)
    }

    pub fn with_chunk_size(transport: Arc<dyn Transport>, chunk_size: usize) -> Self {
        Self {
            inner: ArchiveResourceClient::with_chunk_size(transport, chunk_size),
        }
    }

    /// Upload a CSAR from a URL or a local file
    pub async fn upload(
        &self,
        source: impl Into<ArchiveSource>,
        service_template_id: &str,
        options: UploadOptions,
    ) -> ClientResult<ServiceTemplate> {
        self.inner.upload(source, service_template_id, options).await
    }

    pub async fn publish_archive(
        &self,
        archive_location: &str,
        service_template_id: &str,
        options: UploadOptions,
    ) -> ClientResult<ServiceTemplate> {
        self.inner
            .publish_archive(archive_location, service_template_id, options)
            .await
    }

    pub async fn get(&self, service_template_id: &str, include: &[&str]) -> ClientResult<ServiceTemplate> {
        self.inner.get(service_template_id, include).await
    }

    pub async fn list(&self, options: &ListOptions) -> ClientResult<ListResponse<ServiceTemplate>> {
        self.inner.list(options).await
    }

    pub async fn delete(&self, service_template_id: &str) -> ClientResult<ServiceTemplate> {
        self.inner.delete(service_template_id).await
    }
}
