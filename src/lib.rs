#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Cloudify REST Client
//!
//! Typed async client for a Cloudify manager's REST API.
//!
//! Each operation builds one request, sends it through a [`Transport`], and
//! wraps the JSON response in a typed entity. The client holds no state
//! beyond its configuration; every call round-trips to the manager.
//!
//! ## Module Organization
//!
//! - [`api_clients`] - Secrets, blueprints and ARIA service template clients
//! - [`transport`] - Request description and the reqwest-backed transport
//! - [`config`] - Connection configuration (files, environment, builders)
//! - [`error`] - Structured error handling
//! - [`responses`] - List responses and list query options
//! - [`bytes_stream`] - Chunked file streaming for archive uploads
//! - [`logging`] - Optional tracing subscriber setup
//! - [`testing`] - Recording transport for tests

pub mod api_clients;
pub mod bytes_stream;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod responses;
pub mod testing;
pub mod transport;

// Re-export commonly used types for convenience
pub use api_clients::{
    ArchiveSource, Blueprint, BlueprintsClient, CreateSecretOptions, Secret, SecretsClient,
    ServiceTemplate, ServiceTemplatesClient, UploadOptions,
};
pub use client::CloudifyClient;
pub use config::{AuthConfig, ClientConfig};
pub use constants::AvailabilityState;
pub use error::{ClientError, ClientResult};
pub use responses::{ListOptions, ListResponse};
pub use transport::{RestTransport, Transport};
