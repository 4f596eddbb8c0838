//! # Test Utilities
//!
//! A [`Transport`] that records every request and replays canned responses,
//! so resource clients can be exercised without a manager.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

use crate::error::{ClientError, ClientResult};
use crate::transport::{ApiRequest, RequestBody, Transport};

/// A request as seen by [`RecordingTransport`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request: ApiRequest,
    /// Bytes of a streamed file body, drained while recording
    pub file_bytes: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
enum CannedResponse {
    Json(Value),
    Error { status: u16, message: String },
}

/// Records requests and replays queued responses in order
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<VecDeque<CannedResponse>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful JSON response
    pub fn respond_with(&self, body: Value) -> &Self {
        self.responses.lock().push_back(CannedResponse::Json(body));
        self
    }

    /// Queue an HTTP failure
    pub fn fail_with(&self, status: u16, message: impl Into<String>) -> &Self {
        self.responses.lock().push_back(CannedResponse::Error {
            status,
            message: message.into(),
        });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request
    ///
    /// # Panics
    ///
    /// Panics if nothing has been sent yet.
    pub fn last_request(&self) -> RecordedRequest {
        self.requests
            .lock()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn endpoint(&self) -> &str {
        "recording://"
    }

    async fn send(&self, request: ApiRequest) -> ClientResult<Value> {
        let file_bytes = match &request.body {
            RequestBody::File(upload) => Some(upload.clone().read_all().await?),
            _ => None,
        };
        self.requests.lock().push(RecordedRequest {
            request,
            file_bytes,
        });

        match self.responses.lock().pop_front() {
            Some(CannedResponse::Json(body)) => Ok(body),
            Some(CannedResponse::Error { status, message }) => {
                Err(ClientError::from_status(status, message, None))
            }
            None => Ok(Value::Null),
        }
    }
}
