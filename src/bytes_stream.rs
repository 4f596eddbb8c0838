//! Chunked file streaming for archive uploads.

use futures::stream::{self, Stream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Invoked as `(bytes_sent, total_bytes)` after each chunk is handed to the request body
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// A local file to be sent as a request body in bounded chunks
#[derive(Clone)]
pub struct FileUpload {
    path: PathBuf,
    total_bytes: u64,
    chunk_size: usize,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("path", &self.path)
            .field("total_bytes", &self.total_bytes)
            .field("chunk_size", &self.chunk_size)
            .field("has_progress", &self.progress.is_some())
            .finish()
    }
}

struct StreamState {
    file: File,
    sent: u64,
    buf: Vec<u8>,
}

impl FileUpload {
    /// Stat `path` and prepare it for streaming
    pub async fn open(
        path: impl AsRef<Path>,
        chunk_size: usize,
        progress: Option<ProgressCallback>,
    ) -> ClientResult<Self> {
        let path = path.as_ref().to_path_buf();
        if chunk_size == 0 {
            return Err(ClientError::invalid_input("chunk size must be greater than zero"));
        }

        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(ClientError::invalid_input(format!(
                "'{}' is not a regular file",
                path.display()
            )));
        }

        debug!(path = %path.display(), total_bytes = metadata.len(), "Prepared file upload");

        Ok(Self {
            path,
            total_bytes: metadata.len(),
            chunk_size,
            progress,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Stream exactly `total_bytes` of the file. Progress is reported after
    /// every chunk, or once as `(0, 0)` for an empty file. Bytes appended after
    /// `open` are not sent; a file that shrank fails with `UnexpectedEof`.
    pub fn into_stream(self) -> impl Stream<Item = std::io::Result<Vec<u8>>> + Send + 'static {
        let Self {
            path,
            total_bytes,
            chunk_size,
            progress,
        } = self;

        stream::try_unfold(None::<StreamState>, move |state| {
            let path = path.clone();
            let progress = progress.clone();
            async move {
                let mut state = match state {
                    Some(state) => state,
                    None => StreamState {
                        file: File::open(&path).await?,
                        sent: 0,
                        buf: vec![0u8; chunk_size],
                    },
                };

                let remaining = total_bytes - state.sent;
                if remaining == 0 {
                    if total_bytes == 0 {
                        if let Some(callback) = &progress {
                            callback(0, 0);
                        }
                    }
                    return Ok::<_, std::io::Error>(None);
                }

                let want = remaining.min(chunk_size as u64) as usize;
                let read = state.file.read(&mut state.buf[..want]).await?;
                if read == 0 {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        format!(
                            "'{}' ended after {} of {} bytes",
                            path.display(),
                            state.sent,
                            total_bytes
                        ),
                    ));
                }

                state.sent += read as u64;
                let chunk = state.buf[..read].to_vec();
                if let Some(callback) = &progress {
                    callback(state.sent, total_bytes);
                }
                Ok(Some((chunk, Some(state))))
            }
        })
    }

    /// Drain the stream into memory
    pub async fn read_all(self) -> ClientResult<Vec<u8>> {
        use futures::TryStreamExt;

        let chunks: Vec<Vec<u8>> = self.into_stream().try_collect().await?;
        Ok(chunks.concat())
    }
}
