use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tokio::io::AsyncRead;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum BlobStoreError {
    #[error("object key not found")]
    NotFound,

    #[error("backend I/O failure: {0}")]
    Io(String),

    #[error("operation timed out")]
    Timeout,

    #[error("backend does not support this operation")]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobStat {
    pub size_bytes: i64,
    pub etag: String,
    pub mime_type: Option<String>,
}

/// Capability bits a backend declares up front so the service and
/// URLStrategy never have to probe for support at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobStoreCapabilities {
    pub supports_presign: bool,
    pub supports_range: bool,
}

/// A byte-addressable store keyed by an opaque object key. Implementations:
/// in-memory (mutex-guarded map), filesystem (one file per key), S3/MinIO.
/// Upload is at-least-once from the caller's viewpoint: backends must be
/// idempotent when given identical `(key, bytes)`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> BlobStoreCapabilities;

    async fn upload(
        &self,
        key: &str,
        reader: Box<dyn AsyncRead + Send + Unpin>,
    ) -> Result<(), BlobStoreError>;

    async fn download(
        &self,
        key: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, BlobStoreError>;

    /// Convenience for callers that already hold the full payload in memory
    /// (used heavily by the in-process test harness and small uploads).
    async fn download_bytes(&self, key: &str) -> Result<Bytes, BlobStoreError>;

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;

    async fn stat(&self, key: &str) -> Result<BlobStat, BlobStoreError>;

    async fn presign_upload_url(
        &self,
        key: &str,
        expiry: Duration,
    ) -> Result<String, BlobStoreError> {
        let _ = (key, expiry);
        Err(BlobStoreError::Unsupported)
    }

    /// `file_name`, when given, asks the backend to suggest it as the
    /// saved-as name (e.g. via `response-content-disposition`) on the
    /// presigned URL.
    async fn presign_download_url(
        &self,
        key: &str,
        expiry: Duration,
        file_name: Option<&str>,
    ) -> Result<String, BlobStoreError> {
        let _ = (key, expiry, file_name);
        Err(BlobStoreError::Unsupported)
    }
}
