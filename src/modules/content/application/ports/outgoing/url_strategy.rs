use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum UrlStrategyError {
    #[error("backend {0} not found")]
    BackendNotFound(String),

    #[error("backend does not support presigning")]
    PresignUnsupported,

    #[error("url generation timed out")]
    Timeout,

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Optional hints a caller may supply; `file_name`/`content_type` override
/// what would otherwise be derived from stored metadata.
#[derive(Debug, Clone, Default)]
pub struct UrlMetadata {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub version: Option<i32>,
}

/// Produces download/preview/upload URLs under one of three policies: CDN,
/// content-based (application endpoints), or storage-delegated (presigned).
/// A strategy must be pure over its inputs plus its configured secrets and
/// must never mutate Object rows.
#[async_trait]
pub trait UrlStrategy: Send + Sync {
    async fn generate_download_url(
        &self,
        content_id: Uuid,
        object_key: &str,
        backend: &str,
        metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError>;

    async fn generate_preview_url(
        &self,
        content_id: Uuid,
        object_key: &str,
        backend: &str,
        metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError>;

    async fn generate_upload_url(
        &self,
        content_id: Uuid,
        object_key: &str,
        backend: &str,
        metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError>;
}
