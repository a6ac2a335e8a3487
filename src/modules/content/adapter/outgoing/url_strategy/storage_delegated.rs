use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::content::application::domain::mime::extension_for;
use crate::content::application::ports::outgoing::blobstore::BlobStore;
use crate::content::application::ports::outgoing::url_strategy::{
    UrlMetadata, UrlStrategy, UrlStrategyError,
};

/// Delegates straight to the backend's own presigner. If the caller didn't
/// supply a file name, one is synthesized as
/// `<content_id>_<yyyymmdd-hhmmss><ext>` so the presigned URL still carries a
/// sensible download name.
#[derive(Clone)]
pub struct StorageDelegatedUrlStrategy {
    backends: Arc<HashMap<String, Arc<dyn BlobStore>>>,
    expiry: Duration,
}

impl StorageDelegatedUrlStrategy {
    pub fn new(backends: Arc<HashMap<String, Arc<dyn BlobStore>>>, expiry: Duration) -> Self {
        Self { backends, expiry }
    }

    fn backend(&self, name: &str) -> Result<Arc<dyn BlobStore>, UrlStrategyError> {
        self.backends
            .get(name)
            .cloned()
            .ok_or_else(|| UrlStrategyError::BackendNotFound(name.to_string()))
    }

    fn synthesize_file_name(content_id: Uuid, content_type: Option<&str>) -> String {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let ext = content_type.and_then(extension_for).unwrap_or("");
        format!("{content_id}_{stamp}{ext}")
    }
}

#[async_trait]
impl UrlStrategy for StorageDelegatedUrlStrategy {
    async fn generate_download_url(
        &self,
        content_id: Uuid,
        object_key: &str,
        backend: &str,
        metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError> {
        let backend = self.backend(backend)?;
        if !backend.capabilities().supports_presign {
            return Err(UrlStrategyError::PresignUnsupported);
        }
        let file_name = metadata
            .as_ref()
            .and_then(|m| m.file_name.clone())
            .unwrap_or_else(|| {
                Self::synthesize_file_name(
                    content_id,
                    metadata.as_ref().and_then(|m| m.content_type.as_deref()),
                )
            });
        backend
            .presign_download_url(object_key, self.expiry, Some(&file_name))
            .await
            .map_err(|e| UrlStrategyError::Storage(e.to_string()))
    }

    async fn generate_preview_url(
        &self,
        content_id: Uuid,
        object_key: &str,
        backend: &str,
        metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError> {
        self.generate_download_url(content_id, object_key, backend, metadata)
            .await
    }

    async fn generate_upload_url(
        &self,
        _content_id: Uuid,
        object_key: &str,
        backend: &str,
        _metadata: Option<UrlMetadata>,
    ) -> Result<String, UrlStrategyError> {
        let backend = self.backend(backend)?;
        if !backend.capabilities().supports_presign {
            return Err(UrlStrategyError::PresignUnsupported);
        }
        backend
            .presign_upload_url(object_key, self.expiry)
            .await
            .map_err(|e| UrlStrategyError::Storage(e.to_string()))
    }
}
