use async_trait::async_trait;
use std::collections::HashMap;
use tokio::io::AsyncRead;
use uuid::Uuid;

use crate::content::application::domain::entities::Content;
use crate::content::application::ports::incoming::error::CoreError;
use crate::content::application::ports::outgoing::content_query::PageRequest;

#[derive(Debug, Clone)]
pub struct CreateContentRequest {
    pub tenant_id: String,
    pub owner_id: String,
    pub owner_type: String,
    pub name: String,
    pub description: String,
    pub document_type: String,
    pub derivation_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateContentRequest {
    pub id: Uuid,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteContentOptions {
    pub cascade_objects: bool,
}

/// A single-call creation + upload + metadata reconciliation. The
/// reader is consumed exactly once.
pub struct UploadContentRequest {
    pub tenant_id: String,
    pub owner_id: String,
    pub owner_type: String,
    pub name: String,
    pub document_type: String,
    pub mime_type: Option<String>,
    pub tags: Vec<String>,
    pub custom_metadata: HashMap<String, serde_json::Value>,
    pub storage_backend_name: String,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

pub struct UploadDerivedContentRequest {
    pub parent_id: Uuid,
    pub tenant_id: String,
    pub owner_id: String,
    pub owner_type: String,
    pub name: String,
    pub document_type: String,
    pub mime_type: Option<String>,
    pub derivation_type: String,
    pub variant: String,
    pub derivation_params: HashMap<String, serde_json::Value>,
    pub storage_backend_name: String,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

#[async_trait]
pub trait CoreService: Send + Sync {
    async fn create_content(&self, req: CreateContentRequest) -> Result<Content, CoreError>;

    async fn get_content(&self, id: Uuid) -> Result<Content, CoreError>;

    async fn update_content(&self, req: UpdateContentRequest) -> Result<Content, CoreError>;

    async fn delete_content(&self, id: Uuid, options: DeleteContentOptions) -> Result<(), CoreError>;

    async fn list_content(
        &self,
        tenant_id: &str,
        owner_id: &str,
        page: PageRequest,
    ) -> Result<Vec<Content>, CoreError>;

    async fn upload_content(&self, req: UploadContentRequest) -> Result<Content, CoreError>;

    async fn upload_derived_content(
        &self,
        req: UploadDerivedContentRequest,
    ) -> Result<Content, CoreError>;

    /// Restartable only if the backing BlobStore supports ranged reads;
    /// otherwise single-shot. The pipeline does not pre-buffer: the caller
    /// owns the reader and must close it.
    async fn download_content(
        &self,
        id: Uuid,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, CoreError>;
}
