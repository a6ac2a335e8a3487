use async_trait::async_trait;
use tokio::io::AsyncRead;
use uuid::Uuid;

use crate::content::application::domain::entities::{Object, ObjectMetadata};
use crate::content::application::ports::incoming::error::CoreError;

#[derive(Debug, Clone)]
pub struct CreateObjectRequest {
    pub content_id: Uuid,
    pub storage_backend_name: String,
    pub storage_class: String,
    pub file_name: String,
    pub object_type: String,
    /// Present only when deriving a key for a specific variant; otherwise
    /// the original's key carries no variant segment.
    pub variant: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateObjectRequest {
    pub id: Uuid,
    pub file_name: Option<String>,
    pub storage_class: Option<String>,
}

/// Second interface exposed by the same service value as `CoreService`,
/// covering the per-object operations and URL generation.
#[async_trait]
pub trait StorageService: Send + Sync {
    async fn create_object(&self, req: CreateObjectRequest) -> Result<Object, CoreError>;

    async fn get_object(&self, id: Uuid) -> Result<Object, CoreError>;

    async fn get_objects_by_content_id(&self, content_id: Uuid) -> Result<Vec<Object>, CoreError>;

    async fn update_object(&self, req: UpdateObjectRequest) -> Result<Object, CoreError>;

    async fn delete_object(&self, id: Uuid) -> Result<(), CoreError>;

    async fn get_object_metadata(&self, id: Uuid) -> Result<ObjectMetadata, CoreError>;

    async fn set_object_metadata(
        &self,
        id: Uuid,
        metadata: ObjectMetadata,
    ) -> Result<(), CoreError>;

    async fn upload_object(
        &self,
        id: Uuid,
        reader: Box<dyn AsyncRead + Send + Unpin>,
    ) -> Result<(), CoreError>;

    async fn upload_object_with_metadata(
        &self,
        id: Uuid,
        reader: Box<dyn AsyncRead + Send + Unpin>,
        mime_type: Option<String>,
    ) -> Result<(), CoreError>;

    async fn download_object(
        &self,
        id: Uuid,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, CoreError>;

    /// Reconciles `ObjectMetadata` with a fresh `BlobStore::stat` call.
    async fn update_object_meta_from_storage(&self, id: Uuid) -> Result<ObjectMetadata, CoreError>;

    async fn get_upload_url(&self, id: Uuid) -> Result<String, CoreError>;

    async fn get_download_url(&self, id: Uuid) -> Result<String, CoreError>;

    async fn get_preview_url(&self, id: Uuid) -> Result<String, CoreError>;
}
