use async_trait::async_trait;
use uuid::Uuid;

use crate::content::application::domain::entities::ContentMetadata;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ContentMetadataRepositoryError {
    #[error("repository failure: {0}")]
    Repository(String),
}

#[async_trait]
pub trait ContentMetadataRepository: Send + Sync {
    async fn get(
        &self,
        content_id: Uuid,
    ) -> Result<Option<ContentMetadata>, ContentMetadataRepositoryError>;

    /// Idempotent create-or-merge: fields already set on the stored row are
    /// only overwritten when the caller supplies a new value.
    async fn upsert(
        &self,
        metadata: ContentMetadata,
    ) -> Result<ContentMetadata, ContentMetadataRepositoryError>;
}
