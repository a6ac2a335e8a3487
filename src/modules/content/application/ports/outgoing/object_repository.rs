use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::content::application::domain::entities::{Object, ObjectMetadata, ObjectStatus};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ObjectRepositoryError {
    #[error("object {0} not found")]
    NotFound(Uuid),

    #[error("object key already in use on backend {backend}: {key}")]
    KeyAlreadyExists { backend: String, key: String },

    #[error("repository failure: {0}")]
    Repository(String),
}

#[derive(Debug, Clone)]
pub struct NewObject {
    pub id: Uuid,
    pub content_id: Uuid,
    pub storage_backend_name: String,
    pub storage_class: String,
    pub object_key: String,
    pub file_name: String,
    pub object_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectPatch {
    pub file_name: Option<String>,
    pub storage_class: Option<String>,
    pub status: Option<ObjectStatus>,
}

#[async_trait]
pub trait ObjectRepository: Send + Sync {
    /// Assigns `version = max(version for content_id) + 1` under a
    /// repository-level lock so concurrent creates never collide.
    async fn create(&self, new_object: NewObject) -> Result<Object, ObjectRepositoryError>;

    async fn update(
        &self,
        id: Uuid,
        patch: ObjectPatch,
    ) -> Result<Object, ObjectRepositoryError>;

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ObjectRepositoryError>;

    async fn set_metadata(
        &self,
        object_id: Uuid,
        metadata: ObjectMetadata,
    ) -> Result<(), ObjectRepositoryError>;
}
