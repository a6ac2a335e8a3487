use async_trait::async_trait;
use uuid::Uuid;

use crate::content::application::domain::entities::{Object, ObjectMetadata};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ObjectQueryError {
    #[error("query failure: {0}")]
    Repository(String),
}

#[async_trait]
pub trait ObjectQuery: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Object>, ObjectQueryError>;

    /// All non-deleted objects for a content, ordered by `version desc`.
    async fn list_by_content_id(&self, content_id: Uuid) -> Result<Vec<Object>, ObjectQueryError>;

    async fn get_metadata(&self, object_id: Uuid) -> Result<Option<ObjectMetadata>, ObjectQueryError>;
}
