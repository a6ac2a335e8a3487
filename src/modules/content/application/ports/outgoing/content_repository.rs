use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::content::application::domain::entities::{Content, ContentStatus};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ContentRepositoryError {
    #[error("content {0} not found")]
    NotFound(Uuid),

    #[error("content {0} already exists")]
    AlreadyExists(Uuid),

    #[error("refused transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("repository failure: {0}")]
    Repository(String),
}

#[derive(Debug, Clone)]
pub struct NewContent {
    pub id: Uuid,
    pub tenant_id: String,
    pub owner_id: String,
    pub owner_type: String,
    pub name: String,
    pub description: String,
    pub document_type: String,
    pub derivation_type: String,
}

/// Fields that may be patched on an existing Content row. `None` leaves the
/// field untouched; status changes are validated against the transition
/// table before being applied.
#[derive(Debug, Clone, Default)]
pub struct ContentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ContentStatus>,
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn create(&self, new_content: NewContent) -> Result<Content, ContentRepositoryError>;

    async fn update(
        &self,
        id: Uuid,
        patch: ContentPatch,
    ) -> Result<Content, ContentRepositoryError>;

    /// Sets `deleted_at`; the `status` column is left at its last
    /// operational value rather than overwritten by the soft delete.
    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ContentRepositoryError>;
}
