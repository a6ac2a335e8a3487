use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::content::application::domain::entities::{ContentStatus, DerivedContent};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DerivedRepositoryError {
    #[error("derived edge ({0}, {1}) already exists")]
    AlreadyExists(Uuid, Uuid),

    #[error("parent and child content must differ")]
    SelfReference,

    #[error("repository failure: {0}")]
    Repository(String),
}

#[derive(Debug, Clone)]
pub struct NewDerivedContent {
    pub parent_id: Uuid,
    pub content_id: Uuid,
    pub derivation_type: String,
    pub variant: String,
    pub derivation_params: HashMap<String, Value>,
    pub processing_metadata: HashMap<String, Value>,
}

/// Independently combinable filter dimensions for `ListDerivedContent`.
/// `derivation_type_variant_pairs` is OR-composed against the separate
/// `derivation_types`/`variants` sets, forming an allow-list.
#[derive(Debug, Clone, Default)]
pub struct DerivedContentFilter {
    pub parent_ids: Vec<Uuid>,
    pub derivation_types: Vec<String>,
    pub variants: Vec<String>,
    pub derivation_type_variant_pairs: Vec<(String, String)>,
    pub content_statuses: Vec<ContentStatus>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DerivedContentSort {
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    TypeVariant,
}

#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

#[async_trait]
pub trait DerivedRepository: Send + Sync {
    async fn create(
        &self,
        new_edge: NewDerivedContent,
    ) -> Result<DerivedContent, DerivedRepositoryError>;

    /// The content-status dimension requires joining against the derived
    /// content's own row, so this query also needs the joined `Content`
    /// status alongside each edge for filtering purposes; implementations
    /// apply `content_statuses` against that joined status.
    async fn list(
        &self,
        filter: DerivedContentFilter,
        sort: DerivedContentSort,
        page: PageRequest,
    ) -> Result<Vec<DerivedContent>, DerivedRepositoryError>;
}
