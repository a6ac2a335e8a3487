use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::content::application::domain::entities::{Content, ContentStatus};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ContentQueryError {
    #[error("query failure: {0}")]
    Repository(String),
}

/// Filter bundle for `ListAllContents`/`CountContents`/`GetStatistics`.
/// Every dimension is independently combinable; `None`/empty means
/// unconstrained. Only the admin facet may leave `tenant_id`/`owner_id`
/// unset — every other caller scopes by at least one of them.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub tenant_id: Option<String>,
    pub owner_id: Option<String>,
    pub owner_type: Option<String>,
    pub statuses: Vec<ContentStatus>,
    pub document_types: Vec<String>,
    pub derivation_types: Vec<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub include_deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSort {
    CreatedAtDesc,
    CreatedAtAsc,
}

impl Default for ContentSort {
    fn default() -> Self {
        ContentSort::CreatedAtDesc
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, Default)]
pub struct StatisticsOptions {
    pub by_status: bool,
    pub by_tenant: bool,
    pub by_derivation_type: bool,
    pub by_document_type: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ContentStatistics {
    pub total: u64,
    pub by_status: HashMap<String, u64>,
    pub by_tenant: HashMap<String, u64>,
    pub by_derivation_type: HashMap<String, u64>,
    pub by_document_type: HashMap<String, u64>,
}

#[async_trait]
pub trait ContentQuery: Send + Sync {
    /// Returns `None` for a missing or soft-deleted row; callers translate
    /// that into `ContentNotFound`.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Content>, ContentQueryError>;

    /// Owner/tenant-scoped listing, excludes soft-deleted, ordered by
    /// `created_at desc`.
    async fn list_by_owner(
        &self,
        tenant_id: &str,
        owner_id: &str,
        page: PageRequest,
    ) -> Result<Vec<Content>, ContentQueryError>;

    /// Cross-tenant listing, admin-only: the only path that may ignore
    /// owner/tenant scoping or include soft-deleted rows.
    async fn list_all(
        &self,
        filter: ContentFilter,
        sort: ContentSort,
        page: PageRequest,
    ) -> Result<Vec<Content>, ContentQueryError>;

    async fn count(&self, filter: ContentFilter) -> Result<u64, ContentQueryError>;

    async fn statistics(
        &self,
        filter: ContentFilter,
        options: StatisticsOptions,
    ) -> Result<ContentStatistics, ContentQueryError>;
}
