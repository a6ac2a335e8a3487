use async_trait::async_trait;
use uuid::Uuid;

use crate::content::application::domain::entities::Content;
use crate::content::application::ports::incoming::error::CoreError;
use crate::content::application::ports::outgoing::content_query::{
    ContentFilter, ContentSort, ContentStatistics, PageRequest, StatisticsOptions,
};

/// Admin operates against the Repository's filter interfaces and is the
/// only path that may bypass tenant/owner filtering.
#[async_trait]
pub trait AdminService: Send + Sync {
    async fn list_all_contents(
        &self,
        filter: ContentFilter,
        sort: ContentSort,
        page: PageRequest,
    ) -> Result<Vec<Content>, CoreError>;

    async fn count_contents(&self, filter: ContentFilter) -> Result<u64, CoreError>;

    async fn get_statistics(
        &self,
        filter: ContentFilter,
        options: StatisticsOptions,
    ) -> Result<ContentStatistics, CoreError>;
}

/// A caller-supplied row processor invoked once per matching content.
#[async_trait]
pub trait ContentProcessor: Send + Sync {
    async fn process(&self, content: &Content) -> Result<(), String>;
}

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub batch_size: u64,
    pub limit: Option<u64>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub total_found: u64,
    pub total_processed: u64,
    pub total_failed: u64,
    pub failed_ids: Vec<Uuid>,
}

/// Invoked after each processed row with `(processed, total_found)`.
pub type ScanProgressCallback<'a> = Box<dyn Fn(u64, u64) + Send + Sync + 'a>;

/// Wraps `AdminService` with paginated processing that never aborts on a
/// per-row failure.
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn scan(
        &self,
        filter: ContentFilter,
        processor: &(dyn ContentProcessor + Send + Sync),
        options: ScanOptions,
        on_progress: Option<ScanProgressCallback<'_>>,
    ) -> Result<ScanResult, CoreError>;
}
