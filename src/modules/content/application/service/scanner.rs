use async_trait::async_trait;

use crate::content::application::ports::incoming::admin_service::{
    AdminService, ContentProcessor, ScanOptions, ScanProgressCallback, ScanResult, Scanner,
};
use crate::content::application::ports::incoming::error::CoreError;
use crate::content::application::ports::outgoing::content_query::{
    ContentFilter, ContentSort, PageRequest,
};

use super::ContentService;

#[async_trait]
impl Scanner for ContentService {
    async fn scan(
        &self,
        filter: ContentFilter,
        processor: &(dyn ContentProcessor + Send + Sync),
        options: ScanOptions,
        on_progress: Option<ScanProgressCallback<'_>>,
    ) -> Result<ScanResult, CoreError> {
        let batch_size = options.batch_size.max(1);
        let total_found = self.count_contents(filter.clone()).await?;
        let visit_limit = options.limit.unwrap_or(total_found).min(total_found);

        let mut result = ScanResult {
            total_found,
            ..Default::default()
        };

        let mut offset = 0u64;
        while result.total_processed + result.total_failed < visit_limit {
            let page = self
                .list_all_contents(
                    filter.clone(),
                    ContentSort::CreatedAtDesc,
                    PageRequest {
                        limit: batch_size,
                        offset,
                    },
                )
                .await?;
            if page.is_empty() {
                break;
            }

            for content in page.iter() {
                if result.total_processed + result.total_failed >= visit_limit {
                    break;
                }

                if options.dry_run {
                    result.total_processed += 1;
                } else {
                    match processor.process(content).await {
                        Ok(()) => result.total_processed += 1,
                        Err(_) => {
                            result.total_failed += 1;
                            result.failed_ids.push(content.id);
                        }
                    }
                }

                if let Some(ref cb) = on_progress {
                    cb(result.total_processed + result.total_failed, total_found);
                }
            }

            offset += batch_size;
        }

        Ok(result)
    }
}
