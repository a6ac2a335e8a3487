use async_trait::async_trait;

use crate::content::application::domain::entities::Content;
use crate::content::application::ports::incoming::admin_service::AdminService;
use crate::content::application::ports::incoming::error::CoreError;
use crate::content::application::ports::outgoing::content_query::{
    ContentFilter, ContentSort, ContentStatistics, PageRequest, StatisticsOptions,
};

use super::ContentService;

#[async_trait]
impl AdminService for ContentService {
    async fn list_all_contents(
        &self,
        filter: ContentFilter,
        sort: ContentSort,
        page: PageRequest,
    ) -> Result<Vec<Content>, CoreError> {
        self.content_query
            .list_all(filter, sort, page)
            .await
            .map_err(CoreError::from)
    }

    async fn count_contents(&self, filter: ContentFilter) -> Result<u64, CoreError> {
        self.content_query.count(filter).await.map_err(CoreError::from)
    }

    async fn get_statistics(
        &self,
        filter: ContentFilter,
        options: StatisticsOptions,
    ) -> Result<ContentStatistics, CoreError> {
        self.content_query
            .statistics(filter, options)
            .await
            .map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::application::ports::incoming::core_service::{
        CoreService, CreateContentRequest,
    };
    use crate::content::application::service::test_support::memory_service;

    fn req(tenant: &str) -> CreateContentRequest {
        CreateContentRequest {
            tenant_id: tenant.to_string(),
            owner_id: "o1".to_string(),
            owner_type: "user".to_string(),
            name: "doc".to_string(),
            description: String::new(),
            document_type: "pdf".to_string(),
            derivation_type: String::new(),
        }
    }

    #[tokio::test]
    async fn count_contents_ignores_tenant_scope() {
        let service = memory_service();
        service.create_content(req("t1")).await.unwrap();
        service.create_content(req("t2")).await.unwrap();
        let count = service.count_contents(ContentFilter::default()).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn statistics_counts_by_tenant() {
        let service = memory_service();
        service.create_content(req("t1")).await.unwrap();
        service.create_content(req("t1")).await.unwrap();
        service.create_content(req("t2")).await.unwrap();
        let stats = service
            .get_statistics(
                ContentFilter::default(),
                StatisticsOptions {
                    by_tenant: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_tenant.get("t1"), Some(&2));
        assert_eq!(stats.by_tenant.get("t2"), Some(&1));
    }
}
