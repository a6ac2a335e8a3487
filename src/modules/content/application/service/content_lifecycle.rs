use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncRead;
use uuid::Uuid;

use crate::content::application::domain::entities::{Content, ContentStatus};
use crate::content::application::ports::incoming::core_service::{
    CoreService, CreateContentRequest, DeleteContentOptions, UpdateContentRequest,
    UploadContentRequest, UploadDerivedContentRequest,
};
use crate::content::application::ports::incoming::error::CoreError;
use crate::content::application::ports::outgoing::content_query::PageRequest;
use crate::content::application::ports::outgoing::content_repository::{
    ContentPatch, NewContent,
};
use crate::content::application::ports::outgoing::event_sink::LifecycleEvent;

use super::ContentService;

#[async_trait]
impl CoreService for ContentService {
    async fn create_content(&self, req: CreateContentRequest) -> Result<Content, CoreError> {
        if req.name.trim().is_empty() {
            return Err(CoreError::InvalidRequest("name must not be empty".into()));
        }
        let content = self
            .content_repo
            .create(NewContent {
                id: Uuid::new_v4(),
                tenant_id: req.tenant_id,
                owner_id: req.owner_id,
                owner_type: req.owner_type,
                name: req.name,
                description: req.description,
                document_type: req.document_type,
                derivation_type: req.derivation_type,
            })
            .await?;
        self.event_sink
            .emit(LifecycleEvent::ContentCreated {
                content_id: content.id,
            })
            .await;
        Ok(content)
    }

    async fn get_content(&self, id: Uuid) -> Result<Content, CoreError> {
        self.content_query
            .get_by_id(id)
            .await?
            .ok_or(CoreError::ContentNotFound(id))
    }

    async fn update_content(&self, req: UpdateContentRequest) -> Result<Content, CoreError> {
        let status = req
            .status
            .map(|s| {
                s.parse::<ContentStatus>()
                    .map_err(|_| CoreError::InvalidRequest(format!("unknown content status: {s}")))
            })
            .transpose()?;

        self.content_repo
            .update(
                req.id,
                ContentPatch {
                    name: req.name,
                    description: req.description,
                    status,
                },
            )
            .await
            .map_err(CoreError::from)
    }

    async fn delete_content(
        &self,
        id: Uuid,
        options: DeleteContentOptions,
    ) -> Result<(), CoreError> {
        let now = Utc::now();
        self.content_repo.soft_delete(id, now).await?;

        if options.cascade_objects {
            for object in self.object_query.list_by_content_id(id).await? {
                if !object.is_deleted() {
                    let _ = self.object_repo.soft_delete(object.id, now).await;
                }
            }
        }

        self.event_sink
            .emit(LifecycleEvent::ContentDeleted { content_id: id })
            .await;
        Ok(())
    }

    async fn list_content(
        &self,
        tenant_id: &str,
        owner_id: &str,
        page: PageRequest,
    ) -> Result<Vec<Content>, CoreError> {
        self.content_query
            .list_by_owner(tenant_id, owner_id, page)
            .await
            .map_err(CoreError::from)
    }

    async fn upload_content(&self, req: UploadContentRequest) -> Result<Content, CoreError> {
        self.do_upload_content(req).await
    }

    async fn upload_derived_content(
        &self,
        req: UploadDerivedContentRequest,
    ) -> Result<Content, CoreError> {
        self.do_upload_derived_content(req).await
    }

    async fn download_content(
        &self,
        id: Uuid,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, CoreError> {
        self.do_download_content(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::application::service::test_support::memory_service;

    fn create_req() -> CreateContentRequest {
        CreateContentRequest {
            tenant_id: "t1".to_string(),
            owner_id: "o1".to_string(),
            owner_type: "user".to_string(),
            name: "report.pdf".to_string(),
            description: String::new(),
            document_type: "pdf".to_string(),
            derivation_type: String::new(),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let service = memory_service();
        let created = service.create_content(create_req()).await.unwrap();
        let fetched = service.get_content(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.status, ContentStatus::Created);
    }

    #[tokio::test]
    async fn create_rejects_empty_name() {
        let service = memory_service();
        let mut req = create_req();
        req.name = "   ".to_string();
        let err = service.create_content(req).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn get_missing_content_is_not_found() {
        let service = memory_service();
        let err = service.get_content(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoreError::ContentNotFound(_)));
    }

    #[tokio::test]
    async fn update_rejects_unknown_status_string() {
        let service = memory_service();
        let created = service.create_content(create_req()).await.unwrap();
        let err = service
            .update_content(UpdateContentRequest {
                id: created.id,
                status: Some("not_a_real_status".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn update_renames_content() {
        let service = memory_service();
        let created = service.create_content(create_req()).await.unwrap();
        let updated = service
            .update_content(UpdateContentRequest {
                id: created.id,
                name: Some("renamed.pdf".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.name, "renamed.pdf");
    }

    #[tokio::test]
    async fn delete_hides_content_from_subsequent_get() {
        let service = memory_service();
        let created = service.create_content(create_req()).await.unwrap();
        service
            .delete_content(created.id, DeleteContentOptions::default())
            .await
            .unwrap();
        let err = service.get_content(created.id).await.unwrap_err();
        assert!(matches!(err, CoreError::ContentNotFound(_)));
    }

    #[tokio::test]
    async fn list_content_scopes_to_owner() {
        let service = memory_service();
        service.create_content(create_req()).await.unwrap();
        let mut other = create_req();
        other.owner_id = "o2".to_string();
        service.create_content(other).await.unwrap();

        let listed = service
            .list_content("t1", "o1", PageRequest::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner_id, "o1");
    }
}
