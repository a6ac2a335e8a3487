use async_trait::async_trait;

use crate::content::application::domain::entities::DerivedContent;
use crate::content::application::ports::incoming::derivation_service::{
    CreateDerivedContentRelationshipRequest, DerivationService,
};
use crate::content::application::ports::incoming::error::CoreError;
use crate::content::application::ports::outgoing::derived_repository::{
    DerivedContentFilter, DerivedContentSort, NewDerivedContent, PageRequest,
};

use super::ContentService;

#[async_trait]
impl DerivationService for ContentService {
    async fn create_derived_content_relationship(
        &self,
        req: CreateDerivedContentRelationshipRequest,
    ) -> Result<DerivedContent, CoreError> {
        if req.parent_id == req.content_id {
            return Err(CoreError::InvalidRequest(
                "parent and child content must differ".into(),
            ));
        }

        self.content_query
            .get_by_id(req.parent_id)
            .await?
            .ok_or(CoreError::ContentNotFound(req.parent_id))?;
        self.content_query
            .get_by_id(req.content_id)
            .await?
            .ok_or(CoreError::ContentNotFound(req.content_id))?;

        self.derived_repo
            .create(NewDerivedContent {
                parent_id: req.parent_id,
                content_id: req.content_id,
                derivation_type: req.derivation_type,
                variant: req.variant,
                derivation_params: req.derivation_params,
                processing_metadata: req.processing_metadata,
            })
            .await
            .map_err(CoreError::from)
    }

    async fn list_derived_content(
        &self,
        filter: DerivedContentFilter,
        sort: DerivedContentSort,
        page: PageRequest,
    ) -> Result<Vec<DerivedContent>, CoreError> {
        self.derived_repo
            .list(filter, sort, page)
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
    use std::collections::HashMap;

    fn req(name: &str) -> CreateContentRequest {
        CreateContentRequest {
            tenant_id: "t1".to_string(),
            owner_id: "o1".to_string(),
            owner_type: "user".to_string(),
            name: name.to_string(),
            description: String::new(),
            document_type: "image".to_string(),
            derivation_type: String::new(),
        }
    }

    #[tokio::test]
    async fn rejects_self_referential_relationship() {
        let service = memory_service();
        let content = service.create_content(req("original")).await.unwrap();
        let err = service
            .create_derived_content_relationship(CreateDerivedContentRelationshipRequest {
                parent_id: content.id,
                content_id: content.id,
                derivation_type: "thumbnail".to_string(),
                variant: "thumb_small".to_string(),
                derivation_params: HashMap::new(),
                processing_metadata: HashMap::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_parent() {
        let service = memory_service();
        let child = service.create_content(req("child")).await.unwrap();
        let err = service
            .create_derived_content_relationship(CreateDerivedContentRelationshipRequest {
                parent_id: uuid::Uuid::new_v4(),
                content_id: child.id,
                derivation_type: "thumbnail".to_string(),
                variant: "thumb_small".to_string(),
                derivation_params: HashMap::new(),
                processing_metadata: HashMap::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ContentNotFound(_)));
    }

    #[tokio::test]
    async fn create_then_list_returns_the_relationship() {
        let service = memory_service();
        let parent = service.create_content(req("original")).await.unwrap();
        let child = service.create_content(req("thumb")).await.unwrap();
        service
            .create_derived_content_relationship(CreateDerivedContentRelationshipRequest {
                parent_id: parent.id,
                content_id: child.id,
                derivation_type: "thumbnail".to_string(),
                variant: "thumb_small".to_string(),
                derivation_params: HashMap::new(),
                processing_metadata: HashMap::new(),
            })
            .await
            .unwrap();

        let listed = service
            .list_derived_content(
                DerivedContentFilter {
                    parent_ids: vec![parent.id],
                    ..Default::default()
                },
                DerivedContentSort::default(),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content_id, child.id);
    }
}
