use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncRead;
use uuid::Uuid;

use crate::content::application::domain::entities::{Object, ObjectMetadata, ObjectStatus};
use crate::content::application::domain::key_generator::KeyInput;
use crate::content::application::ports::incoming::error::CoreError;
use crate::content::application::ports::incoming::storage_service::{
    CreateObjectRequest, StorageService, UpdateObjectRequest,
};
use crate::content::application::ports::outgoing::object_repository::{NewObject, ObjectPatch};
use crate::content::application::ports::outgoing::url_strategy::UrlMetadata;

use super::ContentService;

#[async_trait]
impl StorageService for ContentService {
    async fn create_object(&self, req: CreateObjectRequest) -> Result<Object, CoreError> {
        let content = self
            .content_query
            .get_by_id(req.content_id)
            .await?
            .ok_or(CoreError::ContentNotFound(req.content_id))?;

        self.backend(&req.storage_backend_name)?;

        let existing = self.object_query.list_by_content_id(content.id).await?;
        let next_version = existing.iter().map(|o| o.version).max().unwrap_or(0) + 1;

        let key = self.key_generator.generate(&KeyInput {
            tenant_id: &content.tenant_id,
            content_id: content.id,
            version: next_version,
            variant: req.variant.as_deref(),
        });

        self.object_repo
            .create(NewObject {
                id: Uuid::new_v4(),
                content_id: content.id,
                storage_backend_name: req.storage_backend_name,
                storage_class: req.storage_class,
                object_key: key,
                file_name: req.file_name,
                object_type: req.object_type,
            })
            .await
            .map_err(CoreError::from)
    }

    async fn get_object(&self, id: Uuid) -> Result<Object, CoreError> {
        self.object_query
            .get_by_id(id)
            .await?
            .ok_or(CoreError::ObjectNotFound(id))
    }

    async fn get_objects_by_content_id(&self, content_id: Uuid) -> Result<Vec<Object>, CoreError> {
        self.object_query
            .list_by_content_id(content_id)
            .await
            .map_err(CoreError::from)
    }

    async fn update_object(&self, req: UpdateObjectRequest) -> Result<Object, CoreError> {
        self.object_repo
            .update(
                req.id,
                ObjectPatch {
                    file_name: req.file_name,
                    storage_class: req.storage_class,
                    status: None,
                },
            )
            .await
            .map_err(CoreError::from)
    }

    async fn delete_object(&self, id: Uuid) -> Result<(), CoreError> {
        self.object_repo
            .soft_delete(id, Utc::now())
            .await
            .map_err(CoreError::from)
    }

    async fn get_object_metadata(&self, id: Uuid) -> Result<ObjectMetadata, CoreError> {
        self.object_query
            .get_metadata(id)
            .await?
            .ok_or(CoreError::ObjectNotFound(id))
    }

    async fn set_object_metadata(
        &self,
        id: Uuid,
        metadata: ObjectMetadata,
    ) -> Result<(), CoreError> {
        self.object_repo
            .set_metadata(id, metadata)
            .await
            .map_err(CoreError::from)
    }

    async fn upload_object(
        &self,
        id: Uuid,
        reader: Box<dyn AsyncRead + Send + Unpin>,
    ) -> Result<(), CoreError> {
        self.upload_object_with_metadata(id, reader, None).await
    }

    async fn upload_object_with_metadata(
        &self,
        id: Uuid,
        reader: Box<dyn AsyncRead + Send + Unpin>,
        mime_type: Option<String>,
    ) -> Result<(), CoreError> {
        let object = self
            .object_query
            .get_by_id(id)
            .await?
            .ok_or(CoreError::ObjectNotFound(id))?;
        let backend = self.backend(&object.storage_backend_name)?;

        self.object_repo
            .update(
                id,
                ObjectPatch {
                    status: Some(ObjectStatus::Uploading),
                    ..Default::default()
                },
            )
            .await?;

        backend.upload(&object.object_key, reader).await?;

        let stat = backend.stat(&object.object_key).await?;
        let now = Utc::now();
        self.object_repo
            .set_metadata(
                id,
                ObjectMetadata {
                    object_id: id,
                    size_bytes: stat.size_bytes,
                    mime_type: mime_type.or(stat.mime_type).unwrap_or_default(),
                    etag: stat.etag,
                    metadata: Default::default(),
                    created_at: now,
                    updated_at: now,
                },
            )
            .await?;

        self.object_repo
            .update(
                id,
                ObjectPatch {
                    status: Some(ObjectStatus::Uploaded),
                    ..Default::default()
                },
            )
            .await?;

        Ok(())
    }

    async fn download_object(
        &self,
        id: Uuid,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, CoreError> {
        let object = self
            .object_query
            .get_by_id(id)
            .await?
            .ok_or(CoreError::ObjectNotFound(id))?;
        let backend = self.backend(&object.storage_backend_name)?;
        backend
            .download(&object.object_key)
            .await
            .map_err(CoreError::from)
    }

    async fn update_object_meta_from_storage(&self, id: Uuid) -> Result<ObjectMetadata, CoreError> {
        let object = self
            .object_query
            .get_by_id(id)
            .await?
            .ok_or(CoreError::ObjectNotFound(id))?;
        let backend = self.backend(&object.storage_backend_name)?;
        let stat = backend.stat(&object.object_key).await?;
        let now = Utc::now();
        let metadata = ObjectMetadata {
            object_id: id,
            size_bytes: stat.size_bytes,
            mime_type: stat.mime_type.unwrap_or_default(),
            etag: stat.etag,
            metadata: Default::default(),
            created_at: now,
            updated_at: now,
        };
        self.object_repo.set_metadata(id, metadata.clone()).await?;
        Ok(metadata)
    }

    async fn get_upload_url(&self, id: Uuid) -> Result<String, CoreError> {
        let object = self
            .object_query
            .get_by_id(id)
            .await?
            .ok_or(CoreError::ObjectNotFound(id))?;
        self.url_strategy
            .generate_upload_url(
                object.content_id,
                &object.object_key,
                &object.storage_backend_name,
                Some(UrlMetadata {
                    file_name: Some(object.file_name.clone()),
                    content_type: None,
                    version: Some(object.version),
                }),
            )
            .await
            .map_err(CoreError::from)
    }

    async fn get_download_url(&self, id: Uuid) -> Result<String, CoreError> {
        let object = self
            .object_query
            .get_by_id(id)
            .await?
            .ok_or(CoreError::ObjectNotFound(id))?;
        self.url_strategy
            .generate_download_url(
                object.content_id,
                &object.object_key,
                &object.storage_backend_name,
                Some(UrlMetadata {
                    file_name: Some(object.file_name.clone()),
                    content_type: None,
                    version: Some(object.version),
                }),
            )
            .await
            .map_err(CoreError::from)
    }

    async fn get_preview_url(&self, id: Uuid) -> Result<String, CoreError> {
        let object = self
            .object_query
            .get_by_id(id)
            .await?
            .ok_or(CoreError::ObjectNotFound(id))?;
        self.url_strategy
            .generate_preview_url(
                object.content_id,
                &object.object_key,
                &object.storage_backend_name,
                Some(UrlMetadata {
                    file_name: Some(object.file_name.clone()),
                    content_type: None,
                    version: Some(object.version),
                }),
            )
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

    async fn seed_content(service: &super::ContentService) -> Uuid {
        let content = service
            .create_content(CreateContentRequest {
                tenant_id: "t1".to_string(),
                owner_id: "o1".to_string(),
                owner_type: "user".to_string(),
                name: "doc".to_string(),
                description: String::new(),
                document_type: "pdf".to_string(),
                derivation_type: String::new(),
            })
            .await
            .unwrap();
        content.id
    }

    #[tokio::test]
    async fn create_object_assigns_first_version() {
        let service = memory_service();
        let content_id = seed_content(&service).await;
        let object = service
            .create_object(CreateObjectRequest {
                content_id,
                storage_backend_name: "memory".to_string(),
                storage_class: String::new(),
                file_name: "doc.pdf".to_string(),
                object_type: "original".to_string(),
                variant: None,
            })
            .await
            .unwrap();
        assert_eq!(object.version, 1);
    }

    #[tokio::test]
    async fn create_object_rejects_unknown_backend() {
        let service = memory_service();
        let content_id = seed_content(&service).await;
        let err = service
            .create_object(CreateObjectRequest {
                content_id,
                storage_backend_name: "does-not-exist".to_string(),
                storage_class: String::new(),
                file_name: "doc.pdf".to_string(),
                object_type: "original".to_string(),
                variant: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::StorageBackendNotFound(_)));
    }

    #[tokio::test]
    async fn upload_object_then_download_round_trips_bytes() {
        let service = memory_service();
        let content_id = seed_content(&service).await;
        let object = service
            .create_object(CreateObjectRequest {
                content_id,
                storage_backend_name: "memory".to_string(),
                storage_class: String::new(),
                file_name: "doc.pdf".to_string(),
                object_type: "original".to_string(),
                variant: None,
            })
            .await
            .unwrap();

        service
            .upload_object(
                object.id,
                Box::new(std::io::Cursor::new(b"hello world".to_vec())),
            )
            .await
            .unwrap();

        let fetched = service.get_object(object.id).await.unwrap();
        assert_eq!(fetched.status, ObjectStatus::Uploaded);

        let metadata = service.get_object_metadata(object.id).await.unwrap();
        assert_eq!(metadata.size_bytes, 11);

        let mut reader = service.download_object(object.id).await.unwrap();
        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buf)
            .await
            .unwrap();
        assert_eq!(buf, b"hello world");
    }

    #[tokio::test]
    async fn url_methods_delegate_to_the_configured_strategy() {
        let service = memory_service();
        let content_id = seed_content(&service).await;
        let object = service
            .create_object(CreateObjectRequest {
                content_id,
                storage_backend_name: "memory".to_string(),
                storage_class: String::new(),
                file_name: "doc.pdf".to_string(),
                object_type: "original".to_string(),
                variant: None,
            })
            .await
            .unwrap();

        let download_url = service.get_download_url(object.id).await.unwrap();
        assert!(download_url.contains(&format!("/contents/{content_id}/download")));

        let preview_url = service.get_preview_url(object.id).await.unwrap();
        assert!(preview_url.ends_with("disposition=inline"));
    }
}
