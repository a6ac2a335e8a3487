use std::collections::HashMap;

use chrono::Utc;
use tokio::io::AsyncRead;
use uuid::Uuid;

use crate::content::application::domain::entities::{
    Content, ContentStatus, ObjectMetadata, ObjectStatus,
};
use crate::content::application::domain::key_generator::KeyInput;
use crate::content::application::ports::incoming::core_service::{
    UploadContentRequest, UploadDerivedContentRequest,
};
use crate::content::application::ports::incoming::error::CoreError;
use crate::content::application::ports::outgoing::content_repository::{
    ContentPatch, NewContent,
};
use crate::content::application::ports::outgoing::derived_repository::NewDerivedContent;
use crate::content::application::ports::outgoing::event_sink::LifecycleEvent;
use crate::content::application::ports::outgoing::object_repository::{NewObject, ObjectPatch};

use super::ContentService;

impl ContentService {
    /// Create, reserve an object, stream bytes through the backend, then
    /// reconcile metadata: shared by `UploadContent` and
    /// `UploadDerivedContent`. `variant` is `None` for originals.
    pub(super) async fn run_upload_pipeline(
        &self,
        new_content: NewContent,
        mime_type: Option<String>,
        tags: Vec<String>,
        custom_metadata: HashMap<String, serde_json::Value>,
        storage_backend_name: String,
        reader: Box<dyn AsyncRead + Send + Unpin>,
        variant: Option<String>,
    ) -> Result<Content, CoreError> {
        let backend = self.backend(&storage_backend_name)?;

        // Step 1: create Content(created). On any later failure, soft-delete it.
        let content = self.content_repo.create(new_content).await?;
        let content_id = content.id;
        self.event_sink
            .emit(LifecycleEvent::ContentCreated { content_id })
            .await;

        let result: Result<Content, CoreError> = async {
            // Step 2: generate object_key, insert Object(created), -> uploading.
            let key = self.key_generator.generate(&KeyInput {
                tenant_id: &content.tenant_id,
                content_id,
                version: 1,
                variant: variant.as_deref(),
            });

            let object = self
                .object_repo
                .create(NewObject {
                    id: Uuid::new_v4(),
                    content_id,
                    storage_backend_name: storage_backend_name.clone(),
                    storage_class: String::new(),
                    object_key: key.clone(),
                    file_name: content.name.clone(),
                    object_type: "original".to_string(),
                })
                .await?;
            let object_id = object.id;

            // Step 2 (cont.): the pipeline is now underway, so Content
            // leaves `created` before any bytes move.
            self.content_repo
                .update(
                    content_id,
                    ContentPatch {
                        status: Some(ContentStatus::Uploading),
                        ..Default::default()
                    },
                )
                .await?;

            let transition_result: Result<(), CoreError> = async {
                self.object_repo
                    .update(
                        object_id,
                        ObjectPatch {
                            status: Some(ObjectStatus::Uploading),
                            ..Default::default()
                        },
                    )
                    .await?;

                // Step 3: stream bytes into the BlobStore.
                if let Err(e) = backend.upload(&key, reader).await {
                    self.event_sink
                        .emit(LifecycleEvent::ObjectUploadFailed {
                            object_id,
                            reason: e.to_string(),
                        })
                        .await;
                    return Err(CoreError::from(e));
                }

                // Step 4: reconcile via Stat; caller-supplied mime_type wins.
                let stat = backend.stat(&key).await?;
                let resolved_mime = mime_type.clone().or(stat.mime_type).unwrap_or_default();
                let now = Utc::now();
                self.object_repo
                    .set_metadata(
                        object_id,
                        ObjectMetadata {
                            object_id,
                            size_bytes: stat.size_bytes,
                            mime_type: resolved_mime.clone(),
                            etag: stat.etag,
                            metadata: HashMap::new(),
                            created_at: now,
                            updated_at: now,
                        },
                    )
                    .await?;

                // Step 5: transition Object -> uploaded, Content -> uploaded.
                self.object_repo
                    .update(
                        object_id,
                        ObjectPatch {
                            status: Some(ObjectStatus::Uploaded),
                            ..Default::default()
                        },
                    )
                    .await?;

                Ok(())
            }
            .await;

            if let Err(e) = transition_result {
                let _ = self.object_repo.soft_delete(object_id, Utc::now()).await;
                return Err(e);
            }

            let updated = self
                .content_repo
                .update(
                    content_id,
                    ContentPatch {
                        status: Some(ContentStatus::Uploaded),
                        ..Default::default()
                    },
                )
                .await?;

            self.event_sink
                .emit(LifecycleEvent::ContentUploaded { content_id })
                .await;

            // Step 6: upsert ContentMetadata when tags/custom metadata present.
            if !tags.is_empty() || !custom_metadata.is_empty() {
                let now = Utc::now();
                self.content_metadata_repo
                    .upsert(crate::content::application::domain::entities::ContentMetadata {
                        content_id,
                        tags,
                        file_size: 0,
                        file_name: String::new(),
                        mime_type: String::new(),
                        checksum: String::new(),
                        checksum_algorithm: String::new(),
                        metadata: custom_metadata,
                        created_at: now,
                        updated_at: now,
                    })
                    .await?;
            }

            Ok(updated)
        }
        .await;

        match result {
            Ok(content) => Ok(content),
            Err(e) => {
                let _ = self.content_repo.soft_delete(content_id, Utc::now()).await;
                Err(e)
            }
        }
    }

    pub(super) async fn do_upload_content(
        &self,
        req: UploadContentRequest,
    ) -> Result<Content, CoreError> {
        self.run_upload_pipeline(
            NewContent {
                id: Uuid::new_v4(),
                tenant_id: req.tenant_id,
                owner_id: req.owner_id,
                owner_type: req.owner_type,
                name: req.name,
                description: String::new(),
                document_type: req.document_type,
                derivation_type: String::new(),
            },
            req.mime_type,
            req.tags,
            req.custom_metadata,
            req.storage_backend_name,
            req.reader,
            None,
        )
        .await
    }

    pub(super) async fn do_upload_derived_content(
        &self,
        req: UploadDerivedContentRequest,
    ) -> Result<Content, CoreError> {
        let parent = self
            .content_query
            .get_by_id(req.parent_id)
            .await?
            .ok_or(CoreError::ContentNotFound(req.parent_id))?;

        let child_id = Uuid::new_v4();

        let new_content = NewContent {
            id: child_id,
            tenant_id: req.tenant_id,
            owner_id: req.owner_id,
            owner_type: req.owner_type,
            name: req.name,
            description: String::new(),
            document_type: req.document_type,
            derivation_type: req.derivation_type.clone(),
        };

        // Insert the derived edge atomically with the child's creation: if
        // the edge can't be created, nothing about the child is persisted
        // by the caller-visible pipeline below.
        let content = self
            .run_upload_pipeline(
                new_content,
                req.mime_type,
                Vec::new(),
                HashMap::new(),
                req.storage_backend_name,
                req.reader,
                Some(req.variant.clone()),
            )
            .await?;

        if let Err(e) = self
            .derived_repo
            .create(NewDerivedContent {
                parent_id: parent.id,
                content_id: content.id,
                derivation_type: req.derivation_type,
                variant: req.variant,
                derivation_params: req.derivation_params,
                processing_metadata: HashMap::new(),
            })
            .await
        {
            let _ = self.content_repo.soft_delete(content.id, Utc::now()).await;
            return Err(CoreError::from(e));
        }

        Ok(content)
    }

    pub(super) async fn do_download_content(
        &self,
        id: Uuid,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, CoreError> {
        let content = self
            .content_query
            .get_by_id(id)
            .await?
            .ok_or(CoreError::ContentNotFound(id))?;

        let objects = self.object_query.list_by_content_id(content.id).await?;
        let object = objects
            .into_iter()
            .filter(|o| !o.is_deleted())
            .max_by_key(|o| o.version)
            .ok_or(CoreError::ObjectNotFound(id))?;

        let backend = self.backend(&object.storage_backend_name)?;
        backend
            .download(&object.object_key)
            .await
            .map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::application::ports::incoming::core_service::CoreService;
    use crate::content::application::service::test_support::memory_service;

    fn upload_req(reader_bytes: &[u8]) -> UploadContentRequest {
        UploadContentRequest {
            tenant_id: "t1".to_string(),
            owner_id: "o1".to_string(),
            owner_type: "user".to_string(),
            name: "photo.png".to_string(),
            document_type: "image".to_string(),
            mime_type: Some("image/png".to_string()),
            tags: vec!["vacation".to_string()],
            custom_metadata: HashMap::new(),
            storage_backend_name: "memory".to_string(),
            reader: Box::new(std::io::Cursor::new(reader_bytes.to_vec())),
        }
    }

    #[tokio::test]
    async fn upload_content_lands_in_uploaded_state_with_metadata() {
        let service = memory_service();
        let content = service.upload_content(upload_req(b"hello")).await.unwrap();
        assert_eq!(content.status, ContentStatus::Uploaded);

        let objects = service.get_objects_by_content_id(content.id).await.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].status, ObjectStatus::Uploaded);

        let metadata = service
            .get_content_metadata_for_test(content.id)
            .await
            .unwrap();
        assert_eq!(metadata.tags, vec!["vacation".to_string()]);
    }

    #[tokio::test]
    async fn upload_content_rolls_back_on_unknown_backend() {
        let service = memory_service();
        let mut req = upload_req(b"hello");
        req.storage_backend_name = "does-not-exist".to_string();
        let err = service.upload_content(req).await.unwrap_err();
        assert!(matches!(err, CoreError::StorageBackendNotFound(_)));

        let stats = service
            .count_contents_for_test()
            .await;
        assert_eq!(stats, 0);
    }

    #[tokio::test]
    async fn upload_derived_content_creates_edge_and_child() {
        let service = memory_service();
        let parent = service.upload_content(upload_req(b"original")).await.unwrap();

        let derived = service
            .upload_derived_content(UploadDerivedContentRequest {
                parent_id: parent.id,
                tenant_id: "t1".to_string(),
                owner_id: "o1".to_string(),
                owner_type: "user".to_string(),
                name: "thumb.png".to_string(),
                document_type: "image".to_string(),
                mime_type: Some("image/png".to_string()),
                derivation_type: "thumbnail".to_string(),
                variant: "thumb_small".to_string(),
                derivation_params: HashMap::new(),
                storage_backend_name: "memory".to_string(),
                reader: Box::new(std::io::Cursor::new(b"thumb-bytes".to_vec())),
            })
            .await
            .unwrap();

        assert_eq!(derived.status, ContentStatus::Uploaded);
        assert_eq!(derived.derivation_type, "thumbnail");
    }

    #[tokio::test]
    async fn upload_derived_content_rejects_unknown_parent() {
        let service = memory_service();
        let err = service
            .upload_derived_content(UploadDerivedContentRequest {
                parent_id: Uuid::new_v4(),
                tenant_id: "t1".to_string(),
                owner_id: "o1".to_string(),
                owner_type: "user".to_string(),
                name: "thumb.png".to_string(),
                document_type: "image".to_string(),
                mime_type: None,
                derivation_type: "thumbnail".to_string(),
                variant: "thumb_small".to_string(),
                derivation_params: HashMap::new(),
                storage_backend_name: "memory".to_string(),
                reader: Box::new(std::io::Cursor::new(b"x".to_vec())),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ContentNotFound(_)));
    }

    #[tokio::test]
    async fn download_content_returns_latest_version_bytes() {
        let service = memory_service();
        let content = service.upload_content(upload_req(b"v1 bytes")).await.unwrap();

        let mut reader = service.download_content(content.id).await.unwrap();
        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buf)
            .await
            .unwrap();
        assert_eq!(buf, b"v1 bytes");
    }

    impl ContentService {
        async fn get_content_metadata_for_test(
            &self,
            content_id: Uuid,
        ) -> Option<crate::content::application::domain::entities::ContentMetadata> {
            self.content_metadata_repo.get(content_id).await.unwrap()
        }

        async fn count_contents_for_test(&self) -> u64 {
            use crate::content::application::ports::outgoing::content_query::ContentFilter;
            self.content_query.count(ContentFilter::default()).await.unwrap()
        }
    }
}
