use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;
use uuid::Uuid;

use crate::content::adapter::outgoing::db::sea_orm_entity::content_metadata::{
    ActiveModel, Entity, Model,
};
use crate::content::application::domain::entities::ContentMetadata;
use crate::content::application::ports::outgoing::content_metadata_repository::{
    ContentMetadataRepository, ContentMetadataRepositoryError,
};

#[derive(Clone)]
pub struct ContentMetadataRepositoryPostgres {
    db: Arc<DatabaseConnection>,
}

impl ContentMetadataRepositoryPostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn model_to_domain(model: Model) -> ContentMetadata {
    ContentMetadata {
        content_id: model.content_id,
        tags: model.tags,
        file_size: model.file_size,
        file_name: model.file_name,
        mime_type: model.mime_type,
        checksum: model.checksum,
        checksum_algorithm: model.checksum_algorithm,
        metadata: serde_json::from_value(model.metadata).unwrap_or_default(),
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    }
}

/// Mirrors the merge semantics of the in-memory adapter: an empty
/// string/vec/map on the incoming value leaves the stored value alone.
fn merge(existing: Option<&Model>, incoming: ContentMetadata) -> ContentMetadata {
    let Some(existing) = existing else {
        return incoming;
    };
    ContentMetadata {
        content_id: incoming.content_id,
        tags: if incoming.tags.is_empty() {
            existing.tags.clone()
        } else {
            incoming.tags
        },
        file_size: if incoming.file_size == 0 {
            existing.file_size
        } else {
            incoming.file_size
        },
        file_name: if incoming.file_name.is_empty() {
            existing.file_name.clone()
        } else {
            incoming.file_name
        },
        mime_type: if incoming.mime_type.is_empty() {
            existing.mime_type.clone()
        } else {
            incoming.mime_type
        },
        checksum: if incoming.checksum.is_empty() {
            existing.checksum.clone()
        } else {
            incoming.checksum
        },
        checksum_algorithm: if incoming.checksum_algorithm.is_empty() {
            existing.checksum_algorithm.clone()
        } else {
            incoming.checksum_algorithm
        },
        metadata: if incoming.metadata.is_empty() {
            serde_json::from_value(existing.metadata.clone()).unwrap_or_default()
        } else {
            incoming.metadata
        },
        created_at: existing.created_at.into(),
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl ContentMetadataRepository for ContentMetadataRepositoryPostgres {
    async fn get(
        &self,
        content_id: Uuid,
    ) -> Result<Option<ContentMetadata>, ContentMetadataRepositoryError> {
        let row = Entity::find_by_id(content_id)
            .one(&*self.db)
            .await
            .map_err(|e| ContentMetadataRepositoryError::Repository(e.to_string()))?;
        Ok(row.map(model_to_domain))
    }

    async fn upsert(
        &self,
        metadata: ContentMetadata,
    ) -> Result<ContentMetadata, ContentMetadataRepositoryError> {
        let existing = Entity::find_by_id(metadata.content_id)
            .one(&*self.db)
            .await
            .map_err(|e| ContentMetadataRepositoryError::Repository(e.to_string()))?;

        let merged = merge(existing.as_ref(), metadata);
        let now = Utc::now().fixed_offset();
        let model = ActiveModel {
            content_id: Set(merged.content_id),
            tags: Set(merged.tags.clone()),
            file_size: Set(merged.file_size),
            file_name: Set(merged.file_name.clone()),
            mime_type: Set(merged.mime_type.clone()),
            checksum: Set(merged.checksum.clone()),
            checksum_algorithm: Set(merged.checksum_algorithm.clone()),
            metadata: Set(serde_json::to_value(&merged.metadata).unwrap_or_default()),
            created_at: Set(merged.created_at.fixed_offset()),
            updated_at: Set(now),
        };

        if existing.is_some() {
            model
                .update(&*self.db)
                .await
                .map_err(|e| ContentMetadataRepositoryError::Repository(e.to_string()))?;
        } else {
            model
                .insert(&*self.db)
                .await
                .map_err(|e| ContentMetadataRepositoryError::Repository(e.to_string()))?;
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn mock_row(content_id: Uuid) -> Model {
        let now = chrono::Utc::now().fixed_offset();
        Model {
            content_id,
            tags: vec!["a".to_string()],
            file_size: 0,
            file_name: "first.txt".to_string(),
            mime_type: String::new(),
            checksum: String::new(),
            checksum_algorithm: String::new(),
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn upsert_creates_when_absent() {
        let content_id = Uuid::new_v4();
        let mut inserted = mock_row(content_id);
        inserted.tags = vec!["a".to_string()];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new(), vec![inserted]])
            .into_connection();

        let repo = ContentMetadataRepositoryPostgres::new(Arc::new(db));
        let result = repo
            .upsert(ContentMetadata {
                content_id,
                tags: vec!["a".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.tags, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn upsert_merges_partial_update_over_existing_row() {
        let content_id = Uuid::new_v4();
        let existing = mock_row(content_id);
        let mut updated = existing.clone();
        updated.file_size = 42;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing], vec![updated]])
            .into_connection();

        let repo = ContentMetadataRepositoryPostgres::new(Arc::new(db));
        let merged = repo
            .upsert(ContentMetadata {
                content_id,
                file_size: 42,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(merged.tags, vec!["a".to_string()]);
        assert_eq!(merged.file_name, "first.txt");
        assert_eq!(merged.file_size, 42);
    }

    #[tokio::test]
    async fn get_returns_none_when_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();
        let repo = ContentMetadataRepositoryPostgres::new(Arc::new(db));
        assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
