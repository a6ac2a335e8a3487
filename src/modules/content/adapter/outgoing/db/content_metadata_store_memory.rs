use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::content::application::domain::entities::ContentMetadata;
use crate::content::application::ports::outgoing::content_metadata_repository::{
    ContentMetadataRepository, ContentMetadataRepositoryError,
};

#[derive(Default)]
pub struct MemoryContentMetadataStore {
    rows: RwLock<HashMap<Uuid, ContentMetadata>>,
}

impl MemoryContentMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `upsert` only overwrites fields the caller actually supplied; an empty
/// string/vec/map on the incoming value means "leave the stored value as
/// is", matching the port's merge semantics.
fn merge(existing: Option<ContentMetadata>, incoming: ContentMetadata) -> ContentMetadata {
    let Some(existing) = existing else {
        return incoming;
    };
    ContentMetadata {
        content_id: incoming.content_id,
        tags: if incoming.tags.is_empty() {
            existing.tags
        } else {
            incoming.tags
        },
        file_size: if incoming.file_size == 0 {
            existing.file_size
        } else {
            incoming.file_size
        },
        file_name: if incoming.file_name.is_empty() {
            existing.file_name
        } else {
            incoming.file_name
        },
        mime_type: if incoming.mime_type.is_empty() {
            existing.mime_type
        } else {
            incoming.mime_type
        },
        checksum: if incoming.checksum.is_empty() {
            existing.checksum
        } else {
            incoming.checksum
        },
        checksum_algorithm: if incoming.checksum_algorithm.is_empty() {
            existing.checksum_algorithm
        } else {
            incoming.checksum_algorithm
        },
        metadata: if incoming.metadata.is_empty() {
            existing.metadata
        } else {
            incoming.metadata
        },
        created_at: existing.created_at,
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl ContentMetadataRepository for MemoryContentMetadataStore {
    async fn get(
        &self,
        content_id: Uuid,
    ) -> Result<Option<ContentMetadata>, ContentMetadataRepositoryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| ContentMetadataRepositoryError::Repository("poisoned lock".into()))?;
        Ok(rows.get(&content_id).cloned())
    }

    async fn upsert(
        &self,
        metadata: ContentMetadata,
    ) -> Result<ContentMetadata, ContentMetadataRepositoryError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| ContentMetadataRepositoryError::Repository("poisoned lock".into()))?;
        let merged = merge(rows.get(&metadata.content_id).cloned(), metadata);
        rows.insert(merged.content_id, merged.clone());
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_creates_then_merges_partial_updates() {
        let store = MemoryContentMetadataStore::new();
        let content_id = Uuid::new_v4();
        store
            .upsert(ContentMetadata {
                content_id,
                tags: vec!["a".to_string()],
                file_name: "first.txt".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let merged = store
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
    async fn get_on_unknown_content_returns_none() {
        let store = MemoryContentMetadataStore::new();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
