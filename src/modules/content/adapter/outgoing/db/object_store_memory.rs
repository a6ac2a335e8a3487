use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::content::application::domain::entities::{Object, ObjectMetadata, ObjectStatus};
use crate::content::application::ports::outgoing::object_query::{ObjectQuery, ObjectQueryError};
use crate::content::application::ports::outgoing::object_repository::{
    NewObject, ObjectPatch, ObjectRepository, ObjectRepositoryError,
};

#[derive(Default)]
pub struct MemoryObjectStore {
    rows: RwLock<HashMap<Uuid, Object>>,
    metadata: RwLock<HashMap<Uuid, ObjectMetadata>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectRepository for MemoryObjectStore {
    async fn create(&self, new_object: NewObject) -> Result<Object, ObjectRepositoryError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| ObjectRepositoryError::Repository("poisoned lock".into()))?;

        if rows.values().any(|o| {
            !o.is_deleted()
                && o.storage_backend_name == new_object.storage_backend_name
                && o.object_key == new_object.object_key
        }) {
            return Err(ObjectRepositoryError::KeyAlreadyExists {
                backend: new_object.storage_backend_name,
                key: new_object.object_key,
            });
        }

        let next_version = rows
            .values()
            .filter(|o| o.content_id == new_object.content_id)
            .map(|o| o.version)
            .max()
            .unwrap_or(0)
            + 1;

        let now = Utc::now();
        let object = Object {
            id: new_object.id,
            content_id: new_object.content_id,
            storage_backend_name: new_object.storage_backend_name,
            storage_class: new_object.storage_class,
            object_key: new_object.object_key,
            file_name: new_object.file_name,
            version: next_version,
            object_type: new_object.object_type,
            status: ObjectStatus::Created,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        rows.insert(object.id, object.clone());
        Ok(object)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ObjectPatch,
    ) -> Result<Object, ObjectRepositoryError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| ObjectRepositoryError::Repository("poisoned lock".into()))?;
        let object = rows.get_mut(&id).ok_or(ObjectRepositoryError::NotFound(id))?;
        if let Some(file_name) = patch.file_name {
            object.file_name = file_name;
        }
        if let Some(storage_class) = patch.storage_class {
            object.storage_class = storage_class;
        }
        if let Some(status) = patch.status {
            object.status = status;
        }
        object.updated_at = Utc::now();
        Ok(object.clone())
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ObjectRepositoryError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| ObjectRepositoryError::Repository("poisoned lock".into()))?;
        let object = rows.get_mut(&id).ok_or(ObjectRepositoryError::NotFound(id))?;
        object.deleted_at = Some(at);
        object.status = ObjectStatus::Deleted;
        object.updated_at = at;
        Ok(())
    }

    async fn set_metadata(
        &self,
        object_id: Uuid,
        metadata: ObjectMetadata,
    ) -> Result<(), ObjectRepositoryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| ObjectRepositoryError::Repository("poisoned lock".into()))?;
        if !rows.contains_key(&object_id) {
            return Err(ObjectRepositoryError::NotFound(object_id));
        }
        drop(rows);
        let mut store = self
            .metadata
            .write()
            .map_err(|_| ObjectRepositoryError::Repository("poisoned lock".into()))?;
        store.insert(object_id, metadata);
        Ok(())
    }
}

#[async_trait]
impl ObjectQuery for MemoryObjectStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Object>, ObjectQueryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| ObjectQueryError::Repository("poisoned lock".into()))?;
        Ok(rows.get(&id).cloned())
    }

    async fn list_by_content_id(&self, content_id: Uuid) -> Result<Vec<Object>, ObjectQueryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| ObjectQueryError::Repository("poisoned lock".into()))?;
        let mut matching: Vec<Object> = rows
            .values()
            .filter(|o| o.content_id == content_id && !o.is_deleted())
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(matching)
    }

    async fn get_metadata(&self, object_id: Uuid) -> Result<Option<ObjectMetadata>, ObjectQueryError> {
        let store = self
            .metadata
            .read()
            .map_err(|_| ObjectQueryError::Repository("poisoned lock".into()))?;
        Ok(store.get(&object_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_object(content_id: Uuid, backend: &str, key: &str) -> NewObject {
        NewObject {
            id: Uuid::new_v4(),
            content_id,
            storage_backend_name: backend.to_string(),
            storage_class: String::new(),
            object_key: key.to_string(),
            file_name: "file.bin".to_string(),
            object_type: "original".to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_incrementing_version() {
        let store = MemoryObjectStore::new();
        let content_id = Uuid::new_v4();
        let first = store
            .create(new_object(content_id, "memory", "k1"))
            .await
            .unwrap();
        let second = store
            .create(new_object(content_id, "memory", "k2"))
            .await
            .unwrap();
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
    }

    #[tokio::test]
    async fn duplicate_key_on_same_backend_rejected() {
        let store = MemoryObjectStore::new();
        let content_id = Uuid::new_v4();
        store
            .create(new_object(content_id, "memory", "dup"))
            .await
            .unwrap();
        let err = store
            .create(new_object(Uuid::new_v4(), "memory", "dup"))
            .await
            .unwrap_err();
        assert!(matches!(err, ObjectRepositoryError::KeyAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn list_by_content_id_excludes_deleted_and_sorts_desc() {
        let store = MemoryObjectStore::new();
        let content_id = Uuid::new_v4();
        let first = store
            .create(new_object(content_id, "memory", "k1"))
            .await
            .unwrap();
        let second = store
            .create(new_object(content_id, "memory", "k2"))
            .await
            .unwrap();
        store.soft_delete(first.id, Utc::now()).await.unwrap();
        let listed = store.list_by_content_id(content_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, second.id);
    }

    #[tokio::test]
    async fn set_metadata_on_unknown_object_fails() {
        let store = MemoryObjectStore::new();
        let err = store
            .set_metadata(Uuid::new_v4(), ObjectMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ObjectRepositoryError::NotFound(_)));
    }
}
