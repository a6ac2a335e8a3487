use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionError, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::content::adapter::outgoing::db::sea_orm_entity::object::{
    ActiveModel, Column, Entity, Model,
};
use crate::content::adapter::outgoing::db::sea_orm_entity::object_metadata::{
    self, ActiveModel as MetadataActiveModel,
};
use crate::content::application::domain::entities::{Object, ObjectMetadata, ObjectStatus};
use crate::content::application::ports::outgoing::object_repository::{
    NewObject, ObjectPatch, ObjectRepository, ObjectRepositoryError,
};

#[derive(Clone)]
pub struct ObjectRepositoryPostgres {
    db: Arc<DatabaseConnection>,
}

impl ObjectRepositoryPostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ObjectRepository for ObjectRepositoryPostgres {
    async fn create(&self, new_object: NewObject) -> Result<Object, ObjectRepositoryError> {
        // Version assignment must be gap-free and collision-free under
        // concurrent inserts for one content_id (spec: version = max+1,
        // serialised). `lock_exclusive` issues `SELECT ... FOR UPDATE`
        // inside the transaction so a second concurrent `create` for the
        // same content blocks on the row(s) the first one touched rather
        // than racing to compute the same next_version.
        self.db
            .transaction::<_, Object, ObjectRepositoryError>(|txn| {
                Box::pin(async move {
                    let next_version = Entity::find()
                        .filter(Column::ContentId.eq(new_object.content_id))
                        .order_by_desc(Column::Version)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .map_err(map_db_err)?
                        .map(|m| m.version)
                        .unwrap_or(0)
                        + 1;

                    let now = Utc::now().fixed_offset();
                    let model = ActiveModel {
                        id: Set(new_object.id),
                        content_id: Set(new_object.content_id),
                        storage_backend_name: Set(new_object.storage_backend_name.clone()),
                        storage_class: Set(new_object.storage_class),
                        object_key: Set(new_object.object_key.clone()),
                        file_name: Set(new_object.file_name),
                        version: Set(next_version),
                        object_type: Set(new_object.object_type),
                        status: Set(ObjectStatus::Created.into()),
                        created_at: Set(now),
                        updated_at: Set(now),
                        deleted_at: Set(None),
                    };

                    let inserted = model.insert(txn).await.map_err(|e| {
                        map_key_conflict(e, &new_object.storage_backend_name, &new_object.object_key)
                    })?;
                    model_to_domain(inserted)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(e) => map_db_err(e),
                TransactionError::Transaction(e) => e,
            })
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ObjectPatch,
    ) -> Result<Object, ObjectRepositoryError> {
        let existing = Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(ObjectRepositoryError::NotFound(id))?;

        let mut model: ActiveModel = existing.into();
        if let Some(file_name) = patch.file_name {
            model.file_name = Set(file_name);
        }
        if let Some(storage_class) = patch.storage_class {
            model.storage_class = Set(storage_class);
        }
        if let Some(status) = patch.status {
            model.status = Set(status.into());
        }
        model.updated_at = Set(Utc::now().fixed_offset());

        let updated = model.update(&*self.db).await.map_err(map_db_err)?;
        model_to_domain(updated)
    }

    async fn soft_delete(
        &self,
        id: Uuid,
        at: chrono::DateTime<Utc>,
    ) -> Result<(), ObjectRepositoryError> {
        let existing = Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(ObjectRepositoryError::NotFound(id))?;

        let mut model: ActiveModel = existing.into();
        model.deleted_at = Set(Some(at.fixed_offset()));
        model.status = Set(ObjectStatus::Deleted.into());
        model.updated_at = Set(at.fixed_offset());
        model.update(&*self.db).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn set_metadata(
        &self,
        object_id: Uuid,
        metadata: ObjectMetadata,
    ) -> Result<(), ObjectRepositoryError> {
        Entity::find_by_id(object_id)
            .one(&*self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(ObjectRepositoryError::NotFound(object_id))?;

        let existing = object_metadata::Entity::find_by_id(object_id)
            .one(&*self.db)
            .await
            .map_err(map_db_err)?;

        let now = Utc::now().fixed_offset();
        let is_update = existing.is_some();
        let model = MetadataActiveModel {
            object_id: Set(object_id),
            size_bytes: Set(metadata.size_bytes),
            mime_type: Set(metadata.mime_type),
            etag: Set(metadata.etag),
            metadata: Set(serde_json::to_value(&metadata.metadata).unwrap_or_default()),
            created_at: Set(existing.map(|e| e.created_at).unwrap_or(now)),
            updated_at: Set(now),
        };

        if is_update {
            model.update(&*self.db).await.map_err(map_db_err)?;
        } else {
            model.insert(&*self.db).await.map_err(map_db_err)?;
        }
        Ok(())
    }
}

fn model_to_domain(model: Model) -> Result<Object, ObjectRepositoryError> {
    Ok(Object {
        id: model.id,
        content_id: model.content_id,
        storage_backend_name: model.storage_backend_name,
        storage_class: model.storage_class,
        object_key: model.object_key,
        file_name: model.file_name,
        version: model.version,
        object_type: model.object_type,
        status: model.status.into(),
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
        deleted_at: model.deleted_at.map(|d| d.into()),
    })
}

fn map_key_conflict(e: DbErr, backend: &str, key: &str) -> ObjectRepositoryError {
    let msg = e.to_string().to_lowercase();
    if msg.contains("duplicate") || msg.contains("unique") || msg.contains("23505") {
        ObjectRepositoryError::KeyAlreadyExists {
            backend: backend.to_string(),
            key: key.to_string(),
        }
    } else {
        ObjectRepositoryError::Repository(e.to_string())
    }
}

fn map_db_err(e: DbErr) -> ObjectRepositoryError {
    ObjectRepositoryError::Repository(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn mock_object(id: Uuid, content_id: Uuid, version: i32) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id,
            content_id,
            storage_backend_name: "memory".to_string(),
            storage_class: String::new(),
            object_key: "k1".to_string(),
            file_name: "file.bin".to_string(),
            version,
            object_type: "original".to_string(),
            status: ObjectStatus::Created.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn new_object(content_id: Uuid) -> NewObject {
        NewObject {
            id: Uuid::new_v4(),
            content_id,
            storage_backend_name: "memory".to_string(),
            storage_class: String::new(),
            object_key: "k2".to_string(),
            file_name: "file.bin".to_string(),
            object_type: "original".to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_next_version_after_existing_rows() {
        let content_id = Uuid::new_v4();
        let existing = mock_object(Uuid::new_v4(), content_id, 3);
        let mut inserted = mock_object(Uuid::new_v4(), content_id, 4);
        inserted.object_key = "k2".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing], vec![inserted]])
            .into_connection();

        let repo = ObjectRepositoryPostgres::new(Arc::new(db));
        let object = repo.create(new_object(content_id)).await.unwrap();
        assert_eq!(object.version, 4);
    }

    #[tokio::test]
    async fn create_maps_unique_violation_to_key_conflict() {
        let content_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .append_query_errors(vec![DbErr::Custom(
                "duplicate key value violates unique constraint \"idx_object_backend_key_unique\""
                    .to_string(),
            )])
            .into_connection();

        let repo = ObjectRepositoryPostgres::new(Arc::new(db));
        let err = repo.create(new_object(content_id)).await.unwrap_err();
        assert!(matches!(
            err,
            ObjectRepositoryError::KeyAlreadyExists { .. }
        ));
    }

    #[tokio::test]
    async fn update_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let repo = ObjectRepositoryPostgres::new(Arc::new(db));
        let err = repo
            .update(Uuid::new_v4(), ObjectPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ObjectRepositoryError::NotFound(_)));
    }
}
