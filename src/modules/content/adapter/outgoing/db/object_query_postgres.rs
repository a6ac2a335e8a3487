use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use uuid::Uuid;

use crate::content::adapter::outgoing::db::sea_orm_entity::object::{Column, Entity};
use crate::content::adapter::outgoing::db::sea_orm_entity::object_metadata;
use crate::content::application::domain::entities::{Object, ObjectMetadata};
use crate::content::application::ports::outgoing::object_query::{ObjectQuery, ObjectQueryError};

#[derive(Clone)]
pub struct ObjectQueryPostgres {
    db: Arc<DatabaseConnection>,
}

impl ObjectQueryPostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn model_to_domain(model: crate::content::adapter::outgoing::db::sea_orm_entity::object::Model) -> Object {
    Object {
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
    }
}

#[async_trait]
impl ObjectQuery for ObjectQueryPostgres {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Object>, ObjectQueryError> {
        let row = Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(|e| ObjectQueryError::Repository(e.to_string()))?;
        Ok(row.map(model_to_domain))
    }

    async fn list_by_content_id(&self, content_id: Uuid) -> Result<Vec<Object>, ObjectQueryError> {
        let rows = Entity::find()
            .filter(Column::ContentId.eq(content_id))
            .filter(Column::DeletedAt.is_null())
            .order_by_desc(Column::Version)
            .all(&*self.db)
            .await
            .map_err(|e| ObjectQueryError::Repository(e.to_string()))?;
        Ok(rows.into_iter().map(model_to_domain).collect())
    }

    async fn get_metadata(&self, object_id: Uuid) -> Result<Option<ObjectMetadata>, ObjectQueryError> {
        let row = object_metadata::Entity::find_by_id(object_id)
            .one(&*self.db)
            .await
            .map_err(|e| ObjectQueryError::Repository(e.to_string()))?;
        Ok(row.map(|m| ObjectMetadata {
            object_id: m.object_id,
            size_bytes: m.size_bytes,
            mime_type: m.mime_type,
            etag: m.etag,
            metadata: serde_json::from_value(m.metadata).unwrap_or_default(),
            created_at: m.created_at.into(),
            updated_at: m.updated_at.into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::application::domain::entities::ObjectStatus;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn mock_object(
        id: Uuid,
        content_id: Uuid,
        version: i32,
    ) -> crate::content::adapter::outgoing::db::sea_orm_entity::object::Model {
        let now = chrono::Utc::now().fixed_offset();
        crate::content::adapter::outgoing::db::sea_orm_entity::object::Model {
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

    #[tokio::test]
    async fn list_by_content_id_orders_by_version_desc() {
        let content_id = Uuid::new_v4();
        let rows = vec![
            mock_object(Uuid::new_v4(), content_id, 2),
            mock_object(Uuid::new_v4(), content_id, 1),
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![rows])
            .into_connection();

        let query = ObjectQueryPostgres::new(Arc::new(db));
        let listed = query.list_by_content_id(content_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].version, 2);
    }

    #[tokio::test]
    async fn get_metadata_returns_none_when_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<
                crate::content::adapter::outgoing::db::sea_orm_entity::object_metadata::Model,
            >::new()])
            .into_connection();

        let query = ObjectQueryPostgres::new(Arc::new(db));
        assert!(query.get_metadata(Uuid::new_v4()).await.unwrap().is_none());
    }
}
