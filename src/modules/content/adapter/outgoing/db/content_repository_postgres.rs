use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use std::sync::Arc;
use uuid::Uuid;

use crate::content::adapter::outgoing::db::sea_orm_entity::content::{ActiveModel, Entity, Model};
use crate::content::application::domain::entities::Content;
use crate::content::application::ports::outgoing::content_repository::{
    ContentPatch, ContentRepository, ContentRepositoryError, NewContent,
};

#[derive(Clone)]
pub struct ContentRepositoryPostgres {
    db: Arc<DatabaseConnection>,
}

impl ContentRepositoryPostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContentRepository for ContentRepositoryPostgres {
    async fn create(&self, new_content: NewContent) -> Result<Content, ContentRepositoryError> {
        let tenant_id = parse_uuid(&new_content.tenant_id)?;
        let owner_id = parse_uuid(&new_content.owner_id)?;
        let now = Utc::now().fixed_offset();

        let model = ActiveModel {
            id: Set(new_content.id),
            tenant_id: Set(tenant_id),
            owner_id: Set(owner_id),
            owner_type: Set(new_content.owner_type),
            name: Set(new_content.name),
            description: Set(new_content.description),
            document_type: Set(new_content.document_type),
            status: Set(crate::content::application::domain::entities::ContentStatus::Created.into()),
            derivation_type: Set(new_content.derivation_type),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let inserted = model
            .insert(&*self.db)
            .await
            .map_err(|e| map_create_err(e, new_content.id))?;

        model_to_domain(inserted)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ContentPatch,
    ) -> Result<Content, ContentRepositoryError> {
        let existing = Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(ContentRepositoryError::NotFound(id))?;

        if let Some(ref target) = patch.status {
            let current: crate::content::application::domain::entities::ContentStatus =
                existing.status.into();
            if !current.can_transition_to(target) {
                return Err(ContentRepositoryError::InvalidStatusTransition {
                    from: current.to_string(),
                    to: target.to_string(),
                });
            }
        }

        let mut model: ActiveModel = existing.into();
        if let Some(name) = patch.name {
            model.name = Set(name);
        }
        if let Some(description) = patch.description {
            model.description = Set(description);
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
    ) -> Result<(), ContentRepositoryError> {
        let existing = Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(ContentRepositoryError::NotFound(id))?;

        let mut model: ActiveModel = existing.into();
        model.deleted_at = Set(Some(at.fixed_offset()));
        model.updated_at = Set(at.fixed_offset());
        model.update(&*self.db).await.map_err(map_db_err)?;
        Ok(())
    }
}

pub(super) fn parse_uuid(s: &str) -> Result<Uuid, ContentRepositoryError> {
    Uuid::parse_str(s)
        .map_err(|e| ContentRepositoryError::Repository(format!("invalid uuid {s}: {e}")))
}

pub(super) fn model_to_domain(model: Model) -> Result<Content, ContentRepositoryError> {
    Ok(Content {
        id: model.id,
        tenant_id: model.tenant_id.to_string(),
        owner_id: model.owner_id.to_string(),
        owner_type: model.owner_type,
        name: model.name,
        description: model.description,
        document_type: model.document_type,
        status: model.status.into(),
        derivation_type: model.derivation_type,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
        deleted_at: model.deleted_at.map(|d| d.into()),
    })
}

fn map_create_err(e: DbErr, id: Uuid) -> ContentRepositoryError {
    let msg = e.to_string().to_lowercase();
    if msg.contains("duplicate") || msg.contains("unique") || msg.contains("23505") {
        ContentRepositoryError::AlreadyExists(id)
    } else {
        ContentRepositoryError::Repository(e.to_string())
    }
}

fn map_db_err(e: DbErr) -> ContentRepositoryError {
    ContentRepositoryError::Repository(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::application::domain::entities::ContentStatus;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn new_content(id: Uuid) -> NewContent {
        NewContent {
            id,
            tenant_id: Uuid::new_v4().to_string(),
            owner_id: Uuid::new_v4().to_string(),
            owner_type: "user".to_string(),
            name: "file.txt".to_string(),
            description: String::new(),
            document_type: "document".to_string(),
            derivation_type: String::new(),
        }
    }

    fn mock_model(id: Uuid, tenant_id: Uuid, owner_id: Uuid) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id,
            tenant_id,
            owner_id,
            owner_type: "user".to_string(),
            name: "file.txt".to_string(),
            description: String::new(),
            document_type: "document".to_string(),
            status: ContentStatus::Created.into(),
            derivation_type: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn create_maps_row_back_into_domain() {
        let id = Uuid::new_v4();
        let req = new_content(id);
        let tenant_id = Uuid::parse_str(&req.tenant_id).unwrap();
        let owner_id = Uuid::parse_str(&req.owner_id).unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![mock_model(id, tenant_id, owner_id)]])
            .into_connection();

        let repo = ContentRepositoryPostgres::new(Arc::new(db));
        let content = repo.create(req).await.unwrap();
        assert_eq!(content.id, id);
        assert_eq!(content.status, ContentStatus::Created);
    }

    #[tokio::test]
    async fn create_rejects_invalid_tenant_uuid() {
        let mut req = new_content(Uuid::new_v4());
        req.tenant_id = "not-a-uuid".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = ContentRepositoryPostgres::new(Arc::new(db));
        let err = repo.create(req).await.unwrap_err();
        assert!(matches!(err, ContentRepositoryError::Repository(_)));
    }

    #[tokio::test]
    async fn create_duplicate_id_maps_to_already_exists() {
        let id = Uuid::new_v4();
        let req = new_content(id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Custom(
                "duplicate key value violates unique constraint \"content_pkey\"".to_string(),
            )])
            .into_connection();

        let repo = ContentRepositoryPostgres::new(Arc::new(db));
        let err = repo.create(req).await.unwrap_err();
        assert_eq!(err, ContentRepositoryError::AlreadyExists(id));
    }

    #[tokio::test]
    async fn update_rejects_illegal_transition() {
        let id = Uuid::new_v4();
        let model = mock_model(id, Uuid::new_v4(), Uuid::new_v4());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model]])
            .into_connection();

        let repo = ContentRepositoryPostgres::new(Arc::new(db));
        let err = repo
            .update(
                id,
                ContentPatch {
                    status: Some(ContentStatus::Processed),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ContentRepositoryError::InvalidStatusTransition { .. }
        ));
    }

    #[tokio::test]
    async fn update_applies_a_legal_transition() {
        let id = Uuid::new_v4();
        let existing = mock_model(id, Uuid::new_v4(), Uuid::new_v4());
        let mut updated = existing.clone();
        updated.status = ContentStatus::Uploading.into();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing], vec![updated]])
            .into_connection();

        let repo = ContentRepositoryPostgres::new(Arc::new(db));
        let content = repo
            .update(
                id,
                ContentPatch {
                    status: Some(ContentStatus::Uploading),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(content.status, ContentStatus::Uploading);
    }

    #[tokio::test]
    async fn update_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let repo = ContentRepositoryPostgres::new(Arc::new(db));
        let err = repo
            .update(Uuid::new_v4(), ContentPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ContentRepositoryError::NotFound(_)));
    }
}
