use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use uuid::Uuid;

use crate::content::adapter::outgoing::db::sea_orm_entity::content_derived::{
    ActiveModel, Column, Entity, Model,
};
use crate::content::application::domain::entities::{resolve_variant, DerivedContent};
use crate::content::application::ports::outgoing::content_query::ContentQuery;
use crate::content::application::ports::outgoing::derived_repository::{
    DerivedContentFilter, DerivedContentSort, DerivedRepository, DerivedRepositoryError,
    NewDerivedContent, PageRequest,
};

/// As with the in-memory adapter, the content-status filter dimension joins
/// against `ContentQuery` rather than this table directly.
#[derive(Clone)]
pub struct DerivedRepositoryPostgres {
    db: Arc<DatabaseConnection>,
    content_query: Arc<dyn ContentQuery>,
}

impl DerivedRepositoryPostgres {
    pub fn new(db: Arc<DatabaseConnection>, content_query: Arc<dyn ContentQuery>) -> Self {
        Self { db, content_query }
    }
}

fn model_to_domain(model: Model) -> DerivedContent {
    DerivedContent {
        parent_id: model.parent_id,
        content_id: model.content_id,
        derivation_type: model.derivation_type,
        variant: model.variant,
        derivation_params: serde_json::from_value(model.derivation_params).unwrap_or_default(),
        processing_metadata: serde_json::from_value(model.processing_metadata).unwrap_or_default(),
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
        deleted_at: model.deleted_at.map(|d| d.into()),
    }
}

fn map_create_err(e: DbErr, parent_id: Uuid, content_id: Uuid) -> DerivedRepositoryError {
    let msg = e.to_string().to_lowercase();
    if msg.contains("duplicate") || msg.contains("unique") || msg.contains("23505") {
        DerivedRepositoryError::AlreadyExists(parent_id, content_id)
    } else {
        DerivedRepositoryError::Repository(e.to_string())
    }
}

#[async_trait]
impl DerivedRepository for DerivedRepositoryPostgres {
    async fn create(
        &self,
        new_edge: NewDerivedContent,
    ) -> Result<DerivedContent, DerivedRepositoryError> {
        if new_edge.parent_id == new_edge.content_id {
            return Err(DerivedRepositoryError::SelfReference);
        }

        let now = Utc::now().fixed_offset();
        let model = ActiveModel {
            parent_id: Set(new_edge.parent_id),
            content_id: Set(new_edge.content_id),
            derivation_type: Set(new_edge.derivation_type),
            variant: Set(new_edge.variant),
            derivation_params: Set(serde_json::to_value(&new_edge.derivation_params)
                .unwrap_or_default()),
            processing_metadata: Set(serde_json::to_value(&new_edge.processing_metadata)
                .unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let inserted = model
            .insert(&*self.db)
            .await
            .map_err(|e| map_create_err(e, new_edge.parent_id, new_edge.content_id))?;
        Ok(model_to_domain(inserted))
    }

    async fn list(
        &self,
        filter: DerivedContentFilter,
        sort: DerivedContentSort,
        page: PageRequest,
    ) -> Result<Vec<DerivedContent>, DerivedRepositoryError> {
        let mut query = Entity::find().filter(Column::DeletedAt.is_null());
        if !filter.parent_ids.is_empty() {
            query = query.filter(Column::ParentId.is_in(filter.parent_ids.clone()));
        }
        if let Some(after) = filter.created_after {
            query = query.filter(Column::CreatedAt.gte(after.fixed_offset()));
        }
        if let Some(before) = filter.created_before {
            query = query.filter(Column::CreatedAt.lte(before.fixed_offset()));
        }
        if let Some(after) = filter.updated_after {
            query = query.filter(Column::UpdatedAt.gte(after.fixed_offset()));
        }
        if let Some(before) = filter.updated_before {
            query = query.filter(Column::UpdatedAt.lte(before.fixed_offset()));
        }

        let rows = query
            .all(&*self.db)
            .await
            .map_err(|e| DerivedRepositoryError::Repository(e.to_string()))?;

        let type_variant_allowlisted = !filter.derivation_types.is_empty()
            || !filter.variants.is_empty()
            || !filter.derivation_type_variant_pairs.is_empty();

        let mut matching = Vec::new();
        for row in rows {
            let edge = model_to_domain(row);

            if type_variant_allowlisted {
                let variant = resolve_variant(&edge);
                let type_match = filter.derivation_types.contains(&edge.derivation_type);
                let variant_match = filter.variants.contains(&variant);
                let pair_match = filter
                    .derivation_type_variant_pairs
                    .iter()
                    .any(|(t, v)| t == &edge.derivation_type && v == &variant);
                if !(type_match || variant_match || pair_match) {
                    continue;
                }
            }

            if !filter.content_statuses.is_empty() {
                let content = self
                    .content_query
                    .get_by_id(edge.content_id)
                    .await
                    .map_err(|e| DerivedRepositoryError::Repository(e.to_string()))?;
                match content {
                    Some(c) if filter.content_statuses.contains(&c.status) => {}
                    _ => continue,
                }
            }

            matching.push(edge);
        }

        // Tie-break on content_id ascending so equal sort keys stay deterministic.
        match sort {
            DerivedContentSort::CreatedAtDesc => matching
                .sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.content_id.cmp(&b.content_id))),
            DerivedContentSort::CreatedAtAsc => matching
                .sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.content_id.cmp(&b.content_id))),
            DerivedContentSort::TypeVariant => matching.sort_by(|a, b| {
                (a.derivation_type.as_str(), resolve_variant(a))
                    .cmp(&(b.derivation_type.as_str(), resolve_variant(b)))
                    .then(a.content_id.cmp(&b.content_id))
            }),
        }

        let offset = page.offset as usize;
        if offset >= matching.len() {
            return Ok(Vec::new());
        }
        let end = if page.limit == 0 {
            matching.len()
        } else {
            (offset + page.limit as usize).min(matching.len())
        };
        Ok(matching[offset..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::adapter::outgoing::db::content_store_memory::MemoryContentStore;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn mock_edge(parent_id: Uuid, content_id: Uuid, derivation_type: &str, variant: &str) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            parent_id,
            content_id,
            derivation_type: derivation_type.to_string(),
            variant: variant.to_string(),
            derivation_params: serde_json::json!({}),
            processing_metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn repo(db: sea_orm::DatabaseConnection) -> DerivedRepositoryPostgres {
        DerivedRepositoryPostgres::new(Arc::new(db), Arc::new(MemoryContentStore::new()))
    }

    #[tokio::test]
    async fn create_rejects_self_reference_without_hitting_the_database() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let id = Uuid::new_v4();
        let repo = repo(db);
        let err = repo
            .create(NewDerivedContent {
                parent_id: id,
                content_id: id,
                derivation_type: "thumbnail".to_string(),
                variant: "thumb_sm".to_string(),
                derivation_params: Default::default(),
                processing_metadata: Default::default(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, DerivedRepositoryError::SelfReference);
    }

    #[tokio::test]
    async fn create_maps_unique_violation_to_already_exists() {
        let parent = Uuid::new_v4();
        let child = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Custom(
                "duplicate key value violates unique constraint \"content_derived_pkey\""
                    .to_string(),
            )])
            .into_connection();

        let repo = repo(db);
        let err = repo
            .create(NewDerivedContent {
                parent_id: parent,
                content_id: child,
                derivation_type: "thumbnail".to_string(),
                variant: "thumb_sm".to_string(),
                derivation_params: Default::default(),
                processing_metadata: Default::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DerivedRepositoryError::AlreadyExists(p, c) if p == parent && c == child
        ));
    }

    #[tokio::test]
    async fn list_allowlists_by_variant() {
        let parent = Uuid::new_v4();
        let rows = vec![
            mock_edge(parent, Uuid::new_v4(), "thumbnail", "thumb_sm"),
            mock_edge(parent, Uuid::new_v4(), "thumbnail", "thumb_lg"),
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![rows])
            .into_connection();

        let repo = repo(db);
        let listed = repo
            .list(
                DerivedContentFilter {
                    variants: vec!["thumb_sm".to_string()],
                    ..Default::default()
                },
                DerivedContentSort::CreatedAtDesc,
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].variant, "thumb_sm");
    }
}
