use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::content::adapter::outgoing::db::content_repository_postgres::{
    model_to_domain, parse_uuid,
};
use crate::content::adapter::outgoing::db::sea_orm_entity::content::{Column, Entity};
use crate::content::application::domain::entities::Content;
use crate::content::application::ports::outgoing::content_query::{
    ContentFilter, ContentQuery, ContentQueryError, ContentSort, ContentStatistics, PageRequest,
    StatisticsOptions,
};

#[derive(Clone)]
pub struct ContentQueryPostgres {
    db: Arc<DatabaseConnection>,
}

impl ContentQueryPostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn build_condition(filter: &ContentFilter) -> Result<Condition, ContentQueryError> {
    let mut cond = Condition::all();
    if !filter.include_deleted {
        cond = cond.add(Column::DeletedAt.is_null());
    }
    if let Some(ref tenant_id) = filter.tenant_id {
        let parsed = parse_uuid_for_query(tenant_id)?;
        cond = cond.add(Column::TenantId.eq(parsed));
    }
    if let Some(ref owner_id) = filter.owner_id {
        let parsed = parse_uuid_for_query(owner_id)?;
        cond = cond.add(Column::OwnerId.eq(parsed));
    }
    if let Some(ref owner_type) = filter.owner_type {
        cond = cond.add(Column::OwnerType.eq(owner_type.clone()));
    }
    if !filter.statuses.is_empty() {
        let statuses: Vec<_> = filter
            .statuses
            .iter()
            .cloned()
            .map(crate::content::adapter::outgoing::db::sea_orm_entity::content::ContentStatusDb::from)
            .collect();
        cond = cond.add(Column::Status.is_in(statuses));
    }
    if !filter.document_types.is_empty() {
        cond = cond.add(Column::DocumentType.is_in(filter.document_types.clone()));
    }
    if !filter.derivation_types.is_empty() {
        cond = cond.add(Column::DerivationType.is_in(filter.derivation_types.clone()));
    }
    if let Some(after) = filter.created_after {
        cond = cond.add(Column::CreatedAt.gte(after.fixed_offset()));
    }
    if let Some(before) = filter.created_before {
        cond = cond.add(Column::CreatedAt.lte(before.fixed_offset()));
    }
    Ok(cond)
}

fn parse_uuid_for_query(s: &str) -> Result<Uuid, ContentQueryError> {
    Uuid::parse_str(s).map_err(|e| ContentQueryError::Repository(format!("invalid uuid {s}: {e}")))
}

#[async_trait]
impl ContentQuery for ContentQueryPostgres {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Content>, ContentQueryError> {
        let row = Entity::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(&*self.db)
            .await
            .map_err(|e| ContentQueryError::Repository(e.to_string()))?;
        row.map(|m| model_to_domain(m).map_err(|e| ContentQueryError::Repository(e.to_string())))
            .transpose()
    }

    async fn list_by_owner(
        &self,
        tenant_id: &str,
        owner_id: &str,
        page: PageRequest,
    ) -> Result<Vec<Content>, ContentQueryError> {
        let tenant_id = parse_uuid_for_query(tenant_id)?;
        let owner_id = parse_uuid_for_query(owner_id)?;
        let mut query = Entity::find()
            .filter(Column::DeletedAt.is_null())
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::OwnerId.eq(owner_id))
            .order_by_desc(Column::CreatedAt);
        query = paginate(query, page);
        let rows = query
            .all(&*self.db)
            .await
            .map_err(|e| ContentQueryError::Repository(e.to_string()))?;
        rows.into_iter()
            .map(|m| model_to_domain(m).map_err(|e| ContentQueryError::Repository(e.to_string())))
            .collect()
    }

    async fn list_all(
        &self,
        filter: ContentFilter,
        sort: ContentSort,
        page: PageRequest,
    ) -> Result<Vec<Content>, ContentQueryError> {
        let cond = build_condition(&filter)?;
        let mut query = Entity::find().filter(cond);
        query = match sort {
            ContentSort::CreatedAtDesc => query.order_by_desc(Column::CreatedAt),
            ContentSort::CreatedAtAsc => query.order_by_asc(Column::CreatedAt),
        };
        query = paginate(query, page);
        let rows = query
            .all(&*self.db)
            .await
            .map_err(|e| ContentQueryError::Repository(e.to_string()))?;
        rows.into_iter()
            .map(|m| model_to_domain(m).map_err(|e| ContentQueryError::Repository(e.to_string())))
            .collect()
    }

    async fn count(&self, filter: ContentFilter) -> Result<u64, ContentQueryError> {
        let cond = build_condition(&filter)?;
        Entity::find()
            .filter(cond)
            .count(&*self.db)
            .await
            .map_err(|e| ContentQueryError::Repository(e.to_string()))
    }

    async fn statistics(
        &self,
        filter: ContentFilter,
        options: StatisticsOptions,
    ) -> Result<ContentStatistics, ContentQueryError> {
        let cond = build_condition(&filter)?;
        let rows = Entity::find()
            .filter(cond)
            .all(&*self.db)
            .await
            .map_err(|e| ContentQueryError::Repository(e.to_string()))?;

        let mut stats = ContentStatistics::default();
        for row in &rows {
            stats.total += 1;
            if options.by_status {
                let status: crate::content::application::domain::entities::ContentStatus =
                    row.status.into();
                *stats.by_status.entry(status.to_string()).or_insert(0) += 1;
            }
            if options.by_tenant {
                *stats
                    .by_tenant
                    .entry(row.tenant_id.to_string())
                    .or_insert(0) += 1;
            }
            if options.by_derivation_type {
                *stats
                    .by_derivation_type
                    .entry(row.derivation_type.clone())
                    .or_insert(0) += 1;
            }
            if options.by_document_type {
                *stats
                    .by_document_type
                    .entry(row.document_type.clone())
                    .or_insert(0) += 1;
            }
        }
        Ok(stats)
    }
}

fn paginate<E>(query: sea_orm::Select<E>, page: PageRequest) -> sea_orm::Select<E>
where
    E: EntityTrait,
{
    use sea_orm::QuerySelect;
    let mut query = query.offset(page.offset);
    if page.limit > 0 {
        query = query.limit(page.limit);
    }
    query
}
