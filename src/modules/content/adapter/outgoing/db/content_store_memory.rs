use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::content::application::domain::entities::{Content, ContentStatus};
use crate::content::application::ports::outgoing::content_query::{
    ContentFilter, ContentQuery, ContentQueryError, ContentSort, ContentStatistics, PageRequest,
    StatisticsOptions,
};
use crate::content::application::ports::outgoing::content_repository::{
    ContentPatch, ContentRepository, ContentRepositoryError, NewContent,
};

/// Single-process backing store for both the repository and query sides of
/// the content table (`DATABASE_URL` falls back to this when unset).
/// Also the harness the service's own unit tests build on.
#[derive(Default)]
pub struct MemoryContentStore {
    rows: RwLock<HashMap<Uuid, Content>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(content: &Content, filter: &ContentFilter) -> bool {
    if !filter.include_deleted && content.is_deleted() {
        return false;
    }
    if let Some(ref tenant_id) = filter.tenant_id {
        if &content.tenant_id != tenant_id {
            return false;
        }
    }
    if let Some(ref owner_id) = filter.owner_id {
        if &content.owner_id != owner_id {
            return false;
        }
    }
    if let Some(ref owner_type) = filter.owner_type {
        if &content.owner_type != owner_type {
            return false;
        }
    }
    if !filter.statuses.is_empty() && !filter.statuses.contains(&content.status) {
        return false;
    }
    if !filter.document_types.is_empty() && !filter.document_types.contains(&content.document_type)
    {
        return false;
    }
    if !filter.derivation_types.is_empty()
        && !filter.derivation_types.contains(&content.derivation_type)
    {
        return false;
    }
    if let Some(after) = filter.created_after {
        if content.created_at < after {
            return false;
        }
    }
    if let Some(before) = filter.created_before {
        if content.created_at > before {
            return false;
        }
    }
    true
}

fn sort_and_page(mut rows: Vec<Content>, sort: ContentSort, page: PageRequest) -> Vec<Content> {
    match sort {
        ContentSort::CreatedAtDesc => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        ContentSort::CreatedAtAsc => rows.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
    let offset = page.offset as usize;
    if offset >= rows.len() {
        return Vec::new();
    }
    let end = if page.limit == 0 {
        rows.len()
    } else {
        (offset + page.limit as usize).min(rows.len())
    };
    rows[offset..end].to_vec()
}

#[async_trait]
impl ContentRepository for MemoryContentStore {
    async fn create(&self, new_content: NewContent) -> Result<Content, ContentRepositoryError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| ContentRepositoryError::Repository("poisoned lock".into()))?;
        if rows.contains_key(&new_content.id) {
            return Err(ContentRepositoryError::AlreadyExists(new_content.id));
        }
        let now = Utc::now();
        let content = Content {
            id: new_content.id,
            tenant_id: new_content.tenant_id,
            owner_id: new_content.owner_id,
            owner_type: new_content.owner_type,
            name: new_content.name,
            description: new_content.description,
            document_type: new_content.document_type,
            status: ContentStatus::Created,
            derivation_type: new_content.derivation_type,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        rows.insert(content.id, content.clone());
        Ok(content)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: ContentPatch,
    ) -> Result<Content, ContentRepositoryError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| ContentRepositoryError::Repository("poisoned lock".into()))?;
        let content = rows
            .get_mut(&id)
            .ok_or(ContentRepositoryError::NotFound(id))?;

        if let Some(status) = patch.status {
            if !content.status.can_transition_to(&status) {
                return Err(ContentRepositoryError::InvalidStatusTransition {
                    from: content.status.to_string(),
                    to: status.to_string(),
                });
            }
            content.status = status;
        }
        if let Some(name) = patch.name {
            content.name = name;
        }
        if let Some(description) = patch.description {
            content.description = description;
        }
        content.updated_at = Utc::now();
        Ok(content.clone())
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ContentRepositoryError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| ContentRepositoryError::Repository("poisoned lock".into()))?;
        let content = rows
            .get_mut(&id)
            .ok_or(ContentRepositoryError::NotFound(id))?;
        content.deleted_at = Some(at);
        content.updated_at = at;
        Ok(())
    }
}

#[async_trait]
impl ContentQuery for MemoryContentStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Content>, ContentQueryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| ContentQueryError::Repository("poisoned lock".into()))?;
        Ok(rows.get(&id).filter(|c| !c.is_deleted()).cloned())
    }

    async fn list_by_owner(
        &self,
        tenant_id: &str,
        owner_id: &str,
        page: PageRequest,
    ) -> Result<Vec<Content>, ContentQueryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| ContentQueryError::Repository("poisoned lock".into()))?;
        let matching: Vec<Content> = rows
            .values()
            .filter(|c| !c.is_deleted() && c.tenant_id == tenant_id && c.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(sort_and_page(matching, ContentSort::CreatedAtDesc, page))
    }

    async fn list_all(
        &self,
        filter: ContentFilter,
        sort: ContentSort,
        page: PageRequest,
    ) -> Result<Vec<Content>, ContentQueryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| ContentQueryError::Repository("poisoned lock".into()))?;
        let matching: Vec<Content> = rows
            .values()
            .filter(|c| matches(c, &filter))
            .cloned()
            .collect();
        Ok(sort_and_page(matching, sort, page))
    }

    async fn count(&self, filter: ContentFilter) -> Result<u64, ContentQueryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| ContentQueryError::Repository("poisoned lock".into()))?;
        Ok(rows.values().filter(|c| matches(c, &filter)).count() as u64)
    }

    async fn statistics(
        &self,
        filter: ContentFilter,
        options: StatisticsOptions,
    ) -> Result<ContentStatistics, ContentQueryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| ContentQueryError::Repository("poisoned lock".into()))?;
        let mut stats = ContentStatistics::default();
        for content in rows.values().filter(|c| matches(c, &filter)) {
            stats.total += 1;
            if options.by_status {
                *stats
                    .by_status
                    .entry(content.status.to_string())
                    .or_insert(0) += 1;
            }
            if options.by_tenant {
                *stats.by_tenant.entry(content.tenant_id.clone()).or_insert(0) += 1;
            }
            if options.by_derivation_type {
                *stats
                    .by_derivation_type
                    .entry(content.derivation_type.clone())
                    .or_insert(0) += 1;
            }
            if options.by_document_type {
                *stats
                    .by_document_type
                    .entry(content.document_type.clone())
                    .or_insert(0) += 1;
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_content(id: Uuid, tenant: &str, owner: &str) -> NewContent {
        NewContent {
            id,
            tenant_id: tenant.to_string(),
            owner_id: owner.to_string(),
            owner_type: "user".to_string(),
            name: "file.txt".to_string(),
            description: String::new(),
            document_type: "document".to_string(),
            derivation_type: String::new(),
        }
    }

    #[tokio::test]
    async fn create_then_get_by_id() {
        let store = MemoryContentStore::new();
        let id = Uuid::new_v4();
        store.create(new_content(id, "t1", "o1")).await.unwrap();
        let content = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(content.status, ContentStatus::Created);
    }

    #[tokio::test]
    async fn duplicate_id_rejected() {
        let store = MemoryContentStore::new();
        let id = Uuid::new_v4();
        store.create(new_content(id, "t1", "o1")).await.unwrap();
        let err = store.create(new_content(id, "t1", "o1")).await.unwrap_err();
        assert_eq!(err, ContentRepositoryError::AlreadyExists(id));
    }

    #[tokio::test]
    async fn invalid_transition_rejected() {
        let store = MemoryContentStore::new();
        let id = Uuid::new_v4();
        store.create(new_content(id, "t1", "o1")).await.unwrap();
        let err = store
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
    async fn soft_deleted_rows_are_hidden_from_get_and_list() {
        let store = MemoryContentStore::new();
        let id = Uuid::new_v4();
        store.create(new_content(id, "t1", "o1")).await.unwrap();
        store.soft_delete(id, Utc::now()).await.unwrap();
        assert!(store.get_by_id(id).await.unwrap().is_none());
        let listed = store
            .list_by_owner("t1", "o1", PageRequest::default())
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn list_by_owner_scopes_and_excludes_other_tenants() {
        let store = MemoryContentStore::new();
        store
            .create(new_content(Uuid::new_v4(), "t1", "o1"))
            .await
            .unwrap();
        store
            .create(new_content(Uuid::new_v4(), "t2", "o1"))
            .await
            .unwrap();
        let listed = store
            .list_by_owner("t1", "o1", PageRequest::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn statistics_counts_by_status() {
        let store = MemoryContentStore::new();
        store
            .create(new_content(Uuid::new_v4(), "t1", "o1"))
            .await
            .unwrap();
        let stats = store
            .statistics(
                ContentFilter::default(),
                StatisticsOptions {
                    by_status: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.by_status.get("created"), Some(&1));
    }
}
