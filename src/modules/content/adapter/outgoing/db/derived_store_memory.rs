use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::content::application::domain::entities::resolve_variant;
use crate::content::application::ports::outgoing::content_query::ContentQuery;
use crate::content::application::ports::outgoing::derived_repository::{
    DerivedContentFilter, DerivedContentSort, DerivedRepository, DerivedRepositoryError,
    NewDerivedContent, PageRequest,
};

/// Backs `DerivedRepository`. The content-status filter dimension joins
/// against `ContentQuery` rather than duplicating content rows here, the
/// same separation a real join would keep between tables.
pub struct MemoryDerivedStore {
    edges: RwLock<HashMap<(Uuid, Uuid), crate::content::application::domain::entities::DerivedContent>>,
    content_query: Arc<dyn ContentQuery>,
}

impl MemoryDerivedStore {
    pub fn new(content_query: Arc<dyn ContentQuery>) -> Self {
        Self {
            edges: RwLock::new(HashMap::new()),
            content_query,
        }
    }
}

#[async_trait]
impl DerivedRepository for MemoryDerivedStore {
    async fn create(
        &self,
        new_edge: NewDerivedContent,
    ) -> Result<crate::content::application::domain::entities::DerivedContent, DerivedRepositoryError>
    {
        if new_edge.parent_id == new_edge.content_id {
            return Err(DerivedRepositoryError::SelfReference);
        }
        let mut edges = self
            .edges
            .write()
            .map_err(|_| DerivedRepositoryError::Repository("poisoned lock".into()))?;
        let key = (new_edge.parent_id, new_edge.content_id);
        if edges.contains_key(&key) {
            return Err(DerivedRepositoryError::AlreadyExists(
                new_edge.parent_id,
                new_edge.content_id,
            ));
        }
        let now = Utc::now();
        let edge = crate::content::application::domain::entities::DerivedContent {
            parent_id: new_edge.parent_id,
            content_id: new_edge.content_id,
            derivation_type: new_edge.derivation_type,
            variant: new_edge.variant,
            derivation_params: new_edge.derivation_params,
            processing_metadata: new_edge.processing_metadata,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        edges.insert(key, edge.clone());
        Ok(edge)
    }

    async fn list(
        &self,
        filter: DerivedContentFilter,
        sort: DerivedContentSort,
        page: PageRequest,
    ) -> Result<Vec<crate::content::application::domain::entities::DerivedContent>, DerivedRepositoryError>
    {
        let snapshot: Vec<_> = {
            let edges = self
                .edges
                .read()
                .map_err(|_| DerivedRepositoryError::Repository("poisoned lock".into()))?;
            edges.values().cloned().collect()
        };

        let type_variant_allowlisted = !filter.derivation_types.is_empty()
            || !filter.variants.is_empty()
            || !filter.derivation_type_variant_pairs.is_empty();

        let mut matching = Vec::new();
        for edge in snapshot {
            if !filter.parent_ids.is_empty() && !filter.parent_ids.contains(&edge.parent_id) {
                continue;
            }
            if let Some(after) = filter.created_after {
                if edge.created_at < after {
                    continue;
                }
            }
            if let Some(before) = filter.created_before {
                if edge.created_at > before {
                    continue;
                }
            }
            if let Some(after) = filter.updated_after {
                if edge.updated_at < after {
                    continue;
                }
            }
            if let Some(before) = filter.updated_before {
                if edge.updated_at > before {
                    continue;
                }
            }

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
