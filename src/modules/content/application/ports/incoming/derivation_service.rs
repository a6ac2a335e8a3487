use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::content::application::domain::entities::DerivedContent;
use crate::content::application::ports::incoming::error::CoreError;
use crate::content::application::ports::outgoing::derived_repository::{
    DerivedContentFilter, DerivedContentSort, PageRequest,
};

#[derive(Debug, Clone)]
pub struct CreateDerivedContentRelationshipRequest {
    pub parent_id: Uuid,
    pub content_id: Uuid,
    pub derivation_type: String,
    pub variant: String,
    pub derivation_params: HashMap<String, Value>,
    pub processing_metadata: HashMap<String, Value>,
}

#[async_trait]
pub trait DerivationService: Send + Sync {
    async fn create_derived_content_relationship(
        &self,
        req: CreateDerivedContentRelationshipRequest,
    ) -> Result<DerivedContent, CoreError>;

    async fn list_derived_content(
        &self,
        filter: DerivedContentFilter,
        sort: DerivedContentSort,
        page: PageRequest,
    ) -> Result<Vec<DerivedContent>, CoreError>;
}
