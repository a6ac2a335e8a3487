//! Request/response bodies for the content HTTP surface. Dates are
//! RFC3339 via `chrono`'s default `Serialize`; UUIDs are canonical hex.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::content::application::domain::entities::{Content, DerivedContent, Object, ObjectMetadata};

/// Default/maximum pagination limits.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;
pub const MAX_PAGE_LIMIT: u64 = 1000;
/// Hard cap on bulk-get request size.
pub const MAX_BULK_IDS: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct ContentResponse {
    pub id: Uuid,
    pub tenant_id: String,
    pub owner_id: String,
    pub owner_type: String,
    pub name: String,
    pub description: String,
    pub document_type: String,
    pub status: String,
    pub derivation_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Content> for ContentResponse {
    fn from(c: &Content) -> Self {
        Self {
            id: c.id,
            tenant_id: c.tenant_id.clone(),
            owner_id: c.owner_id.clone(),
            owner_type: c.owner_type.clone(),
            name: c.name.clone(),
            description: c.description.clone(),
            document_type: c.document_type.clone(),
            status: c.status.to_string(),
            derivation_type: c.derivation_type.clone(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectResponse {
    pub id: Uuid,
    pub content_id: Uuid,
    pub storage_backend_name: String,
    pub storage_class: String,
    pub object_key: String,
    pub file_name: String,
    pub version: i32,
    pub object_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Object> for ObjectResponse {
    fn from(o: &Object) -> Self {
        Self {
            id: o.id,
            content_id: o.content_id,
            storage_backend_name: o.storage_backend_name.clone(),
            storage_class: o.storage_class.clone(),
            object_key: o.object_key.clone(),
            file_name: o.file_name.clone(),
            version: o.version,
            object_type: o.object_type.clone(),
            status: o.status.to_string(),
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DerivedContentResponse {
    pub parent_id: Uuid,
    pub content_id: Uuid,
    pub derivation_type: String,
    pub variant: String,
    pub derivation_params: HashMap<String, Value>,
    pub processing_metadata: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&DerivedContent> for DerivedContentResponse {
    fn from(d: &DerivedContent) -> Self {
        Self {
            parent_id: d.parent_id,
            content_id: d.content_id,
            derivation_type: d.derivation_type.clone(),
            variant: d.variant.clone(),
            derivation_params: d.derivation_params.clone(),
            processing_metadata: d.processing_metadata.clone(),
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentBody {
    pub tenant_id: String,
    pub owner_id: String,
    pub owner_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub document_type: String,
    #[serde(default)]
    pub derivation_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContentBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// Clamps a caller-supplied `limit`/`offset` pair to the page bounds.
pub fn page_bounds(limit: Option<u64>, offset: Option<u64>) -> (u64, u64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    (limit, offset.unwrap_or(0))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListContentQuery {
    pub tenant_id: String,
    pub owner_id: String,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteContentQuery {
    #[serde(default)]
    pub cascade_objects: bool,
}

/// `POST /files`: create content + reserve object + return an upload URL
/// for the caller to PUT bytes to directly (the presigned-upload model).
#[derive(Debug, Clone, Deserialize)]
pub struct InitFileUploadBody {
    pub tenant_id: String,
    pub owner_id: String,
    pub owner_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub document_type: String,
    pub file_name: String,
    #[serde(default)]
    pub object_type: String,
    #[serde(default = "default_storage_class")]
    pub storage_class: String,
    pub storage_backend: String,
}

fn default_storage_class() -> String {
    "standard".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct InitFileUploadResponse {
    pub content_id: Uuid,
    pub object_id: Uuid,
    pub upload_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileDetailResponse {
    pub content_id: Uuid,
    pub file_name: String,
    pub preview_url: Option<String>,
    pub download_url: Option<String>,
    pub metadata: ObjectMetadataResponse,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjectMetadataResponse {
    pub size_bytes: i64,
    pub mime_type: String,
    pub etag: String,
    pub metadata: HashMap<String, Value>,
}

impl From<&ObjectMetadata> for ObjectMetadataResponse {
    fn from(m: &ObjectMetadata) -> Self {
        Self {
            size_bytes: m.size_bytes,
            mime_type: m.mime_type.clone(),
            etag: m.etag.clone(),
            metadata: m.metadata.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkFilesQuery {
    /// Comma-separated content IDs, e.g. `?id=<uuid1>,<uuid2>`.
    #[serde(default)]
    pub id: String,
}

impl BulkFilesQuery {
    pub fn parse_ids(&self) -> Result<Vec<Uuid>, String> {
        self.id
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Uuid::parse_str(s).map_err(|_| format!("invalid uuid: {s}")))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkFilesResponse {
    pub items: Vec<BulkFileItem>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkFileItem {
    pub id: Uuid,
    #[serde(flatten)]
    pub detail: FileDetailResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure {
    pub id: Uuid,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDerivedQuery {
    /// Comma-separated derivation-type allow-list.
    #[serde(default)]
    pub derivation_type: String,
    /// Comma-separated variant allow-list.
    #[serde(default)]
    pub variant: String,
    /// Comma-separated content-status allow-list.
    #[serde(default)]
    pub status: String,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
    pub sort: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

fn csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl ListDerivedQuery {
    pub fn derivation_types(&self) -> Vec<String> {
        csv(&self.derivation_type)
    }

    pub fn variants(&self) -> Vec<String> {
        csv(&self.variant)
    }

    pub fn statuses(&self) -> Vec<String> {
        csv(&self.status)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDerivedRelationshipBody {
    pub content_id: Uuid,
    pub derivation_type: String,
    pub variant: String,
    #[serde(default)]
    pub derivation_params: HashMap<String, Value>,
    #[serde(default)]
    pub processing_metadata: HashMap<String, Value>,
}

/// `POST /contents/upload` (service-streamed upload via `UploadContent`).
#[derive(Debug, Clone, Deserialize)]
pub struct UploadContentQuery {
    pub tenant_id: String,
    pub owner_id: String,
    pub owner_type: String,
    pub name: String,
    pub document_type: String,
    pub mime_type: Option<String>,
    pub storage_backend: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// `POST /contents/{parent_id}/derived/upload` (via `UploadDerivedContent`).
#[derive(Debug, Clone, Deserialize)]
pub struct UploadDerivedContentQuery {
    pub tenant_id: String,
    pub owner_id: String,
    pub owner_type: String,
    pub name: String,
    pub document_type: String,
    pub mime_type: Option<String>,
    pub storage_backend: String,
    pub derivation_type: String,
    pub variant: String,
}
