use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Created,
    Uploading,
    Uploaded,
    Processed,
    Archived,
    Deleted,
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentStatus::Created => "created",
            ContentStatus::Uploading => "uploading",
            ContentStatus::Uploaded => "uploaded",
            ContentStatus::Processed => "processed",
            ContentStatus::Archived => "archived",
            ContentStatus::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ContentStatus::Created),
            "uploading" => Ok(ContentStatus::Uploading),
            "uploaded" => Ok(ContentStatus::Uploaded),
            "processed" => Ok(ContentStatus::Processed),
            "archived" => Ok(ContentStatus::Archived),
            "deleted" => Ok(ContentStatus::Deleted),
            other => Err(format!("unknown content status: {other}")),
        }
    }
}

impl ContentStatus {
    /// Legal transitions per the state machine. `deleted` is reachable from
    /// any state through soft-delete and isn't modeled as a normal edge here
    /// (soft-delete sets `deleted_at` rather than walking this table).
    pub fn can_transition_to(&self, target: &ContentStatus) -> bool {
        use ContentStatus::*;
        match (self, target) {
            (Created, Uploading) => true,
            (Uploading, Uploaded) => true,
            (Uploaded, Processed) => true,
            (Created | Uploading | Uploaded | Processed, Archived) => true,
            (from, to) if from == to => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStatus {
    Created,
    Uploading,
    Uploaded,
    Deleted,
}

impl fmt::Display for ObjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectStatus::Created => "created",
            ObjectStatus::Uploading => "uploading",
            ObjectStatus::Uploaded => "uploaded",
            ObjectStatus::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ObjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ObjectStatus::Created),
            "uploading" => Ok(ObjectStatus::Uploading),
            "uploaded" => Ok(ObjectStatus::Uploaded),
            "deleted" => Ok(ObjectStatus::Deleted),
            other => Err(format!("unknown object status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub id: Uuid,
    pub tenant_id: String,
    pub owner_id: String,
    pub owner_type: String,
    pub name: String,
    pub description: String,
    pub document_type: String,
    pub status: ContentStatus,
    /// Empty for originals; the user-facing derivation category otherwise.
    pub derivation_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Content {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_derived(&self) -> bool {
        !self.derivation_type.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContentMetadata {
    pub content_id: Uuid,
    pub tags: Vec<String>,
    pub file_size: i64,
    pub file_name: String,
    pub mime_type: String,
    pub checksum: String,
    pub checksum_algorithm: String,
    pub metadata: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    pub id: Uuid,
    pub content_id: Uuid,
    pub storage_backend_name: String,
    pub storage_class: String,
    pub object_key: String,
    pub file_name: String,
    pub version: i32,
    pub object_type: String,
    pub status: ObjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Object {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ObjectMetadata {
    pub object_id: Uuid,
    pub size_bytes: i64,
    pub mime_type: String,
    pub etag: String,
    pub metadata: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedContent {
    pub parent_id: Uuid,
    pub content_id: Uuid,
    pub derivation_type: String,
    pub variant: String,
    pub derivation_params: HashMap<String, Value>,
    pub processing_metadata: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Read-path resolution for rows whose `variant` column predates being
/// populated directly. Writes must always populate `variant`; this is
/// never applied on the write path.
pub fn resolve_variant(d: &DerivedContent) -> String {
    if !d.variant.is_empty() {
        return d.variant.clone();
    }
    if let Some(Value::String(v)) = d.processing_metadata.get("variant") {
        return v.clone();
    }
    if let Some(Value::String(v)) = d.derivation_params.get("variant") {
        return v.clone();
    }
    if variant_shaped().is_match(&d.derivation_type) {
        return d.derivation_type.clone();
    }
    d.derivation_type.clone()
}

fn variant_shaped() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]+_[a-z0-9]+$").expect("static regex is valid"))
}
