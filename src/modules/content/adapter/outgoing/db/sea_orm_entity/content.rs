use sea_orm::entity::prelude::*;

use crate::content::application::domain::entities::ContentStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "content")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id: Uuid,

    #[sea_orm(column_type = "Uuid")]
    pub tenant_id: Uuid,

    #[sea_orm(column_type = "Uuid")]
    pub owner_id: Uuid,

    #[sea_orm(column_type = "String(StringLen::N(63))")]
    pub owner_type: String,

    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(column_type = "String(StringLen::N(127))")]
    pub document_type: String,

    pub status: ContentStatusDb,

    #[sea_orm(column_type = "String(StringLen::N(63))")]
    pub derivation_type: String,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::content_metadata::Entity")]
    ContentMetadata,
    #[sea_orm(has_many = "super::object::Entity")]
    Object,
}

impl Related<super::content_metadata::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentMetadata.def()
    }
}

impl Related<super::object::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Object.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Mirrors the `content_status` Postgres enum. Bridges to the
/// application-layer `ContentStatus` at the repository boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "content_status")]
pub enum ContentStatusDb {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "uploading")]
    Uploading,
    #[sea_orm(string_value = "uploaded")]
    Uploaded,
    #[sea_orm(string_value = "processed")]
    Processed,
    #[sea_orm(string_value = "archived")]
    Archived,
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

impl From<ContentStatus> for ContentStatusDb {
    fn from(s: ContentStatus) -> Self {
        match s {
            ContentStatus::Created => ContentStatusDb::Created,
            ContentStatus::Uploading => ContentStatusDb::Uploading,
            ContentStatus::Uploaded => ContentStatusDb::Uploaded,
            ContentStatus::Processed => ContentStatusDb::Processed,
            ContentStatus::Archived => ContentStatusDb::Archived,
            ContentStatus::Deleted => ContentStatusDb::Deleted,
        }
    }
}

impl From<ContentStatusDb> for ContentStatus {
    fn from(s: ContentStatusDb) -> Self {
        match s {
            ContentStatusDb::Created => ContentStatus::Created,
            ContentStatusDb::Uploading => ContentStatus::Uploading,
            ContentStatusDb::Uploaded => ContentStatus::Uploaded,
            ContentStatusDb::Processed => ContentStatus::Processed,
            ContentStatusDb::Archived => ContentStatus::Archived,
            ContentStatusDb::Deleted => ContentStatus::Deleted,
        }
    }
}
