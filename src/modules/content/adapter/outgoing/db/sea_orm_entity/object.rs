use sea_orm::entity::prelude::*;

use crate::content::application::domain::entities::ObjectStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "object")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub id: Uuid,

    #[sea_orm(column_type = "Uuid")]
    pub content_id: Uuid,

    #[sea_orm(column_type = "String(StringLen::N(63))")]
    pub storage_backend_name: String,

    #[sea_orm(column_type = "String(StringLen::N(63))")]
    pub storage_class: String,

    #[sea_orm(column_type = "String(StringLen::N(1024))")]
    pub object_key: String,

    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub file_name: String,

    pub version: i32,

    #[sea_orm(column_type = "String(StringLen::N(63))")]
    pub object_type: String,

    pub status: ObjectStatusDb,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::content::Entity",
        from = "Column::ContentId",
        to = "super::content::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Content,
    #[sea_orm(has_one = "super::object_metadata::Entity")]
    ObjectMetadata,
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl Related<super::object_metadata::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ObjectMetadata.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Mirrors the `object_status` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "object_status")]
pub enum ObjectStatusDb {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "uploading")]
    Uploading,
    #[sea_orm(string_value = "uploaded")]
    Uploaded,
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

impl From<ObjectStatus> for ObjectStatusDb {
    fn from(s: ObjectStatus) -> Self {
        match s {
            ObjectStatus::Created => ObjectStatusDb::Created,
            ObjectStatus::Uploading => ObjectStatusDb::Uploading,
            ObjectStatus::Uploaded => ObjectStatusDb::Uploaded,
            ObjectStatus::Deleted => ObjectStatusDb::Deleted,
        }
    }
}

impl From<ObjectStatusDb> for ObjectStatus {
    fn from(s: ObjectStatusDb) -> Self {
        match s {
            ObjectStatusDb::Created => ObjectStatus::Created,
            ObjectStatusDb::Uploading => ObjectStatus::Uploading,
            ObjectStatusDb::Uploaded => ObjectStatus::Uploaded,
            ObjectStatusDb::Deleted => ObjectStatus::Deleted,
        }
    }
}
