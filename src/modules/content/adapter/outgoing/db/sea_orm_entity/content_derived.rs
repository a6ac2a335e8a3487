use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "content_derived")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub parent_id: Uuid,

    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub content_id: Uuid,

    #[sea_orm(column_type = "String(StringLen::N(63))")]
    pub derivation_type: String,

    #[sea_orm(column_type = "String(StringLen::N(63))")]
    pub variant: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub derivation_params: Json,

    #[sea_orm(column_type = "JsonBinary")]
    pub processing_metadata: Json,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

/// Both FKs point at `content`; sea-orm can only auto-derive one `Related`
/// path per target entity, so the parent/child edges are modeled as plain
/// belongs-to relations without a `Related` impl on either side — callers
/// join explicitly in query code instead.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
