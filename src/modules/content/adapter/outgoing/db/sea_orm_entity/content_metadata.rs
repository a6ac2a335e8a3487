use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "content_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Uuid")]
    pub content_id: Uuid,

    pub tags: Vec<String>,

    pub file_size: i64,

    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub file_name: String,

    #[sea_orm(column_type = "String(StringLen::N(127))")]
    pub mime_type: String,

    #[sea_orm(column_type = "String(StringLen::N(128))")]
    pub checksum: String,

    #[sea_orm(column_type = "String(StringLen::N(32))")]
    pub checksum_algorithm: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
