//! # Object Metadata Table Migration
//!
//! One row per `object`, populated by the service after a successful
//! upload by reconciling with the backend's `Stat` call: size, etag, and
//! the backend-detected MIME type (overridden by a caller-supplied MIME
//! type when present, per the upload pipeline's reconciliation step).

use sea_orm_migration::prelude::*;

use crate::m20260301_000003_create_table_object::Object;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ObjectMetadata::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ObjectMetadata::ObjectId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ObjectMetadata::SizeBytes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ObjectMetadata::MimeType)
                            .string_len(127)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ObjectMetadata::Etag)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ObjectMetadata::Metadata)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ObjectMetadata::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ObjectMetadata::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_object_metadata_object_id")
                            .from(ObjectMetadata::Table, ObjectMetadata::ObjectId)
                            .to(Object::Table, Object::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER update_object_metadata_updated_at
                BEFORE UPDATE ON object_metadata
                FOR EACH ROW
                EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DROP TRIGGER IF EXISTS update_object_metadata_updated_at ON object_metadata;",
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ObjectMetadata::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum ObjectMetadata {
    Table,
    ObjectId,
    SizeBytes,
    MimeType,
    Etag,
    Metadata,
    CreatedAt,
    UpdatedAt,
}
