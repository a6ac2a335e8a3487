//! # Content Metadata Table Migration
//!
//! One row per content, holding the attributes that aren't part of the
//! lifecycle state machine: tags, the originally-uploaded file name/size,
//! checksum, and a free-form metadata map for caller-supplied key/values.
//! Split from `content` so that the lifecycle-critical columns stay narrow
//! and this richer, more frequently-patched data doesn't bloat that table's
//! row size.

use sea_orm_migration::prelude::*;

use crate::m20260301_000001_create_table_content::Content;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContentMetadata::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentMetadata::ContentId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContentMetadata::Tags)
                            .array(ColumnType::Text)
                            .not_null()
                            .default(Expr::cust("'{}'::text[]")),
                    )
                    .col(
                        ColumnDef::new(ContentMetadata::FileSize)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContentMetadata::FileName)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ContentMetadata::MimeType)
                            .string_len(127)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ContentMetadata::Checksum)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ContentMetadata::ChecksumAlgorithm)
                            .string_len(32)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ContentMetadata::Metadata)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ContentMetadata::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ContentMetadata::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_metadata_content_id")
                            .from(ContentMetadata::Table, ContentMetadata::ContentId)
                            .to(Content::Table, Content::Id)
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
                CREATE TRIGGER update_content_metadata_updated_at
                BEFORE UPDATE ON content_metadata
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
                "DROP TRIGGER IF EXISTS update_content_metadata_updated_at ON content_metadata;",
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ContentMetadata::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum ContentMetadata {
    Table,
    ContentId,
    Tags,
    FileSize,
    FileName,
    MimeType,
    Checksum,
    ChecksumAlgorithm,
    Metadata,
    CreatedAt,
    UpdatedAt,
}
