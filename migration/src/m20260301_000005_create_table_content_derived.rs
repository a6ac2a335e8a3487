//! # Content Derived Table Migration
//!
//! The single wide edge table recording that one content was derived from
//! another (a thumbnail from a source image, a preview from a source
//! document, ...). Recursive traversal of derivation trees is explicitly
//! out of scope for the core; this table only ever exposes direct edges.
//!
//! `variant` is the specific derivation instance (e.g. `thumbnail_256`),
//! finer-grained than `derivation_type` (e.g. `thumbnail`). Legacy rows
//! that predate the `variant` column being populated directly are resolved
//! at read time by the service's variant-resolution rule; writes must
//! always populate `variant`.

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
                    .table(ContentDerived::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ContentDerived::ParentId).uuid().not_null())
                    .col(ColumnDef::new(ContentDerived::ContentId).uuid().not_null())
                    .col(
                        ColumnDef::new(ContentDerived::DerivationType)
                            .string_len(63)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContentDerived::Variant)
                            .string_len(63)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ContentDerived::DerivationParams)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ContentDerived::ProcessingMetadata)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(ContentDerived::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ContentDerived::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ContentDerived::DeletedAt).timestamp_with_time_zone())
                    .primary_key(
                        Index::create()
                            .col(ContentDerived::ParentId)
                            .col(ContentDerived::ContentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_derived_parent_id")
                            .from(ContentDerived::Table, ContentDerived::ParentId)
                            .to(Content::Table, Content::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_content_derived_content_id")
                            .from(ContentDerived::Table, ContentDerived::ContentId)
                            .to(Content::Table, Content::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // parent_id != content_id: a content can never be its own derivation.
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE content_derived
                ADD CONSTRAINT chk_content_derived_parent_ne_content
                CHECK (parent_id <> content_id);
                "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE INDEX idx_content_derived_parent
                ON content_derived (parent_id)
                WHERE deleted_at IS NULL;

                CREATE INDEX idx_content_derived_type_variant
                ON content_derived (derivation_type, variant)
                WHERE deleted_at IS NULL;
                "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER update_content_derived_updated_at
                BEFORE UPDATE ON content_derived
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
                r#"
                DROP TRIGGER IF EXISTS update_content_derived_updated_at ON content_derived;
                DROP INDEX IF EXISTS idx_content_derived_parent;
                DROP INDEX IF EXISTS idx_content_derived_type_variant;
                "#,
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ContentDerived::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum ContentDerived {
    Table,
    ParentId,
    ContentId,
    DerivationType,
    Variant,
    DerivationParams,
    ProcessingMetadata,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
