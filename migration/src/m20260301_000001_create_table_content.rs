//! # Content Table Migration
//!
//! ## Purpose
//! The `content` table is the **single source of truth** for every logical
//! artifact the service manages. It deliberately knows nothing about where
//! the artifact's bytes live — that is the `object` table's job. This
//! separation is what lets the same content survive a storage-backend
//! migration, a re-upload, or a multi-region copy without changing its
//! identity.
//!
//! ## Design Philosophy
//! - **Logical vs. physical**: `content` is the stable handle clients hold
//!   onto; `object` rows underneath it can come and go.
//! - **Soft delete**: `deleted_at` hides a row from standard listings while
//!   keeping it available to admin/audit queries, per the service's
//!   cascade-is-opt-in soft-delete policy.
//! - **Derivation marker**: `derivation_type` is empty for original content
//!   and set to the user-facing category (e.g. `thumbnail`) for content
//!   produced from another content; the edge itself lives in
//!   `content_derived`.
//!
//! ## Key Columns Explained
//! - `status`: drives the lifecycle state machine
//!   (`created → uploading → uploaded → processed`, plus `archived` and
//!   `deleted` reachable from any operational state). Distinct from
//!   `deleted_at`: a row can carry `status = 'uploaded'` and still be
//!   soft-deleted: any row with a non-null `deleted_at` is treated as
//!   deleted regardless of what `status` says.
//! - `owner_id` / `owner_type`: who the content belongs to and in what
//!   capacity (e.g. a user vs. a service account); scoping for listings.
//! - `tenant_id`: top-level partition, also used by the tenant-partitioned
//!   object-key policy.
//!
//! ## Indexes
//! - `idx_content_tenant_owner`: the hot path for `ListContent`.
//! - `idx_content_active`: partial index for non-deleted rows ordered by
//!   recency, matching the default `created_at desc` listing order.
//! - `idx_content_derivation_type`: admin statistics breakdowns by
//!   derivation type.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // =====================================================
        // Shared trigger function for updated_at maintenance
        // =====================================================
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = CURRENT_TIMESTAMP;
                    RETURN NEW;
                END;
                $$ language 'plpgsql';
                "#,
            )
            .await?;

        // =====================================================
        // Create enum type for content.status
        // =====================================================
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$
                BEGIN
                    IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'content_status') THEN
                        CREATE TYPE content_status AS ENUM (
                            'created', 'uploading', 'uploaded', 'processed', 'archived', 'deleted'
                        );
                    END IF;
                END$$;
                "#,
            )
            .await?;

        // =====================================================
        // Create content table
        // =====================================================
        manager
            .create_table(
                Table::create()
                    .table(Content::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Content::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Content::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Content::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Content::OwnerType).string_len(63).not_null())
                    .col(ColumnDef::new(Content::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Content::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Content::DocumentType)
                            .string_len(127)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Content::Status)
                            .custom(Alias::new("content_status"))
                            .not_null()
                            .default(Expr::cust("'created'::content_status")),
                    )
                    .col(
                        ColumnDef::new(Content::DerivationType)
                            .string_len(63)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Content::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Content::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Content::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // =====================================================
        // Indexes
        // =====================================================
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE INDEX idx_content_tenant_owner
                ON content (tenant_id, owner_id)
                WHERE deleted_at IS NULL;
                "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE INDEX idx_content_active
                ON content (tenant_id, created_at DESC)
                WHERE deleted_at IS NULL;
                "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE INDEX idx_content_derivation_type
                ON content (derivation_type)
                WHERE deleted_at IS NULL AND derivation_type <> '';
                "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER update_content_updated_at
                BEFORE UPDATE ON content
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
                DROP TRIGGER IF EXISTS update_content_updated_at ON content;
                DROP INDEX IF EXISTS idx_content_tenant_owner;
                DROP INDEX IF EXISTS idx_content_active;
                DROP INDEX IF EXISTS idx_content_derivation_type;
                "#,
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Content::Table).to_owned())
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS content_status;")
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Content {
    Table,
    Id,
    TenantId,
    OwnerId,
    OwnerType,
    Name,
    Description,
    DocumentType,
    Status,
    DerivationType,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
