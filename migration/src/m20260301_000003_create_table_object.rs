//! # Object Table Migration
//!
//! A physical manifestation of a `content` row in one storage backend.
//! Content can have many objects over time (re-uploads bump `version`);
//! a backend only ever sees the opaque `object_key` this table hands it,
//! never the content's identity.
//!
//! ## Key Columns Explained
//! - `storage_backend_name`: which registered `BlobStore` holds the bytes
//!   (e.g. `"memory"`, `"fs"`, `"s3"`). Paired with `object_key` this forms
//!   the only globally unique address of a physical blob.
//! - `version`: monotonic per `content_id`, assigned under a
//!   repository-level lock (or the equivalent sequence on Postgres) so
//!   concurrent uploads never collide.
//! - `storage_class`: backend-specific hint (e.g. S3 storage class);
//!   opaque to the core.
//!
//! ## Indexes
//! - `idx_object_content_id`: `GetObjectsByContentID`.
//! - `idx_object_backend_key_unique`: enforces the
//!   `(storage_backend_name, object_key)` global uniqueness invariant.
//! - `idx_object_content_version`: used to compute `max(version) + 1`.

use sea_orm_migration::prelude::*;

use crate::m20260301_000001_create_table_content::Content;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DO $$
                BEGIN
                    IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'object_status') THEN
                        CREATE TYPE object_status AS ENUM ('created', 'uploading', 'uploaded', 'deleted');
                    END IF;
                END$$;
                "#,
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Object::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Object::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Object::ContentId).uuid().not_null())
                    .col(
                        ColumnDef::new(Object::StorageBackendName)
                            .string_len(63)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Object::StorageClass)
                            .string_len(63)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Object::ObjectKey)
                            .string_len(1024)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Object::FileName)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Object::Version).integer().not_null())
                    .col(
                        ColumnDef::new(Object::ObjectType)
                            .string_len(63)
                            .not_null()
                            .default("original"),
                    )
                    .col(
                        ColumnDef::new(Object::Status)
                            .custom(Alias::new("object_status"))
                            .not_null()
                            .default(Expr::cust("'created'::object_status")),
                    )
                    .col(
                        ColumnDef::new(Object::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Object::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Object::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_object_content_id")
                            .from(Object::Table, Object::ContentId)
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
                CREATE INDEX idx_object_content_id
                ON object (content_id)
                WHERE deleted_at IS NULL;

                CREATE UNIQUE INDEX idx_object_backend_key_unique
                ON object (storage_backend_name, object_key);

                CREATE INDEX idx_object_content_version
                ON object (content_id, version DESC);
                "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TRIGGER update_object_updated_at
                BEFORE UPDATE ON object
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
                DROP TRIGGER IF EXISTS update_object_updated_at ON object;
                DROP INDEX IF EXISTS idx_object_content_id;
                DROP INDEX IF EXISTS idx_object_backend_key_unique;
                DROP INDEX IF EXISTS idx_object_content_version;
                "#,
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Object::Table).to_owned())
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS object_status;")
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Object {
    Table,
    Id,
    ContentId,
    StorageBackendName,
    StorageClass,
    ObjectKey,
    FileName,
    Version,
    ObjectType,
    Status,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
