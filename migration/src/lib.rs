pub use sea_orm_migration::prelude::*;

pub mod m20260301_000001_create_table_content;
mod m20260301_000002_create_table_content_metadata;
mod m20260301_000003_create_table_object;
mod m20260301_000004_create_table_object_metadata;
mod m20260301_000005_create_table_content_derived;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_table_content::Migration),
            Box::new(m20260301_000002_create_table_content_metadata::Migration),
            Box::new(m20260301_000003_create_table_object::Migration),
            Box::new(m20260301_000004_create_table_object_metadata::Migration),
            Box::new(m20260301_000005_create_table_content_derived::Migration),
        ]
    }
}
