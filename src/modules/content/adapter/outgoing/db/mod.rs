pub mod content_metadata_repository_postgres;
pub mod content_metadata_store_memory;
pub mod content_query_postgres;
pub mod content_repository_postgres;
pub mod content_store_memory;
pub mod derived_repository_postgres;
pub mod derived_store_memory;
pub mod object_query_postgres;
pub mod object_repository_postgres;
pub mod object_store_memory;
pub mod sea_orm_entity;
