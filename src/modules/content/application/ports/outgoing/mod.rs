pub mod blobstore;
pub mod content_metadata_repository;
pub mod content_query;
pub mod content_repository;
pub mod derived_repository;
pub mod event_sink;
pub mod object_query;
pub mod object_repository;
pub mod previewer;
pub mod url_strategy;
