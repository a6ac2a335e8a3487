use std::collections::HashMap;
use std::sync::Arc;

use crate::content::adapter::outgoing::blobstore::memory::MemoryBlobStore;
use crate::content::adapter::outgoing::db::content_metadata_store_memory::MemoryContentMetadataStore;
use crate::content::adapter::outgoing::db::content_store_memory::MemoryContentStore;
use crate::content::adapter::outgoing::db::derived_store_memory::MemoryDerivedStore;
use crate::content::adapter::outgoing::db::object_store_memory::MemoryObjectStore;
use crate::content::adapter::outgoing::event_sink::logging::LoggingEventSink;
use crate::content::adapter::outgoing::previewer::noop::NoopPreviewer;
use crate::content::adapter::outgoing::url_strategy::content_based::ContentBasedUrlStrategy;
use crate::content::application::domain::key_generator::TenantPartitionedKeyGenerator;
use crate::content::application::ports::outgoing::blobstore::BlobStore;

use super::ContentService;

/// Assembles a `ContentService` wired entirely to the in-process memory
/// adapters, the same combination `STORAGE_URL=memory://` and
/// `DATABASE_URL=memory://` select at runtime. Every service-level test in
/// this module and its sibling facet modules builds its fixture through
/// this one function so the wiring only needs to be right in one place.
pub(crate) fn memory_service() -> ContentService {
    let content_store = Arc::new(MemoryContentStore::new());
    let object_store = Arc::new(MemoryObjectStore::new());
    let metadata_store = Arc::new(MemoryContentMetadataStore::new());
    let derived_store = Arc::new(MemoryDerivedStore::new(content_store.clone()));

    let mut blobstores: HashMap<String, Arc<dyn BlobStore>> = HashMap::new();
    blobstores.insert("memory".to_string(), Arc::new(MemoryBlobStore::default()));

    ContentService::new(
        content_store.clone(),
        content_store,
        metadata_store,
        object_store.clone(),
        object_store,
        derived_store,
        Arc::new(TenantPartitionedKeyGenerator),
        blobstores,
        Arc::new(ContentBasedUrlStrategy::new("https://api.example.com")),
        Arc::new(LoggingEventSink),
        Arc::new(NoopPreviewer),
    )
}
