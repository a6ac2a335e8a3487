mod admin;
mod content_lifecycle;
mod derivation;
mod scanner;
mod storage_facet;
mod upload_pipeline;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::content::application::domain::key_generator::ObjectKeyGenerator;
use crate::content::application::ports::outgoing::blobstore::BlobStore;
use crate::content::application::ports::outgoing::content_metadata_repository::ContentMetadataRepository;
use crate::content::application::ports::outgoing::content_query::ContentQuery;
use crate::content::application::ports::outgoing::content_repository::ContentRepository;
use crate::content::application::ports::outgoing::derived_repository::DerivedRepository;
use crate::content::application::ports::outgoing::event_sink::EventSink;
use crate::content::application::ports::outgoing::object_query::ObjectQuery;
use crate::content::application::ports::outgoing::object_repository::ObjectRepository;
use crate::content::application::ports::outgoing::previewer::Previewer;
use crate::content::application::ports::outgoing::url_strategy::UrlStrategy;

/// Minimum/maximum presign expiry, seconds.
pub const MIN_PRESIGN_EXPIRY: Duration = Duration::from_secs(60);
pub const MAX_PRESIGN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 3600);
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(6 * 3600);

/// The core orchestrator. Holds no mutable state beyond its injected
/// collaborators, so one value is shared across every concurrent handler.
/// Implements `CoreService`, `StorageService`, `DerivationService`,
/// `AdminService` and `Scanner` each in their own file: one facet, one
/// interface, same underlying value.
#[derive(Clone)]
pub struct ContentService {
    pub(super) content_repo: Arc<dyn ContentRepository>,
    pub(super) content_query: Arc<dyn ContentQuery>,
    pub(super) content_metadata_repo: Arc<dyn ContentMetadataRepository>,
    pub(super) object_repo: Arc<dyn ObjectRepository>,
    pub(super) object_query: Arc<dyn ObjectQuery>,
    pub(super) derived_repo: Arc<dyn DerivedRepository>,
    pub(super) key_generator: Arc<dyn ObjectKeyGenerator>,
    pub(super) blobstores: Arc<HashMap<String, Arc<dyn BlobStore>>>,
    pub(super) url_strategy: Arc<dyn UrlStrategy>,
    pub(super) event_sink: Arc<dyn EventSink>,
    pub(super) previewer: Arc<dyn Previewer>,
    pub(super) presign_expiry: Duration,
}

impl ContentService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        content_repo: Arc<dyn ContentRepository>,
        content_query: Arc<dyn ContentQuery>,
        content_metadata_repo: Arc<dyn ContentMetadataRepository>,
        object_repo: Arc<dyn ObjectRepository>,
        object_query: Arc<dyn ObjectQuery>,
        derived_repo: Arc<dyn DerivedRepository>,
        key_generator: Arc<dyn ObjectKeyGenerator>,
        blobstores: HashMap<String, Arc<dyn BlobStore>>,
        url_strategy: Arc<dyn UrlStrategy>,
        event_sink: Arc<dyn EventSink>,
        previewer: Arc<dyn Previewer>,
    ) -> Self {
        Self {
            content_repo,
            content_query,
            content_metadata_repo,
            object_repo,
            object_query,
            derived_repo,
            key_generator,
            blobstores: Arc::new(blobstores),
            url_strategy,
            event_sink,
            previewer,
            presign_expiry: DEFAULT_PRESIGN_EXPIRY,
        }
    }

    pub fn with_presign_expiry(mut self, expiry: Duration) -> Self {
        self.presign_expiry = expiry.clamp(MIN_PRESIGN_EXPIRY, MAX_PRESIGN_EXPIRY);
        self
    }

    pub(super) fn backend(
        &self,
        name: &str,
    ) -> Result<Arc<dyn BlobStore>, crate::content::application::ports::incoming::error::CoreError>
    {
        self.blobstores.get(name).cloned().ok_or_else(|| {
            crate::content::application::ports::incoming::error::CoreError::StorageBackendNotFound(
                name.to_string(),
            )
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support;
