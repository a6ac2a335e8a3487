use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::content::adapter::outgoing::blobstore::filesystem::FilesystemBlobStore;
use crate::content::adapter::outgoing::blobstore::memory::MemoryBlobStore;
use crate::content::adapter::outgoing::blobstore::s3::S3BlobStore;
use crate::content::adapter::outgoing::db::content_metadata_repository_postgres::ContentMetadataRepositoryPostgres;
use crate::content::adapter::outgoing::db::content_metadata_store_memory::MemoryContentMetadataStore;
use crate::content::adapter::outgoing::db::content_query_postgres::ContentQueryPostgres;
use crate::content::adapter::outgoing::db::content_repository_postgres::ContentRepositoryPostgres;
use crate::content::adapter::outgoing::db::content_store_memory::MemoryContentStore;
use crate::content::adapter::outgoing::db::derived_repository_postgres::DerivedRepositoryPostgres;
use crate::content::adapter::outgoing::db::derived_store_memory::MemoryDerivedStore;
use crate::content::adapter::outgoing::db::object_query_postgres::ObjectQueryPostgres;
use crate::content::adapter::outgoing::db::object_repository_postgres::ObjectRepositoryPostgres;
use crate::content::adapter::outgoing::db::object_store_memory::MemoryObjectStore;
use crate::content::adapter::outgoing::event_sink::logging::LoggingEventSink;
use crate::content::adapter::outgoing::previewer::noop::NoopPreviewer;
use crate::content::adapter::outgoing::url_strategy::cdn::CdnUrlStrategy;
use crate::content::adapter::outgoing::url_strategy::content_based::ContentBasedUrlStrategy;
use crate::content::adapter::outgoing::url_strategy::storage_delegated::StorageDelegatedUrlStrategy;
use crate::content::application::domain::key_generator::{
    GitLikeShardedKeyGenerator, ObjectKeyGenerator, TenantPartitionedKeyGenerator,
};
use crate::content::application::ports::outgoing::blobstore::BlobStore;
use crate::content::application::ports::outgoing::content_metadata_repository::ContentMetadataRepository;
use crate::content::application::ports::outgoing::content_query::ContentQuery;
use crate::content::application::ports::outgoing::content_repository::ContentRepository;
use crate::content::application::ports::outgoing::derived_repository::DerivedRepository;
use crate::content::application::ports::outgoing::object_query::ObjectQuery;
use crate::content::application::ports::outgoing::object_repository::ObjectRepository;
use crate::content::application::ports::outgoing::url_strategy::UrlStrategy;
use crate::content::application::service::{ContentService, DEFAULT_PRESIGN_EXPIRY};
use crate::content::config::{ContentConfig, KeyGeneratorKind, StorageBackendConfig, UrlStrategyKind};

/// Picks the repository backend from `config.database_url` (auto-detects
/// `postgres://`, otherwise falls back to the in-process memory store) and
/// assembles a ready-to-serve `ContentService`. Returns the live connection
/// alongside the service so `main` can wire readiness checks to it; `None`
/// when running on the memory fallback, since liveness must never depend on
/// a reachable repository.
pub async fn build(config: &ContentConfig) -> (ContentService, Option<Arc<DatabaseConnection>>) {
    if config.database_url.starts_with("postgres://") || config.database_url.starts_with("postgresql://") {
        let mut opt = ConnectOptions::new(config.database_url.clone());
        opt.sqlx_logging(false);
        let conn = Database::connect(opt)
            .await
            .expect("failed to connect to DATABASE_URL");
        let db = Arc::new(conn);
        (build_service(config, Arc::clone(&db)), Some(db))
    } else {
        (build_service_memory(config), None)
    }
}

/// Assembles a `ContentService` from config plus a live Postgres connection,
/// mirroring the explicit, no-DI-framework wiring `main.rs` does for the
/// auth/CV modules.
pub fn build_service(config: &ContentConfig, db: Arc<DatabaseConnection>) -> ContentService {
    let content_repo = Arc::new(ContentRepositoryPostgres::new(Arc::clone(&db)));
    let content_query: Arc<dyn ContentQuery> = Arc::new(ContentQueryPostgres::new(Arc::clone(&db)));
    let content_metadata_repo = Arc::new(ContentMetadataRepositoryPostgres::new(Arc::clone(&db)));
    let object_repo = Arc::new(ObjectRepositoryPostgres::new(Arc::clone(&db)));
    let object_query = Arc::new(ObjectQueryPostgres::new(Arc::clone(&db)));
    let derived_repo = Arc::new(DerivedRepositoryPostgres::new(
        Arc::clone(&db),
        Arc::clone(&content_query),
    ));

    assemble(
        config,
        content_repo,
        content_query,
        content_metadata_repo,
        object_repo,
        object_query,
        derived_repo,
    )
}

/// Same wiring, backed entirely by the in-process memory adapters (no
/// Postgres required). Selected whenever `DATABASE_URL` isn't a `postgres://`
/// URL, and used directly by service-level tests via
/// `application::service::test_support::memory_service`.
pub fn build_service_memory(config: &ContentConfig) -> ContentService {
    let content_store = Arc::new(MemoryContentStore::new());
    let object_store = Arc::new(MemoryObjectStore::new());
    let metadata_store = Arc::new(MemoryContentMetadataStore::new());
    let derived_store = Arc::new(MemoryDerivedStore::new(content_store.clone()));

    assemble(
        config,
        content_store.clone(),
        content_store,
        metadata_store,
        object_store.clone(),
        object_store,
        derived_store,
    )
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    config: &ContentConfig,
    content_repo: Arc<dyn ContentRepository>,
    content_query: Arc<dyn ContentQuery>,
    content_metadata_repo: Arc<dyn ContentMetadataRepository>,
    object_repo: Arc<dyn ObjectRepository>,
    object_query: Arc<dyn ObjectQuery>,
    derived_repo: Arc<dyn DerivedRepository>,
) -> ContentService {
    let key_generator: Arc<dyn ObjectKeyGenerator> = match config.key_generator {
        KeyGeneratorKind::TenantPartitioned => Arc::new(TenantPartitionedKeyGenerator),
        KeyGeneratorKind::GitLike => Arc::new(GitLikeShardedKeyGenerator),
    };

    let blobstores = build_blobstores(config);

    let url_strategy: Arc<dyn UrlStrategy> = match &config.url_strategy {
        UrlStrategyKind::Cdn { cdn_base, api_base } => {
            Arc::new(CdnUrlStrategy::new(cdn_base.clone(), api_base.clone()))
        }
        UrlStrategyKind::ContentBased { api_base } => {
            Arc::new(ContentBasedUrlStrategy::new(api_base.clone()))
        }
        UrlStrategyKind::StorageDelegated => Arc::new(StorageDelegatedUrlStrategy::new(
            Arc::new(blobstores.clone()),
            DEFAULT_PRESIGN_EXPIRY,
        )),
    };

    ContentService::new(
        content_repo,
        content_query,
        content_metadata_repo,
        object_repo,
        object_query,
        derived_repo,
        key_generator,
        blobstores,
        url_strategy,
        Arc::new(LoggingEventSink),
        Arc::new(NoopPreviewer),
    )
}

fn build_blobstores(config: &ContentConfig) -> HashMap<String, Arc<dyn BlobStore>> {
    let mut blobstores: HashMap<String, Arc<dyn BlobStore>> = HashMap::new();
    let backend: Arc<dyn BlobStore> = match &config.storage_backend {
        StorageBackendConfig::Memory => Arc::new(MemoryBlobStore::new(&config.storage_backend_name)),
        StorageBackendConfig::Filesystem { root } => {
            Arc::new(FilesystemBlobStore::new(&config.storage_backend_name, root.clone()))
        }
        StorageBackendConfig::S3(s3_config) => {
            Arc::new(S3BlobStore::new(&config.storage_backend_name, s3_config.clone()))
        }
    };
    blobstores.insert(config.storage_backend_name.clone(), backend);
    blobstores
}
