use uuid::Uuid;

/// The service's unified failure taxonomy. One enum covers every incoming
/// port so the HTTP boundary needs exactly one kind → status mapping
/// function.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    #[error("content {0} not found")]
    ContentNotFound(Uuid),

    #[error("object {0} not found")]
    ObjectNotFound(Uuid),

    #[error("storage backend {0} not found")]
    StorageBackendNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("too many ids: {0}")]
    TooManyIds(String),

    #[error("storage failure: {0}")]
    StorageFailure(String),

    #[error("repository failure: {0}")]
    RepositoryFailure(String),

    #[error("refused transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("{0} already exists")]
    AlreadyExists(String),
}

impl CoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::ContentNotFound(_)
            | CoreError::ObjectNotFound(_)
            | CoreError::StorageBackendNotFound(_) => "not_found",
            CoreError::InvalidRequest(_) => "invalid_request",
            CoreError::TooManyIds(_) => "too_many_ids",
            CoreError::InvalidStatusTransition { .. } => "invalid_status_transition",
            CoreError::AlreadyExists(_) => "already_exists",
            CoreError::StorageFailure(_) => "storage_failure",
            CoreError::RepositoryFailure(_) => "repository_failure",
        }
    }
}

impl From<crate::content::application::ports::outgoing::content_repository::ContentRepositoryError>
    for CoreError
{
    fn from(
        e: crate::content::application::ports::outgoing::content_repository::ContentRepositoryError,
    ) -> Self {
        use crate::content::application::ports::outgoing::content_repository::ContentRepositoryError as E;
        match e {
            E::NotFound(id) => CoreError::ContentNotFound(id),
            E::AlreadyExists(id) => CoreError::AlreadyExists(format!("content {id}")),
            E::InvalidStatusTransition { from, to } => {
                CoreError::InvalidStatusTransition { from, to }
            }
            E::Repository(msg) => CoreError::RepositoryFailure(msg),
        }
    }
}

impl From<crate::content::application::ports::outgoing::content_query::ContentQueryError>
    for CoreError
{
    fn from(
        e: crate::content::application::ports::outgoing::content_query::ContentQueryError,
    ) -> Self {
        use crate::content::application::ports::outgoing::content_query::ContentQueryError as E;
        match e {
            E::Repository(msg) => CoreError::RepositoryFailure(msg),
        }
    }
}

impl From<crate::content::application::ports::outgoing::object_repository::ObjectRepositoryError>
    for CoreError
{
    fn from(
        e: crate::content::application::ports::outgoing::object_repository::ObjectRepositoryError,
    ) -> Self {
        use crate::content::application::ports::outgoing::object_repository::ObjectRepositoryError as E;
        match e {
            E::NotFound(id) => CoreError::ObjectNotFound(id),
            E::KeyAlreadyExists { backend, key } => {
                CoreError::AlreadyExists(format!("object key {key} on backend {backend}"))
            }
            E::Repository(msg) => CoreError::RepositoryFailure(msg),
        }
    }
}

impl From<crate::content::application::ports::outgoing::object_query::ObjectQueryError>
    for CoreError
{
    fn from(e: crate::content::application::ports::outgoing::object_query::ObjectQueryError) -> Self {
        use crate::content::application::ports::outgoing::object_query::ObjectQueryError as E;
        match e {
            E::Repository(msg) => CoreError::RepositoryFailure(msg),
        }
    }
}

impl From<crate::content::application::ports::outgoing::derived_repository::DerivedRepositoryError>
    for CoreError
{
    fn from(
        e: crate::content::application::ports::outgoing::derived_repository::DerivedRepositoryError,
    ) -> Self {
        use crate::content::application::ports::outgoing::derived_repository::DerivedRepositoryError as E;
        match e {
            E::AlreadyExists(parent, child) => {
                CoreError::AlreadyExists(format!("derived edge ({parent}, {child})"))
            }
            E::SelfReference => {
                CoreError::InvalidRequest("parent and child content must differ".into())
            }
            E::Repository(msg) => CoreError::RepositoryFailure(msg),
        }
    }
}

impl From<crate::content::application::ports::outgoing::content_metadata_repository::ContentMetadataRepositoryError>
    for CoreError
{
    fn from(
        e: crate::content::application::ports::outgoing::content_metadata_repository::ContentMetadataRepositoryError,
    ) -> Self {
        use crate::content::application::ports::outgoing::content_metadata_repository::ContentMetadataRepositoryError as E;
        match e {
            E::Repository(msg) => CoreError::RepositoryFailure(msg),
        }
    }
}

impl From<crate::content::application::ports::outgoing::blobstore::BlobStoreError> for CoreError {
    fn from(e: crate::content::application::ports::outgoing::blobstore::BlobStoreError) -> Self {
        use crate::content::application::ports::outgoing::blobstore::BlobStoreError as E;
        match e {
            E::NotFound => CoreError::ObjectNotFound(Uuid::nil()),
            E::Timeout => CoreError::StorageFailure("timeout".into()),
            E::Unsupported => CoreError::StorageFailure("backend does not support operation".into()),
            E::Io(msg) => CoreError::StorageFailure(msg),
        }
    }
}

impl From<crate::content::application::ports::outgoing::url_strategy::UrlStrategyError>
    for CoreError
{
    fn from(e: crate::content::application::ports::outgoing::url_strategy::UrlStrategyError) -> Self {
        use crate::content::application::ports::outgoing::url_strategy::UrlStrategyError as E;
        match e {
            E::BackendNotFound(name) => CoreError::StorageBackendNotFound(name),
            E::PresignUnsupported => CoreError::StorageFailure("presign unsupported".into()),
            E::Timeout => CoreError::StorageFailure("timeout".into()),
            E::Storage(msg) => CoreError::StorageFailure(msg),
        }
    }
}
