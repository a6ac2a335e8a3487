use std::env;

/// Which `BlobStore` backend `STORAGE_URL` selects.
#[derive(Debug, Clone)]
pub enum StorageBackendConfig {
    Memory,
    Filesystem { root: String },
    S3(crate::content::adapter::outgoing::blobstore::s3::S3Config),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGeneratorKind {
    TenantPartitioned,
    GitLike,
}

#[derive(Debug, Clone)]
pub enum UrlStrategyKind {
    Cdn { cdn_base: String, api_base: String },
    ContentBased { api_base: String },
    StorageDelegated,
}

/// Typed environment configuration for the content module. Fails fast on
/// missing required vars via `env::var(..).expect(..)`.
#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub database_url: String,
    pub db_schema: String,
    pub host: String,
    pub port: String,
    pub storage_backend_name: String,
    pub storage_backend: StorageBackendConfig,
    pub url_strategy: UrlStrategyKind,
    pub upload_base_url: Option<String>,
    pub key_generator: KeyGeneratorKind,
    pub api_key_sha256: String,
    pub event_audit_url: Option<String>,
}

impl ContentConfig {
    /// Loads configuration from the process environment, loading a `.env`
    /// file first if present (teacher idiom).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "memory://".to_string());
        let db_schema = env::var("DB_SCHEMA").unwrap_or_else(|_| "content".to_string());
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());

        let storage_url = env::var("STORAGE_URL").unwrap_or_else(|_| "memory://".to_string());
        let (storage_backend_name, storage_backend) = parse_storage_url(&storage_url);

        let url_strategy = match env::var("URL_STRATEGY")
            .unwrap_or_else(|_| "storage-delegated".to_string())
            .as_str()
        {
            "cdn" => UrlStrategyKind::Cdn {
                cdn_base: env::var("CDN_BASE_URL").expect("CDN_BASE_URL must be set for URL_STRATEGY=cdn"),
                api_base: env::var("API_BASE_URL").unwrap_or_else(|_| format!("http://{host}:{port}")),
            },
            "content-based" => UrlStrategyKind::ContentBased {
                api_base: env::var("API_BASE_URL").unwrap_or_else(|_| format!("http://{host}:{port}")),
            },
            "storage-delegated" => UrlStrategyKind::StorageDelegated,
            other => panic!("unknown URL_STRATEGY: {other}"),
        };

        let key_generator = match env::var("OBJECT_KEY_GENERATOR")
            .unwrap_or_else(|_| "tenant-partitioned".to_string())
            .as_str()
        {
            "tenant-partitioned" => KeyGeneratorKind::TenantPartitioned,
            "git-like" => KeyGeneratorKind::GitLike,
            other => panic!("unknown OBJECT_KEY_GENERATOR: {other}"),
        };

        let api_key_sha256 = env::var("API_KEY_SHA256").expect("API_KEY_SHA256 must be set");

        Self {
            database_url,
            db_schema,
            host,
            port,
            storage_backend_name,
            storage_backend,
            url_strategy,
            upload_base_url: env::var("UPLOAD_BASE_URL").ok(),
            key_generator,
            api_key_sha256,
            event_audit_url: env::var("EVENT_AUDIT_URL").ok(),
        }
    }
}

/// `AWS_S3_USE_SSL` toggles the scheme on a bare `host:port` endpoint (MinIO
/// is commonly configured this way); an endpoint that already names a
/// scheme is left untouched.
fn prefix_scheme(endpoint: &str, use_ssl: bool) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else if use_ssl {
        format!("https://{endpoint}")
    } else {
        format!("http://{endpoint}")
    }
}

fn parse_storage_url(url: &str) -> (String, StorageBackendConfig) {
    if let Some(path) = url.strip_prefix("file://") {
        ("filesystem".to_string(), StorageBackendConfig::Filesystem { root: path.to_string() })
    } else if let Some(bucket) = url.strip_prefix("s3://") {
        let use_ssl = env::var("AWS_S3_USE_SSL")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        let endpoint = env::var("AWS_S3_ENDPOINT").ok().map(|e| prefix_scheme(&e, use_ssl));
        let config = crate::content::adapter::outgoing::blobstore::s3::S3Config {
            bucket_name: bucket.to_string(),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint,
            access_key: env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            path_style: env::var("AWS_S3_ENDPOINT").is_ok(),
        };
        ("s3".to_string(), StorageBackendConfig::S3(config))
    } else {
        ("memory".to_string(), StorageBackendConfig::Memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_storage_url_recognizes_filesystem_scheme() {
        let (name, backend) = parse_storage_url("file:///var/data/blobs");
        assert_eq!(name, "filesystem");
        assert!(matches!(backend, StorageBackendConfig::Filesystem { root } if root == "/var/data/blobs"));
    }

    #[test]
    fn parse_storage_url_recognizes_s3_scheme() {
        let (name, backend) = parse_storage_url("s3://my-bucket");
        assert_eq!(name, "s3");
        assert!(matches!(backend, StorageBackendConfig::S3(cfg) if cfg.bucket_name == "my-bucket"));
    }

    #[test]
    fn parse_storage_url_defaults_to_memory() {
        let (name, backend) = parse_storage_url("memory://");
        assert_eq!(name, "memory");
        assert!(matches!(backend, StorageBackendConfig::Memory));
    }

    #[test]
    fn prefix_scheme_adds_https_when_ssl_enabled() {
        assert_eq!(prefix_scheme("minio.internal:9000", true), "https://minio.internal:9000");
    }

    #[test]
    fn prefix_scheme_adds_http_when_ssl_disabled() {
        assert_eq!(prefix_scheme("minio.internal:9000", false), "http://minio.internal:9000");
    }

    #[test]
    fn prefix_scheme_leaves_explicit_scheme_untouched() {
        assert_eq!(prefix_scheme("http://minio.internal:9000", true), "http://minio.internal:9000");
    }
}
