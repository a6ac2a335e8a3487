use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_creds::Credentials;
use aws_region::Region;
use bytes::Bytes;
use s3::bucket::Bucket;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::OnceCell;

use crate::content::application::ports::outgoing::blobstore::{
    BlobStat, BlobStore, BlobStoreCapabilities, BlobStoreError,
};

fn map_error(e: impl std::fmt::Display) -> BlobStoreError {
    let msg = e.to_string();
    let m = msg.to_lowercase();
    if m.contains("404") || m.contains("not found") || m.contains("nosuchkey") {
        BlobStoreError::NotFound
    } else if m.contains("timeout") || m.contains("timed out") {
        BlobStoreError::Timeout
    } else {
        BlobStoreError::Io(msg)
    }
}

/// Internal seam to make the adapter testable without standing up a real
/// S3/MinIO endpoint. Production wraps `s3::bucket::Bucket`; tests implement
/// this with a fake.
#[async_trait]
trait S3Client: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), String>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, String>;
    async fn delete(&self, key: &str) -> Result<(), String>;
    async fn head(&self, key: &str) -> Result<(i64, Option<String>, Option<String>), String>;
    fn presign_get(&self, key: &str, expiry_secs: u32, file_name: Option<&str>) -> Result<String, String>;
    fn presign_put(&self, key: &str, expiry_secs: u32) -> Result<String, String>;
}

struct RealS3Client {
    bucket: Bucket,
}

impl RealS3Client {
    fn new(
        bucket_name: &str,
        region: Region,
        credentials: Credentials,
        path_style: bool,
    ) -> Result<Self, BlobStoreError> {
        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| BlobStoreError::Io(e.to_string()))?;
        let bucket = if path_style {
            bucket.with_path_style()
        } else {
            bucket
        };
        Ok(Self { bucket })
    }
}

#[async_trait]
impl S3Client for RealS3Client {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), String> {
        self.bucket
            .put_object(key, &bytes)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, String> {
        self.bucket
            .get_object(key)
            .await
            .map(|r| r.to_vec())
            .map_err(|e| e.to_string())
    }

    async fn delete(&self, key: &str) -> Result<(), String> {
        self.bucket
            .delete_object(key)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn head(&self, key: &str) -> Result<(i64, Option<String>, Option<String>), String> {
        let (result, _status) = self.bucket.head_object(key).await.map_err(|e| e.to_string())?;
        Ok((
            result.content_length.unwrap_or(0),
            result.e_tag,
            result.content_type,
        ))
    }

    fn presign_get(&self, key: &str, expiry_secs: u32, file_name: Option<&str>) -> Result<String, String> {
        let custom_queries = file_name.map(|name| {
            let mut queries = std::collections::HashMap::new();
            queries.insert(
                "response-content-disposition".to_string(),
                format!("attachment; filename=\"{name}\""),
            );
            queries
        });
        self.bucket
            .presign_get(key, expiry_secs, custom_queries)
            .map_err(|e| e.to_string())
    }

    fn presign_put(&self, key: &str, expiry_secs: u32) -> Result<String, String> {
        self.bucket
            .presign_put(key, expiry_secs, None)
            .map_err(|e| e.to_string())
    }
}

/// Credentials and endpoint for an S3/MinIO-compatible bucket, read once at
/// startup from `STORAGE_URL`/AWS env vars.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket_name: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub path_style: bool,
}

#[derive(Clone)]
pub struct S3BlobStore {
    name: String,
    config: S3Config,
    client: Arc<OnceCell<Box<dyn S3Client>>>,
}

impl S3BlobStore {
    pub fn new(name: impl Into<String>, config: S3Config) -> Self {
        Self {
            name: name.into(),
            config,
            client: Arc::new(OnceCell::new()),
        }
    }

    async fn get_client(&self) -> Result<&(dyn S3Client), BlobStoreError> {
        self.client
            .get_or_try_init(|| async {
                let region = match &self.config.endpoint {
                    Some(endpoint) => Region::Custom {
                        region: self.config.region.clone(),
                        endpoint: endpoint.clone(),
                    },
                    None => Region::from(self.config.region.as_str()),
                };
                let credentials = Credentials::new(
                    self.config.access_key.as_deref(),
                    self.config.secret_key.as_deref(),
                    None,
                    None,
                    None,
                )
                .map_err(|e| BlobStoreError::Io(e.to_string()))?;
                let client = RealS3Client::new(
                    &self.config.bucket_name,
                    region,
                    credentials,
                    self.config.path_style,
                )?;
                Ok(Box::new(client) as Box<dyn S3Client>)
            })
            .await
            .map(|boxed| &**boxed)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> BlobStoreCapabilities {
        BlobStoreCapabilities {
            supports_presign: true,
            supports_range: true,
        }
    }

    async fn upload(
        &self,
        key: &str,
        mut reader: Box<dyn AsyncRead + Send + Unpin>,
    ) -> Result<(), BlobStoreError> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|e| BlobStoreError::Io(e.to_string()))?;
        let client = self.get_client().await?;
        client.put(key, buf).await.map_err(map_error)
    }

    async fn download(
        &self,
        key: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, BlobStoreError> {
        let bytes = self.download_bytes(key).await?;
        Ok(Box::new(std::io::Cursor::new(bytes.to_vec())))
    }

    async fn download_bytes(&self, key: &str) -> Result<Bytes, BlobStoreError> {
        let client = self.get_client().await?;
        client.get(key).await.map(Bytes::from).map_err(map_error)
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        let client = self.get_client().await?;
        client.delete(key).await.map_err(map_error)
    }

    async fn stat(&self, key: &str) -> Result<BlobStat, BlobStoreError> {
        let client = self.get_client().await?;
        let (size_bytes, etag, mime_type) = client.head(key).await.map_err(map_error)?;
        Ok(BlobStat {
            size_bytes,
            etag: etag.unwrap_or_default(),
            mime_type,
        })
    }

    async fn presign_upload_url(
        &self,
        key: &str,
        expiry: Duration,
    ) -> Result<String, BlobStoreError> {
        let client = self.get_client().await?;
        client
            .presign_put(key, expiry.as_secs() as u32)
            .map_err(map_error)
    }

    async fn presign_download_url(
        &self,
        key: &str,
        expiry: Duration,
        file_name: Option<&str>,
    ) -> Result<String, BlobStoreError> {
        let client = self.get_client().await?;
        client
            .presign_get(key, expiry.as_secs() as u32, file_name)
            .map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeS3Client {
        objects: Mutex<std::collections::HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl S3Client for FakeS3Client {
        async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), String> {
            self.objects.lock().unwrap().insert(key.to_string(), bytes);
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Vec<u8>, String> {
            self.objects
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| "404 not found".to_string())
        }

        async fn delete(&self, key: &str) -> Result<(), String> {
            self.objects.lock().unwrap().remove(key);
            Ok(())
        }

        async fn head(&self, key: &str) -> Result<(i64, Option<String>, Option<String>), String> {
            let objects = self.objects.lock().unwrap();
            let bytes = objects.get(key).ok_or_else(|| "404 not found".to_string())?;
            Ok((bytes.len() as i64, Some("etag".to_string()), None))
        }

        fn presign_get(&self, key: &str, expiry_secs: u32, file_name: Option<&str>) -> Result<String, String> {
            match file_name {
                Some(name) => Ok(format!(
                    "https://example.test/{key}?expires={expiry_secs}&filename={name}"
                )),
                None => Ok(format!("https://example.test/{key}?expires={expiry_secs}")),
            }
        }

        fn presign_put(&self, key: &str, expiry_secs: u32) -> Result<String, String> {
            Ok(format!("https://example.test/{key}?upload&expires={expiry_secs}"))
        }
    }

    #[test]
    fn map_error_classifies_not_found() {
        assert_eq!(map_error("404 Not Found"), BlobStoreError::NotFound);
    }

    #[test]
    fn map_error_classifies_timeout() {
        assert_eq!(map_error("request timed out"), BlobStoreError::Timeout);
    }

    #[test]
    fn presign_get_carries_the_file_name_when_given() {
        let client = FakeS3Client {
            objects: Mutex::new(std::collections::HashMap::new()),
        };
        let url = client.presign_get("k1", 3600, Some("report.pdf")).unwrap();
        assert!(url.contains("filename=report.pdf"));
    }

    #[tokio::test]
    async fn fake_client_roundtrips_via_the_trait_seam() {
        let client: Box<dyn S3Client> = Box::new(FakeS3Client {
            objects: Mutex::new(std::collections::HashMap::new()),
        });
        client.put("k1", b"hello".to_vec()).await.unwrap();
        let bytes = client.get("k1").await.unwrap();
        assert_eq!(bytes, b"hello");
        let (size, etag, _) = client.head("k1").await.unwrap();
        assert_eq!(size, 5);
        assert!(etag.is_some());
    }
}
