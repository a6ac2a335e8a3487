use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncRead};

use crate::content::application::ports::outgoing::blobstore::{
    BlobStat, BlobStore, BlobStoreCapabilities, BlobStoreError,
};

/// A map guarded by a single readers-writer lock. The canonical backend
/// for the in-process test harness; also usable standalone for
/// `STORAGE_URL=memory://`.
pub struct MemoryBlobStore {
    name: String,
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> BlobStoreCapabilities {
        BlobStoreCapabilities {
            supports_presign: false,
            supports_range: false,
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
        let mut objects = self
            .objects
            .write()
            .map_err(|_| BlobStoreError::Io("poisoned lock".into()))?;
        objects.insert(key.to_string(), Bytes::from(buf));
        Ok(())
    }

    async fn download(
        &self,
        key: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, BlobStoreError> {
        let bytes = self.download_bytes(key).await?;
        Ok(Box::new(std::io::Cursor::new(bytes.to_vec())))
    }

    async fn download_bytes(&self, key: &str) -> Result<Bytes, BlobStoreError> {
        let objects = self
            .objects
            .read()
            .map_err(|_| BlobStoreError::Io("poisoned lock".into()))?;
        objects.get(key).cloned().ok_or(BlobStoreError::NotFound)
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| BlobStoreError::Io("poisoned lock".into()))?;
        objects.remove(key);
        Ok(())
    }

    async fn stat(&self, key: &str) -> Result<BlobStat, BlobStoreError> {
        let bytes = self.download_bytes(key).await?;
        let etag = format!("{:x}", md5_like_checksum(&bytes));
        Ok(BlobStat {
            size_bytes: bytes.len() as i64,
            etag,
            mime_type: None,
        })
    }

    async fn presign_upload_url(
        &self,
        _key: &str,
        _expiry: Duration,
    ) -> Result<String, BlobStoreError> {
        Err(BlobStoreError::Unsupported)
    }

    async fn presign_download_url(
        &self,
        _key: &str,
        _expiry: Duration,
        _file_name: Option<&str>,
    ) -> Result<String, BlobStoreError> {
        Err(BlobStoreError::Unsupported)
    }
}

/// Cheap content fingerprint for the in-memory backend's etag; real backends
/// (filesystem, S3) report a backend-native etag instead.
fn md5_like_checksum(bytes: &[u8]) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_then_download_roundtrips_bytes() {
        let store = MemoryBlobStore::default();
        store
            .upload("k1", Box::new(std::io::Cursor::new(b"hello".to_vec())))
            .await
            .unwrap();
        let bytes = store.download_bytes("k1").await.unwrap();
        assert_eq!(bytes.as_ref(), b"hello");
    }

    #[tokio::test]
    async fn stat_reports_size() {
        let store = MemoryBlobStore::default();
        store
            .upload("k1", Box::new(std::io::Cursor::new(b"hello world".to_vec())))
            .await
            .unwrap();
        let stat = store.stat("k1").await.unwrap();
        assert_eq!(stat.size_bytes, 11);
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = MemoryBlobStore::default();
        let err = store.download_bytes("missing").await.unwrap_err();
        assert_eq!(err, BlobStoreError::NotFound);
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let store = MemoryBlobStore::default();
        store
            .upload("k1", Box::new(std::io::Cursor::new(b"x".to_vec())))
            .await
            .unwrap();
        store.delete("k1").await.unwrap();
        assert_eq!(
            store.download_bytes("k1").await.unwrap_err(),
            BlobStoreError::NotFound
        );
    }

    #[tokio::test]
    async fn presign_is_unsupported() {
        let store = MemoryBlobStore::default();
        let err = store
            .presign_upload_url("k1", Duration::from_secs(60))
            .await
            .unwrap_err();
        assert_eq!(err, BlobStoreError::Unsupported);
    }
}
