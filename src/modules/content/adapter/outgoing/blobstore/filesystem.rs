use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::content::application::ports::outgoing::blobstore::{
    BlobStat, BlobStore, BlobStoreCapabilities, BlobStoreError,
};

/// One file per object key under `root`, the key itself used as a relative
/// path. Writes land in a sibling temp file first and are renamed into place
/// so a reader never observes a partially-written object, keeping upload
/// idempotent on retry.
pub struct FilesystemBlobStore {
    name: String,
    root: PathBuf,
}

impl FilesystemBlobStore {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BlobStoreError> {
        if key.contains("..") {
            return Err(BlobStoreError::Io("object key must not contain '..'".into()));
        }
        Ok(self.root.join(key))
    }

    async fn ensure_parent(path: &Path) -> Result<(), BlobStoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobStoreError::Io(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> BlobStoreCapabilities {
        BlobStoreCapabilities {
            supports_presign: false,
            supports_range: true,
        }
    }

    async fn upload(
        &self,
        key: &str,
        mut reader: Box<dyn AsyncRead + Send + Unpin>,
    ) -> Result<(), BlobStoreError> {
        let dest = self.path_for(key)?;
        Self::ensure_parent(&dest).await?;

        let tmp_name = format!(
            "{}.tmp-{}",
            dest.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("blob"),
            uuid::Uuid::new_v4()
        );
        let tmp = dest.with_file_name(tmp_name);
        let mut file = fs::File::create(&tmp)
            .await
            .map_err(|e| BlobStoreError::Io(e.to_string()))?;

        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|e| BlobStoreError::Io(e.to_string()))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])
                .await
                .map_err(|e| BlobStoreError::Io(e.to_string()))?;
        }
        file.flush().await.map_err(|e| BlobStoreError::Io(e.to_string()))?;
        drop(file);

        fs::rename(&tmp, &dest)
            .await
            .map_err(|e| BlobStoreError::Io(e.to_string()))?;
        Ok(())
    }

    async fn download(
        &self,
        key: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, BlobStoreError> {
        let path = self.path_for(key)?;
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BlobStoreError::NotFound
            } else {
                BlobStoreError::Io(e.to_string())
            }
        })?;
        Ok(Box::new(file))
    }

    async fn download_bytes(&self, key: &str) -> Result<Bytes, BlobStoreError> {
        let mut reader = self.download(key).await?;
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|e| BlobStoreError::Io(e.to_string()))?;
        Ok(Bytes::from(buf))
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobStoreError::Io(e.to_string())),
        }
    }

    async fn stat(&self, key: &str) -> Result<BlobStat, BlobStoreError> {
        let path = self.path_for(key)?;
        let metadata = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BlobStoreError::NotFound
            } else {
                BlobStoreError::Io(e.to_string())
            }
        })?;
        let bytes = self.download_bytes(key).await?;
        let etag = format!("{:x}", md5_like_checksum(&bytes));
        Ok(BlobStat {
            size_bytes: metadata.len() as i64,
            etag,
            mime_type: None,
        })
    }
}

fn md5_like_checksum(bytes: &[u8]) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_root() -> PathBuf {
        std::env::temp_dir().join(format!("contentstore-fs-test-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn upload_then_download_roundtrips_bytes() {
        let store = FilesystemBlobStore::new("fs", tmp_root());
        store
            .upload("a/b/c", Box::new(std::io::Cursor::new(b"hello".to_vec())))
            .await
            .unwrap();
        let bytes = store.download_bytes("a/b/c").await.unwrap();
        assert_eq!(bytes.as_ref(), b"hello");
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = FilesystemBlobStore::new("fs", tmp_root());
        let err = store.download_bytes("missing").await.unwrap_err();
        assert_eq!(err, BlobStoreError::NotFound);
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let store = FilesystemBlobStore::new("fs", tmp_root());
        let err = store
            .upload("../escape", Box::new(std::io::Cursor::new(b"x".to_vec())))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobStoreError::Io(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent_on_missing_key() {
        let store = FilesystemBlobStore::new("fs", tmp_root());
        store.delete("never-existed").await.unwrap();
    }
}
