//! Blob store collaborator: holds uploaded images and hands back a stable,
//! publicly fetchable URL. The content-type and size contract lives here so
//! every implementation enforces it identically.

pub mod fs;

use async_trait::async_trait;
use thiserror::Error;

/// Content types an image upload may carry.
pub const ALLOWED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Hard cap on accepted uploads: 2 MiB.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unsupported content type: {0} (only image/jpeg and image/png are accepted)")]
    UnsupportedType(String),
    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
    #[error("storage error: {0}")]
    Io(String),
}

/// Validate the upload contract before any bytes are written.
pub fn check_image(content_type: &str, size: usize, max_bytes: usize) -> Result<(), StorageError> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(StorageError::UnsupportedType(content_type.to_string()));
    }
    if size > max_bytes {
        return Err(StorageError::TooLarge { size, max: max_bytes });
    }
    Ok(())
}

/// External object storage boundary. Implementations receive a completed
/// byte buffer and return the public URL, or fail; callers never see a
/// partially transferred object.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put_image(
        &self,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<String, StorageError>;

    /// Remove a previously stored object by the URL `put_image` returned.
    /// Deleting an object that is already gone is not an error.
    async fn delete_image(&self, url: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests: validates the same contract and returns
/// deterministic-shaped URLs without touching the filesystem.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryBlobStore {
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryBlobStore {
        pub fn object_count(&self) -> usize {
            self.objects.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn put_image(
            &self,
            file_name: &str,
            content_type: &str,
            data: &[u8],
        ) -> Result<String, StorageError> {
            check_image(content_type, data.len(), MAX_IMAGE_BYTES)?;
            let key = format!("{}-{}", self.object_count(), file_name);
            self.objects.lock().unwrap().insert(key.clone(), data.to_vec());
            Ok(format!("memory://uploads/{}", key))
        }

        async fn delete_image(&self, url: &str) -> Result<(), StorageError> {
            let key = url.rsplit('/').next().unwrap_or(url);
            self.objects.lock().unwrap().remove(key);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MemoryBlobStore;
    use super::*;

    #[test]
    fn contract_rejects_wrong_type_and_oversize() {
        assert!(check_image("image/jpeg", 100, MAX_IMAGE_BYTES).is_ok());
        assert!(check_image("image/png", MAX_IMAGE_BYTES, MAX_IMAGE_BYTES).is_ok());
        assert!(matches!(
            check_image("image/gif", 100, MAX_IMAGE_BYTES),
            Err(StorageError::UnsupportedType(_))
        ));
        assert!(matches!(
            check_image("application/pdf", 100, MAX_IMAGE_BYTES),
            Err(StorageError::UnsupportedType(_))
        ));
        assert!(matches!(
            check_image("image/png", MAX_IMAGE_BYTES + 1, MAX_IMAGE_BYTES),
            Err(StorageError::TooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn memory_store_returns_url_per_object() {
        let store = MemoryBlobStore::default();
        let url = store.put_image("cover.png", "image/png", b"png-bytes").await.unwrap();
        assert!(url.contains("cover.png"));
        assert_eq!(store.object_count(), 1);

        let err = store.put_image("cover.gif", "image/gif", b"gif").await.unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedType(_)));

        store.delete_image(&url).await.unwrap();
        assert_eq!(store.object_count(), 0);
    }
}
