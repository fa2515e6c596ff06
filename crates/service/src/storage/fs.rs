use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::info;

use super::{check_image, BlobStore, StorageError};

/// Filesystem-backed blob store. Objects land under `root_dir` and are
/// served back by the HTTP layer at `{public_base_url}/uploads/{key}`,
/// which keeps the "stable public URL" contract without an external
/// object-storage dependency.
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl FsBlobStore {
    pub async fn new(
        root_dir: &str,
        public_base_url: &str,
        max_bytes: usize,
    ) -> anyhow::Result<Self> {
        let root = PathBuf::from(root_dir);
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_bytes,
        })
    }

    /// Millisecond timestamp prefix keeps keys unique and sortable;
    /// the original file name is kept for operator friendliness.
    fn object_key(file_name: &str) -> String {
        let safe: String = file_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        format!("{}-{}", Utc::now().timestamp_millis(), safe)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put_image(
        &self,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<String, StorageError> {
        check_image(content_type, data.len(), self.max_bytes)?;

        let key = Self::object_key(file_name);
        let path = self.root.join(&key);
        fs::write(&path, data).await.map_err(|e| StorageError::Io(e.to_string()))?;
        info!(key = %key, bytes = data.len(), content_type = %content_type, "image_stored");
        Ok(format!("{}/uploads/{}", self.public_base_url, key))
    }

    async fn delete_image(&self, url: &str) -> Result<(), StorageError> {
        // Keys never contain separators (object_key sanitizes), so the last
        // path segment of the URL is the key
        let key = url.rsplit('/').next().unwrap_or_default();
        if key.is_empty() || key.contains("..") {
            return Err(StorageError::Io(format!("unrecognized object url: {url}")));
        }
        match fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}
