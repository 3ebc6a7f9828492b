// Blob Store - binary objects addressed by a path key

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::{AppError, AppResult};

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `path` and return a retrievable URL.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<String>;
    async fn delete(&self, path: &str) -> AppResult<()>;
}

/// Filesystem-backed blob store. Objects are served by the HTTP server under
/// `<public_base_url>/blobs/<path>`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = path.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(AppError::BadRequest(format!("Invalid blob path: {}", path)));
        }
        Ok(self.root.join(relative))
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/blobs/{}", self.public_base_url, path)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> AppResult<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::StorageError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let size = bytes.len();
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to write blob {}: {}", path, e)))?;
        debug!("Stored blob {} ({} bytes, {})", path, size, content_type);
        Ok(self.url_for(path))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Blob {} not found", path)))
            }
            Err(e) => Err(AppError::StorageError(format!(
                "Failed to delete blob {}: {}",
                path, e
            ))),
        }
    }
}
