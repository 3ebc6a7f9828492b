// MediaLibrary - uploaded files: blob bytes plus an index record in `media`
// The two writes are not atomic; a failure between them leaves an orphaned blob

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::blob_store::BlobStore;
use crate::infrastructure::current_time_millis;
use crate::infrastructure::document_store::{DocumentStore, DocumentWrite};
use crate::infrastructure::viewer::AuthenticatedUser;
use crate::models::{MediaItem, StoredDocument};
use crate::services::activity_log::ActivityLog;

/// An incoming file.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct MediaLibrary {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    activity: ActivityLog,
}

impl MediaLibrary {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>, activity: ActivityLog) -> Self {
        Self {
            store,
            blobs,
            activity,
        }
    }

    /// Newest uploads first; records without `uploadedAt` sort last.
    pub async fn list(&self) -> AppResult<Vec<MediaItem>> {
        let mut items = self
            .store
            .list(MediaItem::COLLECTION)
            .await?
            .into_iter()
            .map(MediaItem::from_document)
            .collect::<AppResult<Vec<_>>>()?;
        items.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(items)
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<MediaItem>> {
        self.store
            .get(MediaItem::COLLECTION, id)
            .await?
            .map(MediaItem::from_document)
            .transpose()
    }

    #[instrument(skip(self, upload, actor), fields(name = %upload.name, size = upload.bytes.len()))]
    pub async fn upload(&self, upload: MediaUpload, actor: &AuthenticatedUser) -> AppResult<MediaItem> {
        let name = upload.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("File name is required".to_string()));
        }

        let storage_path = format!("media/{}_{}", current_time_millis(), name);
        let size = upload.bytes.len() as u64;
        let url = self
            .blobs
            .upload(&storage_path, upload.bytes, &upload.content_type)
            .await?;

        let mut item = MediaItem {
            id: None,
            name: name.clone(),
            url,
            content_type: upload.content_type,
            size,
            storage_path,
            uploaded_at: None,
            uploaded_by: actor.uid.clone(),
        };
        let write = DocumentWrite::new(item.to_fields()?).with_server_timestamp("uploadedAt");
        let id = self.store.create(MediaItem::COLLECTION, write).await?;
        info!("Uploaded media {} as {}", name, id);

        self.activity
            .record(format!("Uploaded media: {}", name), Some(actor))
            .await;

        // Re-read so the caller sees the store-assigned timestamp.
        match self.get(&id).await? {
            Some(stored) => Ok(stored),
            None => {
                item.id = Some(id);
                Ok(item)
            }
        }
    }

    /// Delete the blob, then the record. Nothing is rolled back if the second
    /// step fails.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let item = self
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media {} not found", id)))?;

        if !item.storage_path.is_empty() {
            self.blobs.delete(&item.storage_path).await?;
        } else {
            warn!("Media {} has no storage path; removing record only", id);
        }
        self.store.delete(MediaItem::COLLECTION, id).await?;
        info!("Deleted media {}", id);
        Ok(())
    }
}

/// Human-readable size: powers of 1024, rounded to two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let bytes = bytes as f64;
    let exponent = ((bytes.ln() / 1024f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = (bytes / 1024f64.powi(exponent as i32) * 100.0).round() / 100.0;
    format!("{} {}", value, UNITS[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{InMemoryDocumentStore, LocalBlobStore};

    fn library(root: &std::path::Path) -> MediaLibrary {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(root, "http://localhost:8000"));
        MediaLibrary::new(store.clone(), blobs, ActivityLog::new(store))
    }

    fn admin() -> AuthenticatedUser {
        AuthenticatedUser {
            uid: "admin".to_string(),
            email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(1_234_567_890), "1.15 GB");
    }

    #[tokio::test]
    async fn test_upload_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let media = library(dir.path());
        let user = admin();

        let item = media
            .upload(
                MediaUpload {
                    name: "portrait.png".to_string(),
                    content_type: "image/png".to_string(),
                    bytes: vec![1, 2, 3, 4],
                },
                &user,
            )
            .await
            .unwrap();

        let id = item.id.clone().unwrap();
        assert_eq!(item.size, 4);
        assert!(item.is_image());
        assert!(item.uploaded_at.is_some());
        assert_eq!(item.uploaded_by, "admin");
        assert!(item.storage_path.starts_with("media/"));
        assert!(item.storage_path.ends_with("_portrait.png"));
        assert!(dir.path().join(&item.storage_path).exists());

        assert_eq!(media.list().await.unwrap().len(), 1);
        let activity = media.activity.recent(5).await.unwrap();
        assert_eq!(activity[0].action, "Uploaded media: portrait.png");

        media.delete(&id).await.unwrap();
        assert!(media.list().await.unwrap().is_empty());
        assert!(!dir.path().join(&item.storage_path).exists());
    }

    #[tokio::test]
    async fn test_delete_unknown_media() {
        let dir = tempfile::tempdir().unwrap();
        let media = library(dir.path());
        assert!(matches!(media.delete("missing").await, Err(AppError::NotFound(_))));
    }
}
