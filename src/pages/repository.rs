use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::infrastructure::document_store::{DocumentQuery, DocumentStore, DocumentWrite};
use crate::models::{Page, StoredDocument};

/// Client-side operations on the `pages` collection.
#[derive(Clone)]
pub struct PageRepository {
    store: Arc<dyn DocumentStore>,
}

impl PageRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<Page>> {
        self.store
            .get(Page::COLLECTION, id)
            .await?
            .map(Page::from_document)
            .transpose()
    }

    pub async fn exists(&self, id: &str) -> AppResult<bool> {
        Ok(self.store.get(Page::COLLECTION, id).await?.is_some())
    }

    pub async fn list(&self) -> AppResult<Vec<Page>> {
        self.store
            .list(Page::COLLECTION)
            .await?
            .into_iter()
            .map(Page::from_document)
            .collect()
    }

    /// Slugs are not unique, so every match is returned.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Vec<Page>> {
        self.store
            .query(Page::COLLECTION, DocumentQuery::new().where_eq("slug", slug))
            .await?
            .into_iter()
            .map(Page::from_document)
            .collect()
    }

    /// Create under a store-assigned id, stamping `createdAt` and `updatedAt`.
    pub async fn create(&self, page: &Page) -> AppResult<String> {
        let write = DocumentWrite::new(page.to_fields()?)
            .with_server_timestamp("createdAt")
            .with_server_timestamp("updatedAt");
        self.store
            .create(Page::COLLECTION, write)
            .await
            .map_err(AppError::into_commit)
    }

    /// Create at a caller-chosen id, stamping `createdAt` and `updatedAt`.
    pub async fn insert(&self, id: &str, page: &Page) -> AppResult<()> {
        let write = DocumentWrite::new(page.to_fields()?)
            .with_server_timestamp("createdAt")
            .with_server_timestamp("updatedAt");
        self.store
            .set(Page::COLLECTION, id, write)
            .await
            .map_err(AppError::into_commit)
    }

    /// Replace the whole document at `id`, stamping `updatedAt`.
    pub async fn upsert(&self, id: &str, page: &Page) -> AppResult<()> {
        let write = DocumentWrite::new(page.to_fields()?).with_server_timestamp("updatedAt");
        self.store
            .set(Page::COLLECTION, id, write)
            .await
            .map_err(AppError::into_commit)
    }

    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        self.store.delete(Page::COLLECTION, id).await
    }
}
