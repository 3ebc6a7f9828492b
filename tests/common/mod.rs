// Document store wrappers that delay, fail or count writes

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use content_hub::error::{AppError, AppResult};
use content_hub::infrastructure::{
    AuthenticatedUser, Document, DocumentQuery, DocumentStore, DocumentWrite,
    InMemoryDocumentStore,
};

pub fn admin() -> AuthenticatedUser {
    AuthenticatedUser {
        uid: "YWRtaW5AZXhhbXBsZS5jb20".to_string(),
        email: "admin@example.com".to_string(),
    }
}

/// Wraps a store and controls how its writes behave.
pub struct ScriptedStore {
    pub inner: InMemoryDocumentStore,
    /// Delay applied to every `set`.
    pub set_delay: Duration,
    /// Collections whose writes are rejected.
    pub failing_collections: Vec<&'static str>,
    /// When set, every `get` fails.
    pub failing_reads: bool,
    pub writes: AtomicUsize,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            set_delay: Duration::ZERO,
            failing_collections: Vec::new(),
            failing_reads: false,
            writes: AtomicUsize::new(0),
        }
    }

    pub fn with_set_delay(mut self, delay: Duration) -> Self {
        self.set_delay = delay;
        self
    }

    pub fn failing(mut self, collection: &'static str) -> Self {
        self.failing_collections.push(collection);
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.failing_reads = true;
        self
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self, collection: &str) -> AppResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.failing_collections.iter().any(|failing| *failing == collection) {
            return Err(AppError::DatabaseError(format!(
                "permission denied writing to {}",
                collection
            )));
        }
        Ok(())
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        if self.failing_reads {
            return Err(AppError::DatabaseError(format!(
                "unavailable reading {}/{}",
                collection, id
            )));
        }
        self.inner.get(collection, id).await
    }

    async fn list(&self, collection: &str) -> AppResult<Vec<Document>> {
        self.inner.list(collection).await
    }

    async fn query(&self, collection: &str, query: DocumentQuery) -> AppResult<Vec<Document>> {
        self.inner.query(collection, query).await
    }

    async fn create(&self, collection: &str, write: DocumentWrite) -> AppResult<String> {
        self.check(collection)?;
        self.inner.create(collection, write).await
    }

    async fn set(&self, collection: &str, id: &str, write: DocumentWrite) -> AppResult<()> {
        if !self.set_delay.is_zero() {
            tokio::time::sleep(self.set_delay).await;
        }
        self.check(collection)?;
        self.inner.set(collection, id, write).await
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<bool> {
        self.check(collection)?;
        self.inner.delete(collection, id).await
    }
}
