// Core infrastructure modules
pub mod blob_store;            // Blob storage for uploaded media
pub mod document_store;        // Document store interface
pub mod id_generator;          // Document and block ids
pub mod identity;              // Email/password sessions
pub mod memory_store;          // In-process document store
pub mod middleware;            // Request viewer resolution
pub mod sqlite_store;          // SQLite document store
pub mod viewer;                // Viewer context

use std::sync::Arc;

pub use blob_store::{BlobStore, LocalBlobStore};
pub use document_store::{
    server_timestamp, Document, DocumentQuery, DocumentStore, DocumentWrite, SortDirection,
};
pub use id_generator::{generate_document_id, BlockIdGenerator};
pub use identity::{IdentityProvider, SignedInSession};
pub use memory_store::InMemoryDocumentStore;
pub use sqlite_store::SqliteDocumentStore;
pub use viewer::{AuthenticatedUser, ViewerContext};

/// Current time in milliseconds since Unix epoch
pub fn current_time_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Open the document store named by `DATABASE_URL`.
pub async fn open_document_store(url: &str) -> crate::error::AppResult<Arc<dyn DocumentStore>> {
    if url == "memory" {
        tracing::info!("Using in-memory document store");
        return Ok(Arc::new(InMemoryDocumentStore::new()));
    }
    Ok(Arc::new(SqliteDocumentStore::connect(url).await?))
}
