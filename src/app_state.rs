use std::sync::Arc;

use crate::{
    config::Config,
    error::AppResult,
    infrastructure::{
        blob_store::{BlobStore, LocalBlobStore},
        document_store::DocumentStore,
        identity::IdentityProvider,
        middleware::HasIdentity,
        open_document_store,
    },
    pages::{PageRepository, PageSaveProtocol},
    services::{ActivityLog, MediaLibrary},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub pages: PageRepository,
    pub save_protocol: Arc<PageSaveProtocol>,
    pub activity: ActivityLog,
    pub media: MediaLibrary,
    pub identity: Arc<IdentityProvider>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = open_document_store(&config.database.url).await?;
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(
            &config.storage.blob_root,
            &config.storage.public_base_url,
        ));
        Ok(Self::with_backends(config, store, blobs)?)
    }

    /// Wire the services over already-opened backends.
    pub fn with_backends(
        config: Config,
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> AppResult<Self> {
        let identity = Arc::new(IdentityProvider::new(&config.auth)?);
        let pages = PageRepository::new(store.clone());
        let activity = ActivityLog::new(store.clone());
        let save_protocol = Arc::new(PageSaveProtocol::new(
            pages.clone(),
            activity.clone(),
            config.save_timeout(),
        ));
        let media = MediaLibrary::new(store.clone(), blobs, activity.clone());

        Ok(Self {
            config,
            store,
            pages,
            save_protocol,
            activity,
            media,
            identity,
        })
    }
}

impl HasIdentity for AppState {
    fn identity(&self) -> &Arc<IdentityProvider> {
        &self.identity
    }
}
