use serde::Serialize;

use crate::error::AppResult;
use crate::models::{ActivityLogEntry, PageStatus};
use crate::pages::PageRepository;
use crate::services::activity_log::ActivityLog;
use crate::services::media_library::MediaLibrary;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_pages: usize,
    pub published_pages: usize,
    pub draft_pages: usize,
    pub total_media: usize,
    pub recent_activity: Vec<ActivityLogEntry>,
}

/// Gather the overview counts in one pass over each collection.
pub async fn collect_stats(
    pages: &PageRepository,
    media: &MediaLibrary,
    activity: &ActivityLog,
    activity_limit: usize,
) -> AppResult<DashboardStats> {
    let (pages, media, recent_activity) =
        futures::try_join!(pages.list(), media.list(), activity.recent(activity_limit))?;

    let published_pages = pages
        .iter()
        .filter(|page| page.status == PageStatus::Published)
        .count();
    let draft_pages = pages
        .iter()
        .filter(|page| page.status == PageStatus::Draft)
        .count();

    Ok(DashboardStats {
        total_pages: pages.len(),
        published_pages,
        draft_pages,
        total_media: media.len(),
        recent_activity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{DocumentStore, InMemoryDocumentStore, LocalBlobStore};
    use crate::models::Page;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_counts_by_status() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let pages = PageRepository::new(store.clone());
        let activity = ActivityLog::new(store.clone());
        let media = MediaLibrary::new(
            store.clone(),
            Arc::new(LocalBlobStore::new(dir.path(), "http://localhost:8000")),
            activity.clone(),
        );

        let mut home = Page::new("Home");
        home.status = PageStatus::Published;
        pages.insert("home", &home).await.unwrap();
        pages.create(&Page::new("Notes")).await.unwrap();
        pages.create(&Page::new("Drafts")).await.unwrap();

        let stats = collect_stats(&pages, &media, &activity, 5).await.unwrap();
        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.published_pages, 1);
        assert_eq!(stats.draft_pages, 2);
        assert_eq!(stats.total_media, 0);
        assert!(stats.recent_activity.is_empty());
    }
}
