// ActivityLog - append-only audit trail in the `activity_logs` collection
// Entries are secondary writes: a failed append never fails the operation it describes

use serde_json::Map;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::infrastructure::document_store::{
    DocumentQuery, DocumentStore, DocumentWrite, SortDirection,
};
use crate::infrastructure::viewer::AuthenticatedUser;
use crate::models::{ActivityLogEntry, StoredDocument};

/// Result of a best-effort append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryWrite {
    Written(String),
    /// No signed-in actor to attribute the entry to.
    Skipped,
    Failed(String),
}

#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn DocumentStore>,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append `action` attributed to `actor`. Never returns an error.
    pub async fn record(
        &self,
        action: impl Into<String>,
        actor: Option<&AuthenticatedUser>,
    ) -> SecondaryWrite {
        let action = action.into();
        let Some(actor) = actor else {
            debug!("No actor for activity '{}'; not recorded", action);
            return SecondaryWrite::Skipped;
        };

        match self.append(&action, &actor.uid).await {
            Ok(id) => SecondaryWrite::Written(id),
            Err(e) => {
                warn!("Failed to record activity '{}': {}", action, e);
                SecondaryWrite::Failed(e.to_string())
            }
        }
    }

    async fn append(&self, action: &str, user_id: &str) -> AppResult<String> {
        let mut fields = Map::new();
        fields.insert("action".to_string(), action.into());
        fields.insert("userId".to_string(), user_id.into());
        let write = DocumentWrite::new(fields).with_server_timestamp("timestamp");
        self.store.create(ActivityLogEntry::COLLECTION, write).await
    }

    /// Newest entries first.
    pub async fn recent(&self, limit: usize) -> AppResult<Vec<ActivityLogEntry>> {
        let query = DocumentQuery::new()
            .order_by("timestamp", SortDirection::Descending)
            .limit(limit);
        self.store
            .query(ActivityLogEntry::COLLECTION, query)
            .await?
            .into_iter()
            .map(ActivityLogEntry::from_document)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryDocumentStore;

    fn admin() -> AuthenticatedUser {
        AuthenticatedUser {
            uid: "YWRtaW5AZXhhbXBsZS5jb20".to_string(),
            email: "admin@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_without_actor_is_skipped() {
        let log = ActivityLog::new(Arc::new(InMemoryDocumentStore::new()));
        assert_eq!(log.record("Created page: Home", None).await, SecondaryWrite::Skipped);
        assert!(log.recent(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let log = ActivityLog::new(Arc::new(InMemoryDocumentStore::new()));
        let user = admin();
        for i in 0..7 {
            let written = log.record(format!("Uploaded media: {}.png", i), Some(&user)).await;
            assert!(matches!(written, SecondaryWrite::Written(_)));
        }

        let recent = log.recent(5).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].action, "Uploaded media: 6.png");
        assert_eq!(recent[0].user_id, user.uid);
        assert!(recent[0].timestamp >= recent[4].timestamp);
    }
}
