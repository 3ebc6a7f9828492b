// Page save protocol - validate, timestamp and commit a page draft
// Update-mode commits race a client-side timer; create-mode commits are awaited

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::viewer::AuthenticatedUser;
use crate::models::{Page, PageStatus};
use crate::pages::repository::PageRepository;
use crate::services::activity_log::ActivityLog;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Draft ids that mean "not saved yet".
const NEW_PAGE_PLACEHOLDER: &str = "new";

/// Lower-case the title and turn whitespace runs into hyphens. Lossy, and
/// nothing checks the result against other pages.
pub fn derive_slug(title: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&title.to_lowercase(), "-")
        .into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    Create,
    Update,
}

/// What the caller gets to see of a save. `TimedOutStillPending` means the
/// write was issued but its result is unknown; it is not a success.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    Committed {
        id: String,
        status: PageStatus,
        slug: String,
        mode: SaveMode,
    },
    TimedOutStillPending {
        id: String,
        status: PageStatus,
    },
    Failed {
        message: String,
    },
}

impl SaveOutcome {
    /// User-facing notice text.
    pub fn notice(&self) -> String {
        match self {
            SaveOutcome::Committed { status, .. } => {
                let verb = match status {
                    PageStatus::Published => "published",
                    PageStatus::Draft => "saved",
                };
                format!("Page {} successfully", verb)
            }
            SaveOutcome::TimedOutStillPending { .. } => {
                "Saved offline. Will sync when online.".to_string()
            }
            SaveOutcome::Failed { message } => format!("Failed to save page: {}", message),
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, SaveOutcome::Committed { .. })
    }
}

/// The id a draft will be written back to, if it already has one.
pub fn edit_target(draft: &Page) -> Option<&str> {
    draft
        .id
        .as_deref()
        .filter(|id| !id.is_empty() && *id != NEW_PAGE_PLACEHOLDER)
}

pub struct PageSaveProtocol {
    repository: PageRepository,
    activity: ActivityLog,
    commit_timeout: Duration,
}

impl PageSaveProtocol {
    pub fn new(repository: PageRepository, activity: ActivityLog, commit_timeout: Duration) -> Self {
        Self {
            repository,
            activity,
            commit_timeout,
        }
    }

    pub fn repository(&self) -> &PageRepository {
        &self.repository
    }

    pub fn commit_timeout(&self) -> Duration {
        self.commit_timeout
    }

    /// Save `draft` with `target_status` (the draft's own status if `None`).
    ///
    /// Returns `Err(AppError::Validation)` without touching the store when
    /// the title is blank. Every other attempt makes exactly one primary
    /// commit and ends in one of the three [`SaveOutcome`]s. The draft is
    /// never modified.
    pub async fn save(
        &self,
        draft: &Page,
        target_status: Option<PageStatus>,
        actor: Option<&AuthenticatedUser>,
    ) -> AppResult<SaveOutcome> {
        if draft.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let status = target_status.unwrap_or(draft.status);
        let mut prepared = draft.clone();
        prepared.status = status;
        if prepared.slug.is_empty() {
            prepared.slug = derive_slug(&prepared.title);
        }
        info!("Saving page as {}", status);

        match edit_target(draft) {
            Some(id) => Ok(self.commit_update(id.to_string(), prepared).await),
            None => Ok(self.commit_create(prepared, actor).await),
        }
    }

    async fn commit_update(&self, id: String, prepared: Page) -> SaveOutcome {
        let status = prepared.status;
        let slug = prepared.slug.clone();

        // The write runs as its own task so it outlives the timer.
        let repository = self.repository.clone();
        let commit_id = id.clone();
        let commit = tokio::spawn(async move {
            let result = repository.upsert(&commit_id, &prepared).await;
            match &result {
                Ok(()) => debug!("Commit of page {} settled", commit_id),
                Err(e) => warn!("Commit of page {} failed: {}", commit_id, e),
            }
            result
        });

        match tokio::time::timeout(self.commit_timeout, commit).await {
            Ok(Ok(Ok(()))) => SaveOutcome::Committed {
                id,
                status,
                slug,
                mode: SaveMode::Update,
            },
            Ok(Ok(Err(e))) => {
                error!("Error saving page {}: {}", id, e);
                SaveOutcome::Failed {
                    message: e.to_string(),
                }
            }
            Ok(Err(join_error)) => {
                error!("Save task for page {} did not complete: {}", id, join_error);
                SaveOutcome::Failed {
                    message: join_error.to_string(),
                }
            }
            Err(_) => {
                info!(
                    "Save of page {} still pending after {:?}; reporting as queued",
                    id, self.commit_timeout
                );
                SaveOutcome::TimedOutStillPending { id, status }
            }
        }
    }

    async fn commit_create(&self, prepared: Page, actor: Option<&AuthenticatedUser>) -> SaveOutcome {
        let mut prepared = prepared;
        prepared.id = None;

        let id = match self.repository.create(&prepared).await {
            Ok(id) => id,
            Err(e) => {
                error!("Error creating page: {}", e);
                return SaveOutcome::Failed {
                    message: e.to_string(),
                };
            }
        };
        info!("Created page {}", id);

        // Best effort: the outcome is already decided.
        self.activity
            .record(format!("Created page: {}", prepared.title), actor)
            .await;

        SaveOutcome::Committed {
            id,
            status: prepared.status,
            slug: prepared.slug,
            mode: SaveMode::Create,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_slug() {
        assert_eq!(derive_slug("Hello World"), "hello-world");
        assert_eq!(derive_slug("Research  and\tTeaching"), "research-and-teaching");
        assert_eq!(derive_slug("Ph.D. Notes"), "ph.d.-notes");
    }

    #[test]
    fn test_edit_target_ignores_placeholders() {
        let mut page = Page::new("x");
        assert_eq!(edit_target(&page), None);
        page.id = Some("new".to_string());
        assert_eq!(edit_target(&page), None);
        page.id = Some(String::new());
        assert_eq!(edit_target(&page), None);
        page.id = Some("home".to_string());
        assert_eq!(edit_target(&page), Some("home"));
    }

    #[test]
    fn test_notices() {
        let committed = SaveOutcome::Committed {
            id: "home".to_string(),
            status: PageStatus::Published,
            slug: "home".to_string(),
            mode: SaveMode::Update,
        };
        assert_eq!(committed.notice(), "Page published successfully");

        let pending = SaveOutcome::TimedOutStillPending {
            id: "home".to_string(),
            status: PageStatus::Draft,
        };
        assert!(!pending.is_committed());
        assert_eq!(pending.notice(), "Saved offline. Will sync when online.");

        let failed = SaveOutcome::Failed {
            message: "quota exceeded".to_string(),
        };
        assert_eq!(failed.notice(), "Failed to save page: quota exceeded");
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let value = serde_json::to_value(SaveOutcome::TimedOutStillPending {
            id: "home".to_string(),
            status: PageStatus::Draft,
        })
        .unwrap();
        assert_eq!(value["outcome"], "timed_out_still_pending");
        assert_eq!(value["status"], "draft");
    }
}
