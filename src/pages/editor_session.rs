use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::viewer::AuthenticatedUser;
use crate::models::{BlockField, BlockType, Page, PageStatus};
use crate::pages::save_protocol::{PageSaveProtocol, SaveMode, SaveOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Loading,
    Editing,
    Saving,
    /// Terminal: the page could not be loaded.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved,
    Published,
    SavedOffline,
    Failed(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Saved => "Page saved successfully".to_string(),
            Notice::Published => "Page published successfully".to_string(),
            Notice::SavedOffline => "Saved offline. Will sync when online.".to_string(),
            Notice::Failed(message) => format!("Failed to save page: {}", message),
        }
    }
}

/// One page-editing session. Owns the draft; block edits and field edits are
/// staged here until `save` commits them.
pub struct EditorSession {
    protocol: Arc<PageSaveProtocol>,
    actor: Option<AuthenticatedUser>,
    draft: Page,
    state: EditorState,
    notice: Option<Notice>,
}

impl EditorSession {
    /// Start editing a page that does not exist yet.
    pub fn open_new(protocol: Arc<PageSaveProtocol>, actor: Option<AuthenticatedUser>) -> Self {
        Self {
            protocol,
            actor,
            draft: Page::default(),
            state: EditorState::Editing,
            notice: None,
        }
    }

    /// Load `id` into a new session; ends in `Editing` or `NotFound`.
    pub async fn open(
        protocol: Arc<PageSaveProtocol>,
        actor: Option<AuthenticatedUser>,
        id: &str,
    ) -> Self {
        let mut session = Self {
            protocol,
            actor,
            draft: Page::default(),
            state: EditorState::Loading,
            notice: None,
        };
        session.load(id).await;
        session
    }

    async fn load(&mut self, id: &str) {
        self.state = EditorState::Loading;
        self.state = match self.fetch(id).await {
            Some(page) => {
                self.draft = page;
                EditorState::Editing
            }
            None => EditorState::NotFound,
        };
    }

    async fn fetch(&self, id: &str) -> Option<Page> {
        match self.protocol.repository().get(id).await {
            Ok(Some(page)) => Some(page),
            Ok(None) => {
                warn!("Page {} not found", id);
                None
            }
            Err(e) => {
                warn!("Failed to load page {}: {}", id, e);
                None
            }
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn page_id(&self) -> Option<&str> {
        self.draft.id.as_deref()
    }

    pub fn draft(&self) -> &Page {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Page {
        &mut self.draft
    }

    pub fn add_block(&mut self, block_type: BlockType) -> String {
        self.draft.add_block(block_type)
    }

    pub fn update_block(&mut self, id: &str, field: BlockField, value: impl Into<String>) -> bool {
        self.draft.update_block(id, field, value)
    }

    pub fn delete_block(&mut self, id: &str) -> bool {
        self.draft.delete_block(id)
    }

    /// Run the save protocol on the current draft.
    ///
    /// A committed create re-opens the session at the new id, falling back to
    /// the written draft if it cannot be read back. A queued or
    /// failed save leaves the draft exactly as it was.
    pub async fn save(&mut self, target_status: Option<PageStatus>) -> AppResult<SaveOutcome> {
        if self.state == EditorState::NotFound {
            return Err(AppError::NotFound("Page not found".to_string()));
        }

        self.state = EditorState::Saving;
        let result = self
            .protocol
            .save(&self.draft, target_status, self.actor.as_ref())
            .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = EditorState::Editing;
                self.notice = Some(Notice::Failed(e.to_string()));
                return Err(e);
            }
        };

        match &outcome {
            SaveOutcome::Committed {
                id,
                status,
                slug,
                mode,
            } => {
                match mode {
                    SaveMode::Update => {
                        self.draft.status = *status;
                        self.draft.slug = slug.clone();
                        self.state = EditorState::Editing;
                    }
                    SaveMode::Create => {
                        info!("Opening new page {}", id);
                        // The page exists either way; without a fresh copy keep
                        // editing the draft that was written.
                        match self.fetch(id).await {
                            Some(page) => self.draft = page,
                            None => {
                                self.draft.id = Some(id.clone());
                                self.draft.status = *status;
                                self.draft.slug = slug.clone();
                            }
                        }
                        self.state = EditorState::Editing;
                    }
                }
                self.notice = Some(match status {
                    PageStatus::Published => Notice::Published,
                    PageStatus::Draft => Notice::Saved,
                });
            }
            SaveOutcome::TimedOutStillPending { .. } => {
                self.state = EditorState::Editing;
                self.notice = Some(Notice::SavedOffline);
            }
            SaveOutcome::Failed { message } => {
                self.state = EditorState::Editing;
                self.notice = Some(Notice::Failed(message.clone()));
            }
        }
        Ok(outcome)
    }
}
