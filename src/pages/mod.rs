// Pages - repository, block model, save protocol and editing sessions

pub mod blocks;
pub mod editor_session;
pub mod preview;
pub mod repository;
pub mod save_protocol;

pub use editor_session::{EditorSession, EditorState, Notice};
pub use preview::render_preview;
pub use repository::PageRepository;
pub use save_protocol::{derive_slug, PageSaveProtocol, SaveMode, SaveOutcome};
