pub mod activity_log;
pub mod dashboard;
pub mod media_library;

pub use activity_log::{ActivityLog, SecondaryWrite};
pub use dashboard::{collect_stats, DashboardStats};
pub use media_library::{format_file_size, MediaLibrary, MediaUpload};
