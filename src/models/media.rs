use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StoredDocument;

/// Index record for one uploaded file in the `media` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
    /// Blob store key; older records may lack one.
    #[serde(default)]
    pub storage_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub uploaded_by: String,
}

impl StoredDocument for MediaItem {
    const COLLECTION: &'static str = "media";
}

impl MediaItem {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}
