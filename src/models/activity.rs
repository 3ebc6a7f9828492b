use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StoredDocument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub action: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl StoredDocument for ActivityLogEntry {
    const COLLECTION: &'static str = "activity_logs";
}
