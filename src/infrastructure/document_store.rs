// Document Store Interface - collections of JSON documents keyed by id
// Backends resolve server timestamps and assign ids for created documents

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::AppResult;

/// A stored document snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

/// A full-document write. Fields named in `server_timestamps` are stamped by
/// the store at write time, replacing whatever the client sent for them.
#[derive(Debug, Clone, Default)]
pub struct DocumentWrite {
    pub fields: Map<String, Value>,
    pub server_timestamps: Vec<String>,
}

impl DocumentWrite {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            server_timestamps: Vec::new(),
        }
    }

    pub fn with_server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.server_timestamps.push(field.into());
        self
    }

    /// Resolve the timestamp markers against the store's clock.
    pub fn resolve(self) -> Map<String, Value> {
        let DocumentWrite {
            mut fields,
            server_timestamps,
        } = self;
        if !server_timestamps.is_empty() {
            let now = Value::String(server_timestamp());
            for field in server_timestamps {
                fields.insert(field, now.clone());
            }
        }
        fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Collection query: optional equality filter, ordering and limit.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub filter: Option<(String, Value)>,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<usize>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match &self.filter {
            Some((field, value)) => doc.data.get(field) == Some(value),
            None => true,
        }
    }
}

/// Timestamps are fixed-width RFC 3339 strings so they order lexicographically.
pub fn server_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Document store trait. Writes are last-write-wins per document; there is
/// no version check and no cross-document ordering.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>>;
    async fn list(&self, collection: &str) -> AppResult<Vec<Document>>;
    async fn query(&self, collection: &str, query: DocumentQuery) -> AppResult<Vec<Document>>;
    /// Create a document under a store-assigned id.
    async fn create(&self, collection: &str, write: DocumentWrite) -> AppResult<String>;
    /// Replace (or create) the document at `id`.
    async fn set(&self, collection: &str, id: &str, write: DocumentWrite) -> AppResult<()>;
    async fn delete(&self, collection: &str, id: &str) -> AppResult<bool>;

    /// Health probe for the `/api/health` endpoint.
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_stamps_marked_fields() {
        let mut fields = Map::new();
        fields.insert("title".to_string(), json!("Teaching"));
        fields.insert("updatedAt".to_string(), json!("client clock"));

        let resolved = DocumentWrite::new(fields)
            .with_server_timestamp("updatedAt")
            .with_server_timestamp("createdAt")
            .resolve();

        assert_eq!(resolved["title"], json!("Teaching"));
        assert_ne!(resolved["updatedAt"], json!("client clock"));
        assert_eq!(resolved["updatedAt"], resolved["createdAt"]);
    }

    #[test]
    fn test_query_filter_matches_exact_value() {
        let doc = Document {
            id: "home".to_string(),
            data: json!({"slug": "home"}).as_object().cloned().unwrap(),
        };
        assert!(DocumentQuery::new().where_eq("slug", "home").matches(&doc));
        assert!(!DocumentQuery::new().where_eq("slug", "Home").matches(&doc));
        assert!(DocumentQuery::new().matches(&doc));
    }
}
