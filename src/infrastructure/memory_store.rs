use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::infrastructure::document_store::{
    Document, DocumentQuery, DocumentStore, DocumentWrite, SortDirection,
};
use crate::infrastructure::id_generator::generate_document_id;

#[derive(Debug, Default)]
struct StoredEntry {
    /// Insertion sequence, used as the tie-breaker when ordering.
    seq: u64,
    data: Map<String, Value>,
}

/// In-process document store for tests and `DATABASE_URL=memory`.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, HashMap<String, StoredEntry>>>,
    next_seq: std::sync::atomic::AtomicU64,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn seq(&self) -> u64 {
        self.next_seq
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }

    async fn snapshot(&self, collection: &str) -> Vec<(u64, Document)> {
        let collections = self.collections.read().await;
        let mut docs: Vec<(u64, Document)> = collections
            .get(collection)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(id, entry)| {
                        (
                            entry.seq,
                            Document {
                                id: id.clone(),
                                data: entry.data.clone(),
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        docs.sort_by_key(|(seq, _)| *seq);
        docs
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|entries| entries.get(id))
            .map(|entry| Document {
                id: id.to_string(),
                data: entry.data.clone(),
            }))
    }

    async fn list(&self, collection: &str) -> AppResult<Vec<Document>> {
        Ok(self
            .snapshot(collection)
            .await
            .into_iter()
            .map(|(_, doc)| doc)
            .collect())
    }

    async fn query(&self, collection: &str, query: DocumentQuery) -> AppResult<Vec<Document>> {
        let mut docs: Vec<(u64, Document)> = self
            .snapshot(collection)
            .await
            .into_iter()
            .filter(|(_, doc)| query.matches(doc))
            .collect();

        if let Some((field, direction)) = &query.order_by {
            docs.sort_by(|(seq_a, a), (seq_b, b)| {
                let ordering = compare_values(a.data.get(field), b.data.get(field))
                    .then(seq_a.cmp(seq_b));
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(docs.into_iter().take(limit).map(|(_, doc)| doc).collect())
    }

    async fn create(&self, collection: &str, write: DocumentWrite) -> AppResult<String> {
        let id = generate_document_id();
        let entry = StoredEntry {
            seq: self.seq(),
            data: write.resolve(),
        };
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), entry);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, write: DocumentWrite) -> AppResult<()> {
        let entry = StoredEntry {
            seq: self.seq(),
            data: write.resolve(),
        };
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .map(|entries| entries.remove(id).is_some())
            .unwrap_or(false))
    }
}
