// Content Hub document models - everything persisted is a document in a collection

pub mod activity;
pub mod media;
pub mod page;

pub use activity::ActivityLogEntry;
pub use media::MediaItem;
pub use page::{Block, BlockField, BlockType, Page, PageStatus};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::infrastructure::document_store::Document;

/// A model stored as one document of a fixed collection.
///
/// The document id lives outside the stored fields: it is injected as `id`
/// when reading and stripped again when writing.
pub trait StoredDocument: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn from_document(doc: Document) -> AppResult<Self> {
        let Document { id, mut data } = doc;
        data.insert("id".to_string(), Value::String(id.clone()));
        serde_json::from_value(Value::Object(data)).map_err(|e| {
            AppError::SerializationError(format!(
                "Malformed {} document {}: {}",
                Self::COLLECTION,
                id,
                e
            ))
        })
    }

    fn to_fields(&self) -> AppResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(mut fields) => {
                fields.remove("id");
                Ok(fields)
            }
            other => Err(AppError::SerializationError(format!(
                "{} must serialize to an object, got {}",
                Self::COLLECTION,
                other
            ))),
        }
    }
}
