use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row};
use std::str::FromStr;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::infrastructure::document_store::{
    Document, DocumentQuery, DocumentStore, DocumentWrite, SortDirection,
};
use crate::infrastructure::id_generator::generate_document_id;

/// SQLite implementation of the document store
/// Every collection shares one table; document bodies are JSON text and
/// field filters/ordering go through SQLite's `json_extract`.
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub async fn connect(url: &str) -> AppResult<Self> {
        let in_memory = url.contains(":memory:");
        if !in_memory {
            ensure_parent_dir(url)?;
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::ConfigurationError(format!("Invalid database URL {}: {}", url, e)))?
            .create_if_missing(true);

        // Each in-memory connection would see its own empty database, and
        // recycling the only connection drops the data with it.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to {}: {}", url, e)))?;

        let store = Self { pool };
        store.initialize().await?;
        info!("Document store ready at {}", url);
        Ok(store)
    }

    pub async fn new_in_memory() -> AppResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Create the documents table if it does not exist yet.
    pub async fn initialize(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                seq INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create documents table: {}", e)))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_collection_seq ON documents(collection, seq)")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to create documents index: {}", e))
            })?;

        Ok(())
    }

    async fn write(&self, collection: &str, id: &str, write: DocumentWrite) -> AppResult<()> {
        let body = serde_json::to_string(&Value::Object(write.resolve()))?;
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, seq)
            VALUES (?, ?, ?, (SELECT COALESCE(MAX(seq), 0) + 1 FROM documents))
            ON CONFLICT (collection, id) DO UPDATE SET data = excluded.data, seq = excluded.seq
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to write {}/{}: {}", collection, id, e))
        })?;
        Ok(())
    }
}

fn ensure_parent_dir(url: &str) -> AppResult<()> {
    let path = url
        .trim_start_matches("sqlite:")
        .trim_start_matches("//")
        .split('?')
        .next()
        .unwrap_or_default();
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::ConfigurationError(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', ""))
}

fn row_to_document(row: SqliteRow) -> AppResult<Document> {
    let id: String = row.get("id");
    let body: String = row.get("data");
    let data = match serde_json::from_str::<Value>(&body)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Ok(Document { id, data })
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to get {}/{}: {}", collection, id, e))
            })?;

        row.map(row_to_document).transpose()
    }

    async fn list(&self, collection: &str) -> AppResult<Vec<Document>> {
        self.query(collection, DocumentQuery::new()).await
    }

    async fn query(&self, collection: &str, query: DocumentQuery) -> AppResult<Vec<Document>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id, data FROM documents WHERE collection = ");
        qb.push_bind(collection.to_string());

        if let Some((field, value)) = query.filter {
            qb.push(" AND json_extract(data, ");
            qb.push_bind(json_path(&field));
            qb.push(")");
            match value {
                Value::Null => {
                    qb.push(" IS NULL");
                }
                Value::Bool(flag) => {
                    qb.push(" = ");
                    qb.push_bind(flag as i64);
                }
                Value::Number(number) => {
                    qb.push(" = ");
                    match number.as_i64() {
                        Some(int) => qb.push_bind(int),
                        None => qb.push_bind(number.as_f64().unwrap_or_default()),
                    };
                }
                Value::String(text) => {
                    qb.push(" = ");
                    qb.push_bind(text);
                }
                nested => {
                    qb.push(" = ");
                    qb.push_bind(nested.to_string());
                }
            }
        }

        match query.order_by {
            Some((field, direction)) => {
                let dir = match direction {
                    SortDirection::Ascending => "ASC",
                    SortDirection::Descending => "DESC",
                };
                qb.push(" ORDER BY json_extract(data, ");
                qb.push_bind(json_path(&field));
                qb.push(format!(") {dir}, seq {dir}"));
            }
            None => {
                qb.push(" ORDER BY seq");
            }
        }

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit as i64);
        }

        let rows = qb.build().fetch_all(&self.pool).await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to query {}: {}", collection, e))
        })?;

        rows.into_iter().map(row_to_document).collect()
    }

    async fn create(&self, collection: &str, write: DocumentWrite) -> AppResult<String> {
        let id = generate_document_id();
        self.write(collection, &id, write).await?;
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, write: DocumentWrite) -> AppResult<()> {
        self.write(collection, id, write).await
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to delete {}/{}: {}", collection, id, e))
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {}", e)))?;
        Ok(())
    }
}
