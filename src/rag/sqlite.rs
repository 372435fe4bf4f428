//! SQLite-backed document persistence.
//!
//! One row per document holds content, metadata and the embedding blob
//! together; a batch append is a single transaction.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::document::{Document, Metadata};
use super::persistence::DocumentPersistence;
use crate::core::errors::ResearchError;

pub struct SqliteDocumentPersistence {
    pool: SqlitePool,
}

impl SqliteDocumentPersistence {
    pub async fn with_path(db_path: PathBuf) -> Result<Self, ResearchError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(ResearchError::storage)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ResearchError::storage)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ResearchError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                content TEXT NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}',
                embedding BLOB NOT NULL,
                dimension INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ResearchError::storage)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS store_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ResearchError::storage)?;

        Ok(())
    }

    fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> Result<Document, ResearchError> {
        let id: String = row.try_get("id").map_err(ResearchError::storage)?;
        let content: String = row.try_get("content").map_err(ResearchError::storage)?;
        let metadata_str: String = row.try_get("metadata").map_err(ResearchError::storage)?;
        let blob: Vec<u8> = row.try_get("embedding").map_err(ResearchError::storage)?;
        let dimension: i64 = row.try_get("dimension").map_err(ResearchError::storage)?;

        if blob.len() != (dimension.max(0) as usize) * 4 {
            return Err(ResearchError::Storage(format!(
                "document '{}' has a corrupt embedding ({} bytes for dimension {})",
                id,
                blob.len(),
                dimension
            )));
        }

        let metadata = match serde_json::from_str::<Value>(&metadata_str) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Metadata::new(),
            Err(err) => {
                return Err(ResearchError::Storage(format!(
                    "document '{}' has unreadable metadata: {}",
                    id, err
                )))
            }
        };

        Ok(Document {
            id,
            content,
            metadata,
            embedding: deserialize_embedding(&blob),
        })
    }
}

#[async_trait]
impl DocumentPersistence for SqliteDocumentPersistence {
    async fn load_all(&self) -> Result<Vec<Document>, ResearchError> {
        let rows = sqlx::query(
            "SELECT id, content, metadata, embedding, dimension
             FROM documents
             ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ResearchError::storage)?;

        rows.iter().map(Self::row_to_document).collect()
    }

    async fn append(&self, documents: &[Document]) -> Result<(), ResearchError> {
        if documents.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(ResearchError::storage)?;

        for document in documents {
            let blob = serialize_embedding(&document.embedding);
            let metadata_str =
                serde_json::to_string(&document.metadata).map_err(ResearchError::storage)?;

            sqlx::query(
                "INSERT OR IGNORE INTO documents (id, content, metadata, embedding, dimension)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&document.id)
            .bind(&document.content)
            .bind(&metadata_str)
            .bind(&blob)
            .bind(document.embedding.len() as i64)
            .execute(&mut *tx)
            .await
            .map_err(ResearchError::storage)?;
        }

        sqlx::query(
            "INSERT OR IGNORE INTO store_meta (key, value)
             VALUES ('embedding_dimension', ?1)",
        )
        .bind(documents[0].embedding.len().to_string())
        .execute(&mut *tx)
        .await
        .map_err(ResearchError::storage)?;

        tx.commit().await.map_err(ResearchError::storage)?;
        Ok(())
    }

    async fn recorded_dimension(&self) -> Result<Option<usize>, ResearchError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM store_meta WHERE key = 'embedding_dimension'")
                .fetch_optional(&self.pool)
                .await
                .map_err(ResearchError::storage)?;

        match value {
            None => Ok(None),
            Some(raw) => raw.parse::<usize>().map(Some).map_err(|_| {
                ResearchError::Storage(format!("unreadable recorded dimension '{}'", raw))
            }),
        }
    }
}

fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_db_path() -> PathBuf {
        std::env::temp_dir().join(format!(
            "deep-researcher-sqlite-test-{}.db",
            uuid::Uuid::new_v4()
        ))
    }

    fn make_doc(id: &str, content: &str, embedding: Vec<f32>) -> Document {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), json!(format!("{id}.txt")));
        Document {
            id: id.to_string(),
            content: content.to_string(),
            metadata,
            embedding,
        }
    }

    #[tokio::test]
    async fn append_and_load_in_insertion_order() {
        let store = SqliteDocumentPersistence::with_path(test_db_path())
            .await
            .unwrap();

        store
            .append(&[
                make_doc("b", "second letter", vec![0.0, 1.0]),
                make_doc("a", "first letter", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();
        store
            .append(&[make_doc("c", "third", vec![0.5, 0.5])])
            .await
            .unwrap();

        let docs = store.load_all().await.unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(store.recorded_dimension().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn reload_is_bit_identical() {
        let path = test_db_path();
        let original = make_doc("x", "content", vec![0.1, -0.25, f32::MIN_POSITIVE, 3.5e7]);

        {
            let store = SqliteDocumentPersistence::with_path(path.clone())
                .await
                .unwrap();
            store.append(std::slice::from_ref(&original)).await.unwrap();
        }

        let reloaded = SqliteDocumentPersistence::with_path(path).await.unwrap();
        let docs = reloaded.load_all().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0], original);
        let bits: Vec<u32> = docs[0].embedding.iter().map(|f| f.to_bits()).collect();
        let expected: Vec<u32> = original.embedding.iter().map(|f| f.to_bits()).collect();
        assert_eq!(bits, expected);
    }

    #[tokio::test]
    async fn duplicate_id_keeps_first_row() {
        let store = SqliteDocumentPersistence::with_path(test_db_path())
            .await
            .unwrap();

        store
            .append(&[make_doc("dup", "first", vec![1.0])])
            .await
            .unwrap();
        store
            .append(&[make_doc("dup", "second", vec![2.0])])
            .await
            .unwrap();

        let docs = store.load_all().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "first");
    }

    #[tokio::test]
    async fn empty_append_is_a_no_op() {
        let store = SqliteDocumentPersistence::with_path(test_db_path())
            .await
            .unwrap();
        store.append(&[]).await.unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
        assert_eq!(store.recorded_dimension().await.unwrap(), None);
    }
}
