//! Durable backing for the document store.
//!
//! The primary implementation is `SqliteDocumentPersistence` in the `sqlite`
//! module.

use async_trait::async_trait;

use super::document::Document;
use crate::core::errors::ResearchError;

/// Abstract durable representation of the document store.
///
/// Implementations must:
/// - return documents in insertion order from `load_all`
/// - persist one `append` call atomically (all documents or none)
/// - keep content and embedding of a document together, so a reload never
///   yields one without the other
#[async_trait]
pub trait DocumentPersistence: Send + Sync {
    /// Load every persisted document, oldest first.
    async fn load_all(&self) -> Result<Vec<Document>, ResearchError>;

    /// Append a batch of new documents in one transaction.
    async fn append(&self, documents: &[Document]) -> Result<(), ResearchError>;

    /// Embedding dimension recorded with the first stored batch, when the
    /// backend keeps one.
    async fn recorded_dimension(&self) -> Result<Option<usize>, ResearchError> {
        Ok(None)
    }
}
