//! Document storage and retrieval.
//!
//! This module provides:
//! - `DocumentStore`: append-only store with snapshot reads
//! - `SqliteDocumentPersistence`: durable SQLite backing
//! - `SimilarityIndex`: exact cosine ranking over a snapshot

mod document;
mod persistence;
mod similarity;
mod sqlite;
mod store;

pub use document::{derive_document_id, Document, DocumentInput, Metadata, NewDocument};
pub use persistence::DocumentPersistence;
pub use similarity::{SimilarityIndex, SimilarityResult};
pub use sqlite::SqliteDocumentPersistence;
pub use store::{AddReport, DocumentStore, FailedDocument, StoreSnapshot};
