//! Append-only, durable document and embedding store.
//!
//! Writers are serialized through a write gate. Readers clone the current
//! `Arc<StoreSnapshot>` and always see a complete pre- or post-addition
//! state; a new snapshot is published only after the batch is persisted.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use super::document::{Document, NewDocument};
use super::persistence::DocumentPersistence;
use crate::core::errors::ResearchError;
use crate::embedding::Embedder;
use crate::vector_math::validate_embedding;

/// Immutable, consistent view of the store.
#[derive(Debug, Default)]
pub struct StoreSnapshot {
    documents: Vec<Arc<Document>>,
    positions: HashMap<String, usize>,
    dimension: Option<usize>,
}

impl StoreSnapshot {
    fn from_documents(documents: Vec<Arc<Document>>) -> Result<Self, ResearchError> {
        let mut snapshot = StoreSnapshot::default();
        for document in documents {
            if snapshot.positions.contains_key(&document.id) {
                tracing::warn!("Ignoring duplicate persisted document '{}'", document.id);
                continue;
            }
            snapshot.check_dimension(document.embedding.len())?;
            snapshot.push(document);
        }
        Ok(snapshot)
    }

    fn check_dimension(&self, actual: usize) -> Result<(), ResearchError> {
        match self.dimension {
            Some(expected) if expected != actual => {
                Err(ResearchError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }

    fn push(&mut self, document: Arc<Document>) {
        if self.dimension.is_none() {
            self.dimension = Some(document.embedding.len());
        }
        self.positions
            .insert(document.id.clone(), self.documents.len());
        self.documents.push(document);
    }

    /// Documents in insertion order.
    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Embedding dimension established by the first stored document.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Document>> {
        self.positions.get(id).map(|idx| &self.documents[*idx])
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedDocument {
    pub id: String,
    pub error: String,
}

/// Outcome of one `DocumentStore::add` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddReport {
    pub added: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<FailedDocument>,
}

pub struct DocumentStore {
    persistence: Arc<dyn DocumentPersistence>,
    current: RwLock<Arc<StoreSnapshot>>,
    write_gate: Mutex<()>,
}

impl DocumentStore {
    /// Opens the store, loading everything already persisted.
    pub async fn open(persistence: Arc<dyn DocumentPersistence>) -> Result<Self, ResearchError> {
        let documents = persistence
            .load_all()
            .await?
            .into_iter()
            .map(Arc::new)
            .collect();
        let snapshot = StoreSnapshot::from_documents(documents)?;

        let recorded = persistence.recorded_dimension().await?;
        if let (Some(recorded), Some(actual)) = (recorded, snapshot.dimension()) {
            if recorded != actual {
                return Err(ResearchError::Storage(format!(
                    "stored embeddings have dimension {} but the store records {}",
                    actual, recorded
                )));
            }
        }

        tracing::info!(
            "Document store loaded: {} documents, dimension {:?}",
            snapshot.len(),
            snapshot.dimension()
        );

        Ok(Self {
            persistence,
            current: RwLock::new(Arc::new(snapshot)),
            write_gate: Mutex::new(()),
        })
    }

    /// The current consistent view of the store.
    pub async fn snapshot(&self) -> Arc<StoreSnapshot> {
        self.current.read().await.clone()
    }

    /// All documents in insertion order.
    pub async fn all(&self) -> Vec<Arc<Document>> {
        self.snapshot().await.documents().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.snapshot().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshot().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Document>> {
        self.snapshot().await.get(id).cloned()
    }

    /// Embeds and appends every document whose id is not stored yet.
    ///
    /// Known ids and repeats of an id already staged in this batch are
    /// skipped. A failed embedding only drops that document, so a later copy
    /// of the same id in the batch can still be added. A dimension mismatch
    /// or a persistence failure aborts the whole call and leaves the store
    /// untouched.
    pub async fn add(
        &self,
        documents: Vec<NewDocument>,
        embedder: &dyn Embedder,
    ) -> Result<AddReport, ResearchError> {
        let _gate = self.write_gate.lock().await;
        let base = self.snapshot().await;

        let mut report = AddReport::default();
        let mut pending = Vec::new();
        for document in documents {
            if base.contains(&document.id) {
                tracing::debug!("Skipping already known document '{}'", document.id);
                report.skipped.push(document.id);
                continue;
            }
            pending.push(document);
        }

        if pending.is_empty() {
            return Ok(report);
        }

        let embeddings = embed_all(embedder, &pending).await;

        let mut dimension = base.dimension();
        let mut staged_ids = HashSet::new();
        let mut staged = Vec::with_capacity(pending.len());
        for (document, embedding) in pending.into_iter().zip(embeddings) {
            if staged_ids.contains(&document.id) {
                tracing::debug!("Skipping repeated document '{}' in batch", document.id);
                report.skipped.push(document.id);
                continue;
            }

            let embedding = match embedding {
                Ok(embedding) => embedding,
                Err(err) => {
                    tracing::warn!("Failed to embed document '{}': {}", document.id, err);
                    report.failed.push(FailedDocument {
                        id: document.id,
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            match dimension {
                Some(expected) if expected != embedding.len() => {
                    return Err(ResearchError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    });
                }
                None => dimension = Some(embedding.len()),
                _ => {}
            }

            staged_ids.insert(document.id.clone());
            staged.push(Document {
                id: document.id,
                content: document.content,
                metadata: document.metadata,
                embedding,
            });
        }

        if staged.is_empty() {
            return Ok(report);
        }

        self.persistence.append(&staged).await?;

        let mut next = StoreSnapshot {
            documents: base.documents.clone(),
            positions: base.positions.clone(),
            dimension: base.dimension,
        };
        for document in staged {
            report.added.push(document.id.clone());
            next.push(Arc::new(document));
        }
        *self.current.write().await = Arc::new(next);

        tracing::info!(
            "Added {} documents ({} skipped, {} failed)",
            report.added.len(),
            report.skipped.len(),
            report.failed.len()
        );

        Ok(report)
    }
}

/// One result per document, in order. The batch call is tried first; if it
/// fails as a whole, documents are embedded one by one so a single bad input
/// only fails itself.
async fn embed_all(
    embedder: &dyn Embedder,
    documents: &[NewDocument],
) -> Vec<Result<Vec<f32>, ResearchError>> {
    let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();

    match embedder.embed_batch(&texts).await {
        Ok(vectors) if vectors.len() == texts.len() => {
            return vectors
                .into_iter()
                .map(|vector| validate_embedding(&vector).map(|_| vector))
                .collect();
        }
        Ok(vectors) => tracing::warn!(
            "Embedder '{}' returned {} vectors for {} texts; retrying one by one",
            embedder.name(),
            vectors.len(),
            texts.len()
        ),
        Err(err) => tracing::warn!(
            "Batch embedding with '{}' failed ({}); retrying one by one",
            embedder.name(),
            err
        ),
    }

    let mut results = Vec::with_capacity(texts.len());
    for text in &texts {
        let result = embedder
            .embed(text)
            .await
            .and_then(|vector| validate_embedding(&vector).map(|_| vector));
        results.push(result);
    }
    results
}
