//! Exact cosine-similarity ranking over a store snapshot.

use std::sync::Arc;

use serde::Serialize;

use super::store::{DocumentStore, StoreSnapshot};
use crate::core::errors::ResearchError;
use crate::vector_math::rank_descending_by_cosine;

/// A scored document; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub id: String,
    pub content: String,
    pub score: f32,
}

/// Ranks stored documents against a query vector with a linear scan.
///
/// Results are sorted by descending score; equal scores keep the store's
/// insertion order.
#[derive(Clone)]
pub struct SimilarityIndex {
    store: Arc<DocumentStore>,
}

impl SimilarityIndex {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Top `min(k, N)` documents for `query`.
    pub async fn rank(&self, query: &[f32], k: usize) -> Result<Vec<SimilarityResult>, ResearchError> {
        let snapshot = self.store.snapshot().await;
        Self::rank_snapshot(&snapshot, query, k)
    }

    /// Every stored document, scored and ordered.
    pub async fn rank_all(&self, query: &[f32]) -> Result<Vec<SimilarityResult>, ResearchError> {
        let snapshot = self.store.snapshot().await;
        Self::rank_all_snapshot(&snapshot, query)
    }

    pub fn rank_snapshot(
        snapshot: &StoreSnapshot,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<SimilarityResult>, ResearchError> {
        let mut ranked = Self::rank_all_snapshot(snapshot, query)?;
        ranked.truncate(k);
        Ok(ranked)
    }

    pub fn rank_all_snapshot(
        snapshot: &StoreSnapshot,
        query: &[f32],
    ) -> Result<Vec<SimilarityResult>, ResearchError> {
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(expected) = snapshot.dimension() {
            if expected != query.len() {
                return Err(ResearchError::DimensionMismatch {
                    expected,
                    actual: query.len(),
                });
            }
        }

        let documents = snapshot.documents();
        let candidates: Vec<&[f32]> = documents.iter().map(|d| d.embedding.as_slice()).collect();
        let ranked = rank_descending_by_cosine(query, &candidates)?;

        tracing::debug!("Ranked {} documents", ranked.len());

        Ok(ranked
            .into_iter()
            .map(|(idx, score)| SimilarityResult {
                id: documents[idx].id.clone(),
                content: documents[idx].content.clone(),
                score,
            })
            .collect())
    }
}
