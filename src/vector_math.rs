use std::cmp::Ordering;

use crate::core::errors::ResearchError;

/// Cosine similarity in `[-1, 1]`.
///
/// A zero-norm vector on either side scores 0. Vectors of different lengths
/// are a `DimensionMismatch`, never truncated or padded.
pub fn cosine_similarity(query: &[f32], candidate: &[f32]) -> Result<f32, ResearchError> {
    if query.len() != candidate.len() {
        return Err(ResearchError::DimensionMismatch {
            expected: candidate.len(),
            actual: query.len(),
        });
    }

    let dot: f64 = query
        .iter()
        .zip(candidate.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let query_norm = l2_norm(query);
    let candidate_norm = l2_norm(candidate);
    let denom = query_norm * candidate_norm;
    if denom <= f64::EPSILON {
        return Ok(0.0);
    }

    Ok((dot / denom).clamp(-1.0, 1.0) as f32)
}

/// Scores every candidate and orders them by descending similarity.
///
/// The sort is stable: equal scores keep candidate order.
pub fn rank_descending_by_cosine(
    query: &[f32],
    candidates: &[&[f32]],
) -> Result<Vec<(usize, f32)>, ResearchError> {
    let mut scores = Vec::with_capacity(candidates.len());
    for (idx, candidate) in candidates.iter().enumerate() {
        let score = cosine_similarity(query, candidate)?;
        scores.push((idx, score));
    }

    scores.sort_by(|left, right| right.1.partial_cmp(&left.1).unwrap_or(Ordering::Equal));
    Ok(scores)
}

pub fn l2_norm(vector: &[f32]) -> f64 {
    vector
        .iter()
        .map(|x| (*x as f64).powi(2))
        .sum::<f64>()
        .sqrt()
}

pub fn l2_normalize(vector: &mut [f32]) {
    let norm = l2_norm(vector);
    if norm <= f64::EPSILON {
        return;
    }
    for value in vector.iter_mut() {
        *value = (*value as f64 / norm) as f32;
    }
}

/// Rejects embedder output that cannot be ranked: empty or non-finite.
pub fn validate_embedding(vector: &[f32]) -> Result<(), ResearchError> {
    if vector.is_empty() {
        return Err(ResearchError::Embedding(
            "embedder returned an empty vector".to_string(),
        ));
    }
    if let Some(idx) = vector.iter().position(|v| !v.is_finite()) {
        return Err(ResearchError::Embedding(format!(
            "embedder returned a non-finite value at index {}",
            idx
        )));
    }
    Ok(())
}
