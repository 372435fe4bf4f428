//! Local feature-hashing embedder.
//!
//! Each lowercase word token is hashed with SHA-256; the digest picks a
//! bucket and a sign, and the bucket accumulates the signed count. The
//! result is L2-normalized, so texts sharing vocabulary score close under
//! cosine similarity. Works offline and is fully deterministic.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::provider::Embedder;
use crate::core::errors::ResearchError;
use crate::vector_math::l2_normalize;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self, ResearchError> {
        if dimension == 0 {
            return Err(ResearchError::Config(
                "hashing embedder dimension must be at least 1".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Synchronous core of `embed`; text without any word token maps to the
    /// zero vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut out = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let raw = u64::from_le_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6],
                digest[7],
            ]);
            let bucket = (raw % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            out[bucket] += sign;
        }
        l2_normalize(&mut out);
        out
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ResearchError> {
        Ok(self.embed_text(text))
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    let re = TOKEN_RE.get_or_init(|| Regex::new(r"\w+").expect("static token regex"));
    re.find_iter(text).map(|m| m.as_str().to_lowercase())
}
