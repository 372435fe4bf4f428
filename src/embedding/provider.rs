use async_trait::async_trait;

use crate::core::errors::ResearchError;

/// Text-to-vector boundary.
///
/// Every vector produced by one embedder instance is expected to share the
/// same dimensionality; the document store enforces that.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// return the embedder name (e.g. "hashing", "openai")
    fn name(&self) -> &str;

    /// embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ResearchError>;

    /// embed several texts, one vector per input in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ResearchError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}
