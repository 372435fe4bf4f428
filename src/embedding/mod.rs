//! Embedding boundary.
//!
//! - `Embedder`: the trait the store and the research pipeline consume
//! - `HashingEmbedder`: offline feature-hashing embedder (default)
//! - `OpenAiEmbedder`: OpenAI-compatible HTTP embedding endpoint

mod hashing;
mod openai;
mod provider;

use std::sync::Arc;

pub use hashing::HashingEmbedder;
pub use openai::OpenAiEmbedder;
pub use provider::Embedder;

use crate::core::config::{EmbeddingProviderKind, ResearchSettings};
use crate::core::errors::ResearchError;

/// Builds the embedder selected in the configuration.
pub fn build_embedder(settings: &ResearchSettings) -> Result<Arc<dyn Embedder>, ResearchError> {
    match settings.embedding_provider {
        EmbeddingProviderKind::Hashing => {
            Ok(Arc::new(HashingEmbedder::new(settings.embedding_dimension)?))
        }
        EmbeddingProviderKind::OpenAi => Ok(Arc::new(OpenAiEmbedder::new(
            &settings.embedding_base_url,
            &settings.embedding_model,
            settings.embedding_timeout_secs,
        )?)),
    }
}
