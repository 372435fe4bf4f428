use thiserror::Error;

use crate::core::errors::ResearchError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] ResearchError),

    #[error("Failed to initialize embedder: {0}")]
    Embedder(#[source] ResearchError),

    #[error("Failed to open document store: {0}")]
    Store(#[source] ResearchError),
}
