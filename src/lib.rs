//! Deep Researcher: embedding-indexed document retrieval with query
//! decomposition and extractive answer synthesis.

pub mod core;
pub mod embedding;
pub mod export;
pub mod rag;
pub mod research;
pub mod server;
pub mod state;
pub mod vector_math;
