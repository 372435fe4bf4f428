//! Typed view over the YAML configuration.
//!
//! Values are read leniently from the already validated `serde_json::Value`
//! and clamped into their supported ranges; anything missing falls back to
//! the defaults below.

use serde::Serialize;
use serde_json::Value;

use crate::research::SummaryOrder;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_PREVIEW_CHARS: usize = 120;
pub const DEFAULT_MAX_SENTENCES: usize = 5;
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    Hashing,
    OpenAi,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchSettings {
    pub host: String,
    pub port: u16,
    pub embedding_provider: EmbeddingProviderKind,
    pub embedding_dimension: usize,
    pub embedding_base_url: String,
    pub embedding_model: String,
    pub embedding_timeout_secs: u64,
    pub top_k: usize,
    pub preview_chars: usize,
    pub max_sentences: usize,
    pub summary_order: SummaryOrder,
    pub db_file: String,
    pub export_dir: Option<String>,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
            embedding_provider: EmbeddingProviderKind::Hashing,
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            embedding_base_url: "http://127.0.0.1:1234".to_string(),
            embedding_model: "text-embedding-all-minilm-l6-v2".to_string(),
            embedding_timeout_secs: 30,
            top_k: DEFAULT_TOP_K,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            max_sentences: DEFAULT_MAX_SENTENCES,
            summary_order: SummaryOrder::Score,
            db_file: "research.db".to_string(),
            export_dir: None,
        }
    }
}

impl ResearchSettings {
    pub fn from_value(config: &Value) -> Self {
        let defaults = Self::default();

        let embedding_provider = match str_at(config, "embedding", "provider") {
            Some("openai") => EmbeddingProviderKind::OpenAi,
            _ => EmbeddingProviderKind::Hashing,
        };

        let summary_order = match str_at(config, "summarizer", "order") {
            Some("document") => SummaryOrder::Document,
            _ => SummaryOrder::Score,
        };

        Self {
            host: str_at(config, "server", "host")
                .map(str::to_string)
                .unwrap_or(defaults.host),
            port: u64_at(config, "server", "port")
                .map(|port| port.min(u16::MAX as u64) as u16)
                .unwrap_or(defaults.port),
            embedding_provider,
            embedding_dimension: u64_at(config, "embedding", "dimension")
                .map(|v| v.clamp(1, 65_536) as usize)
                .unwrap_or(defaults.embedding_dimension),
            embedding_base_url: str_at(config, "embedding", "base_url")
                .map(str::to_string)
                .unwrap_or(defaults.embedding_base_url),
            embedding_model: str_at(config, "embedding", "model")
                .map(str::to_string)
                .unwrap_or(defaults.embedding_model),
            embedding_timeout_secs: u64_at(config, "embedding", "timeout_secs")
                .map(|v| v.clamp(1, 3_600))
                .unwrap_or(defaults.embedding_timeout_secs),
            top_k: u64_at(config, "research", "top_k")
                .map(|v| v.clamp(1, 1_000) as usize)
                .unwrap_or(defaults.top_k),
            preview_chars: u64_at(config, "research", "preview_chars")
                .map(|v| v.clamp(1, 10_000) as usize)
                .unwrap_or(defaults.preview_chars),
            max_sentences: u64_at(config, "summarizer", "max_sentences")
                .map(|v| v.clamp(1, 1_000) as usize)
                .unwrap_or(defaults.max_sentences),
            summary_order,
            db_file: str_at(config, "storage", "db_file")
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .unwrap_or(defaults.db_file),
            export_dir: str_at(config, "export", "dir")
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
        }
    }
}

fn str_at<'a>(config: &'a Value, section: &str, key: &str) -> Option<&'a str> {
    config.get(section).and_then(|v| v.get(key)).and_then(|v| v.as_str())
}

fn u64_at(config: &Value, section: &str, key: &str) -> Option<u64> {
    config.get(section).and_then(|v| v.get(key)).and_then(|v| v.as_u64())
}
