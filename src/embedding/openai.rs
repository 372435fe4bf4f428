use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::Embedder;
use crate::core::errors::ResearchError;

/// Embedder backed by an OpenAI-compatible `/v1/embeddings` endpoint
/// (LM Studio, Ollama, llama.cpp server, ...).
#[derive(Clone)]
pub struct OpenAiEmbedder {
    base_url: String,
    model: String,
    client: Client,
}

impl OpenAiEmbedder {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, ResearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(ResearchError::internal)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ResearchError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ResearchError::Embedding("embedding response was empty".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ResearchError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": texts,
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ResearchError::embedding)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ResearchError::Embedding(format!(
                "embedding endpoint returned {}: {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(ResearchError::embedding)?;
        let vectors = parse_embedding_payload(&payload)?;
        if vectors.len() != texts.len() {
            return Err(ResearchError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

/// Extracts `data[*].embedding`, honouring the optional `index` field so
/// responses that arrive out of order still line up with the inputs.
fn parse_embedding_payload(payload: &Value) -> Result<Vec<Vec<f32>>, ResearchError> {
    let data = payload["data"].as_array().ok_or_else(|| {
        ResearchError::Embedding("embedding response has no 'data' array".to_string())
    })?;

    let mut indexed = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let values = item["embedding"].as_array().ok_or_else(|| {
            ResearchError::Embedding(format!("embedding item {} has no vector", position))
        })?;
        let mut vector = Vec::with_capacity(values.len());
        for value in values {
            let number = value.as_f64().ok_or_else(|| {
                ResearchError::Embedding(format!(
                    "embedding item {} contains a non-numeric value",
                    position
                ))
            })?;
            vector.push(number as f32);
        }
        let index = item["index"].as_u64().map(|i| i as usize).unwrap_or(position);
        indexed.push((index, vector));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_vectors_follow_index_field() {
        let payload = json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        });

        let vectors = parse_embedding_payload(&payload).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn payload_without_data_is_an_embedding_error() {
        let err = parse_embedding_payload(&json!({ "error": "model not loaded" })).unwrap_err();
        assert!(matches!(err, ResearchError::Embedding(_)));
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let payload = json!({ "data": [ { "embedding": [0.5, "x"] } ] });
        assert!(parse_embedding_payload(&payload).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let embedder = OpenAiEmbedder::new("http://localhost:1234/", "m", 5).unwrap();
        assert_eq!(embedder.base_url, "http://localhost:1234");
        assert_eq!(embedder.model(), "m");
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_lmstudio_embedding() {
        let embedder =
            OpenAiEmbedder::new("http://localhost:1234", "text-embedding-nomic-embed-text-v1.5", 30)
                .unwrap();
        let vector = embedder.embed("hello world").await.unwrap();
        assert!(!vector.is_empty());
    }
}
