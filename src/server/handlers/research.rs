use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::errors::ResearchError;
use crate::state::AppState;

const MAX_TOP_K: usize = 1_000;

#[derive(Debug, Deserialize)]
pub struct DecomposeRequest {
    pub query: String,
    /// Caller-edited subtasks; replaces the automatic split when non-empty.
    #[serde(default)]
    pub subtasks: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct DecomposeResponse {
    pub subtasks: Vec<String>,
    pub explanation: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub subtasks: Option<Vec<String>>,
}

pub async fn decompose(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DecomposeRequest>,
) -> Result<impl IntoResponse, ResearchError> {
    if payload.query.trim().is_empty() {
        return Err(ResearchError::BadRequest("query must not be empty".to_string()));
    }

    let subtasks = match payload.subtasks {
        Some(edited) => state.agent.refine(&payload.query, &edited),
        None => state.agent.decompose(&payload.query),
    };
    let explanation = state.agent.explain(&subtasks);
    Ok(Json(DecomposeResponse {
        subtasks,
        explanation,
    }))
}

pub async fn answer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, ResearchError> {
    let top_k = payload.top_k.unwrap_or(state.agent.options().top_k);
    if top_k == 0 || top_k > MAX_TOP_K {
        return Err(ResearchError::BadRequest(format!(
            "top_k must be between 1 and {}",
            MAX_TOP_K
        )));
    }
    let answer = match payload.subtasks {
        Some(subtasks) => {
            state
                .agent
                .answer_with_subtasks(&payload.query, &subtasks, top_k)
                .await?
        }
        None => state.agent.answer(&payload.query, top_k).await?,
    };
    Ok(Json(answer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::NewDocument;
    use crate::server::test_support::test_state;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn decompose_returns_subtasks_and_explanation() {
        let (state, _dir) = test_state().await;
        let payload = DecomposeRequest {
            query: "Summarize X and compare Y".to_string(),
            subtasks: None,
        };
        let value = json_body(decompose(State(state), Json(payload)).await.unwrap().into_response()).await;
        assert_eq!(value["subtasks"], json!(["Summarize X", "compare Y"]));
        assert!(value["explanation"].as_str().unwrap().ends_with("2. compare Y\n"));
    }

    #[tokio::test]
    async fn decompose_rejects_blank_query() {
        let (state, _dir) = test_state().await;
        let payload = DecomposeRequest {
            query: "  ".to_string(),
            subtasks: None,
        };
        let err = decompose(State(state), Json(payload)).await.err().unwrap();
        assert!(matches!(err, ResearchError::BadRequest(_)));
    }

    #[tokio::test]
    async fn answer_rejects_top_k_outside_config_range() {
        let (state, _dir) = test_state().await;
        for top_k in [0, 1_001] {
            let payload: AnswerRequest =
                serde_json::from_value(json!({"query": "cats", "top_k": top_k})).unwrap();
            let err = answer(State(state.clone()), Json(payload)).await.err().unwrap();
            assert!(matches!(err, ResearchError::BadRequest(_)));
        }
    }

    #[tokio::test]
    async fn answer_uses_configured_top_k() {
        let (state, _dir) = test_state().await;
        let docs = (0..8)
            .map(|i| NewDocument::new(format!("d{}", i), format!("Cats note number {}.", i)))
            .collect();
        state.agent.add_documents(docs).await.unwrap();

        let payload: AnswerRequest = serde_json::from_value(json!({"query": "cats"})).unwrap();
        let value = json_body(answer(State(state), Json(payload)).await.unwrap().into_response()).await;

        let analysis = value["analysis"].as_array().unwrap();
        assert_eq!(analysis.len(), 8);
        let chosen = analysis.iter().filter(|e| e["chosen"] == true).count();
        assert_eq!(chosen, 5);
        assert!(value["narrative"].as_str().unwrap().starts_with("Query: cats\n"));
    }
}
