use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.agent.store().snapshot().await;
    Json(json!({
        "status": "ok",
        "documents": snapshot.len(),
        "dimension": snapshot.dimension(),
        "embedder": state.agent.embedder_name(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::test_state;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn health_reports_document_count() {
        let (state, _dir) = test_state().await;
        let response = health(State(state)).await.into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["documents"], 0);
        assert_eq!(value["embedder"], "hashing");
    }
}
