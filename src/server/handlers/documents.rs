use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::errors::ResearchError;
use crate::rag::{DocumentInput, Metadata, NewDocument};
use crate::research::preview;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddDocumentsRequest {
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
}

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub metadata: Metadata,
    pub preview: String,
}

pub async fn list_documents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let documents = state
        .agent
        .documents()
        .await
        .iter()
        .map(|doc| DocumentSummary {
            id: doc.id.clone(),
            metadata: doc.metadata.clone(),
            preview: preview(&doc.content, state.settings.preview_chars),
        })
        .collect::<Vec<_>>();
    Json(documents)
}

pub async fn add_documents(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddDocumentsRequest>,
) -> Result<impl IntoResponse, ResearchError> {
    let documents: Vec<NewDocument> = payload.documents.into_iter().map(NewDocument::from).collect();
    let report = state.agent.add_documents(documents).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::test_state;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn add_accepts_strings_and_records() {
        let (state, _dir) = test_state().await;
        let payload: AddDocumentsRequest = serde_json::from_value(json!({
            "documents": [
                "Cats are mammals.",
                {"id": "dogs", "content": "Dogs bark.", "metadata": {"source": "notes"}},
                {"id": "dogs", "content": "Dogs bark again."}
            ]
        }))
        .unwrap();

        let response = add_documents(State(state.clone()), Json(payload))
            .await
            .unwrap()
            .into_response();
        let report = json_body(response).await;
        assert_eq!(report["added"].as_array().unwrap().len(), 2);
        assert_eq!(report["skipped"], json!(["dogs"]));

        let listed = json_body(list_documents(State(state)).await.into_response()).await;
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0]["id"].as_str().unwrap().starts_with("doc-"));
        assert_eq!(listed[1]["metadata"]["source"], "notes");
        assert_eq!(listed[1]["preview"], "Dogs bark.");
    }

    #[tokio::test]
    async fn empty_document_list_is_a_no_op() {
        let (state, _dir) = test_state().await;
        let payload: AddDocumentsRequest = serde_json::from_value(json!({})).unwrap();
        let response = add_documents(State(state.clone()), Json(payload))
            .await
            .unwrap()
            .into_response();
        let report = json_body(response).await;
        assert_eq!(report["added"], json!([]));
        assert_eq!(state.agent.store().len().await, 0);
    }
}
