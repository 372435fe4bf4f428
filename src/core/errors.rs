use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("storage error: {0}")]
    Storage(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResearchError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ResearchError::Internal(err.to_string())
    }

    pub fn storage<E: std::fmt::Display>(err: E) -> Self {
        ResearchError::Storage(err.to_string())
    }

    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        ResearchError::Embedding(err.to_string())
    }
}

impl IntoResponse for ResearchError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ResearchError::Embedding(_) => StatusCode::BAD_GATEWAY,
            ResearchError::DimensionMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ResearchError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ResearchError::Storage(_) | ResearchError::Config(_) | ResearchError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
