use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ResearchError;
use crate::export::{ExportFormat, Exporter};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub text: String,
    pub format: String,
    /// Also write the file into the export directory and return its path.
    #[serde(default)]
    pub save: bool,
}

pub async fn export_report(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExportRequest>,
) -> Result<Response, ResearchError> {
    let format: ExportFormat = payload.format.parse()?;

    if payload.save {
        let exporter = state.exporter.clone();
        let text = payload.text;
        let path = tokio::task::spawn_blocking(move || exporter.write(&text, format))
            .await
            .map_err(ResearchError::internal)??;
        return Ok(Json(json!({
            "format": format,
            "path": path.display().to_string(),
        }))
        .into_response());
    }

    let bytes = Exporter::render(&payload.text, format);
    let disposition = format!(
        "attachment; filename=\"research-report.{}\"",
        format.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::test_state;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn pdf_export_returns_pdf_bytes() {
        let (state, _dir) = test_state().await;
        let payload = ExportRequest {
            text: "Query: cats\n\nSummary:\nCats purr.".to_string(),
            format: "pdf".to_string(),
            save: false,
        };
        let response = export_report(State(state), Json(payload)).await.unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn saved_markdown_lands_in_export_dir() {
        let (state, _dir) = test_state().await;
        let payload = ExportRequest {
            text: "# Report".to_string(),
            format: "md".to_string(),
            save: true,
        };
        let response = export_report(State(state.clone()), Json(payload)).await.unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let path = std::path::PathBuf::from(value["path"].as_str().unwrap());
        assert!(path.starts_with(state.exporter.dir()));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Report");
    }

    #[tokio::test]
    async fn unknown_format_is_bad_request() {
        let (state, _dir) = test_state().await;
        let payload = ExportRequest {
            text: "x".to_string(),
            format: "docx".to_string(),
            save: false,
        };
        let err = export_report(State(state), Json(payload)).await.err().unwrap();
        assert!(matches!(err, ResearchError::BadRequest(_)));
    }
}
