//! Document records and boundary normalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub type Metadata = Map<String, Value>;

/// A stored document: content, open metadata and its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
}

/// A document awaiting embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl NewDocument {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Shapes accepted at the API boundary: a bare string or a record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DocumentInput {
    Text(String),
    Record {
        #[serde(default)]
        id: Option<String>,
        content: String,
        #[serde(default)]
        metadata: Option<Value>,
    },
}

impl From<DocumentInput> for NewDocument {
    fn from(input: DocumentInput) -> Self {
        match input {
            DocumentInput::Text(content) => {
                let id = derive_document_id(&content);
                NewDocument::new(id, content)
            }
            DocumentInput::Record {
                id,
                content,
                metadata,
            } => {
                let id = id
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| derive_document_id(&content));
                let metadata = match metadata {
                    Some(Value::Object(map)) => map,
                    Some(Value::Null) | None => Metadata::new(),
                    Some(other) => {
                        let mut map = Metadata::new();
                        map.insert("value".to_string(), other);
                        map
                    }
                };
                NewDocument {
                    id,
                    content,
                    metadata,
                }
            }
        }
    }
}

/// Content-addressed id for documents submitted without one.
pub fn derive_document_id(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("doc-{}", hex::encode(&digest[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_string_gets_content_derived_id() {
        let input: DocumentInput = serde_json::from_value(json!("Cats purr.")).unwrap();
        let doc = NewDocument::from(input);

        assert!(doc.id.starts_with("doc-"));
        assert_eq!(doc.id.len(), "doc-".len() + 16);
        assert_eq!(doc.id, derive_document_id("Cats purr."));
        assert!(doc.metadata.is_empty());
    }

    #[test]
    fn record_keeps_id_and_metadata() {
        let input: DocumentInput = serde_json::from_value(json!({
            "id": "notes.txt",
            "content": "Dogs bark.",
            "metadata": { "source": "upload" }
        }))
        .unwrap();
        let doc = NewDocument::from(input);

        assert_eq!(doc.id, "notes.txt");
        assert_eq!(doc.content, "Dogs bark.");
        assert_eq!(doc.metadata.get("source"), Some(&json!("upload")));
    }

    #[test]
    fn blank_record_id_falls_back_to_content_hash() {
        let input: DocumentInput =
            serde_json::from_value(json!({ "id": "  ", "content": "x" })).unwrap();
        assert_eq!(NewDocument::from(input).id, derive_document_id("x"));
    }

    #[test]
    fn scalar_metadata_is_wrapped() {
        let input: DocumentInput =
            serde_json::from_value(json!({ "id": "a", "content": "x", "metadata": 7 })).unwrap();
        let doc = NewDocument::from(input);
        assert_eq!(doc.metadata.get("value"), Some(&json!(7)));
    }
}
