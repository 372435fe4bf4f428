//! End-to-end checks through the public library API.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use deep_researcher::core::errors::ResearchError;
use deep_researcher::embedding::Embedder;
use deep_researcher::rag::{DocumentStore, NewDocument, SqliteDocumentPersistence};
use deep_researcher::research::{
    AgentOptions, ResearchAgent, Summarizer, SummaryOrder, NO_CONTENT_SENTINEL,
};

/// Bag of words over a fixed vocabulary.
struct KeywordEmbedder;

const VOCABULARY: [&str; 6] = ["cats", "dogs", "are", "mammals", "purr", "bark"];

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ResearchError> {
        let mut vector = vec![0.0; VOCABULARY.len()];
        for word in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
            if let Some(axis) = VOCABULARY.iter().position(|v| *v == word) {
                vector[axis] += 1.0;
            }
        }
        Ok(vector)
    }
}

async fn agent_at(path: PathBuf) -> ResearchAgent {
    let persistence = SqliteDocumentPersistence::with_path(path).await.unwrap();
    let store = Arc::new(DocumentStore::open(Arc::new(persistence)).await.unwrap());
    ResearchAgent::new(
        store,
        Arc::new(KeywordEmbedder),
        Summarizer::new(SummaryOrder::Score),
        AgentOptions {
            top_k: 1,
            preview_chars: 120,
            max_sentences: 5,
        },
    )
}

#[tokio::test]
async fn cats_question_is_answered_from_cat_document() {
    let dir = tempfile::tempdir().unwrap();
    let agent = agent_at(dir.path().join("research.db")).await;

    let report = agent
        .add_documents(vec![
            NewDocument::new("A", "Cats are mammals. Cats purr."),
            NewDocument::new("B", "Dogs are mammals. Dogs bark."),
        ])
        .await
        .unwrap();
    assert_eq!(report.added, vec!["A", "B"]);

    let answer = agent.answer("Are cats mammals?", 1).await.unwrap();
    assert_eq!(answer.analysis[0].id, "A");
    assert!(answer.analysis[0].chosen);
    assert!(answer.analysis[0].score > answer.analysis[1].score);
    assert!(answer.narrative.contains("Cats are mammals."));
}

#[tokio::test]
async fn empty_store_yields_sentinel_digest() {
    let dir = tempfile::tempdir().unwrap();
    let agent = agent_at(dir.path().join("research.db")).await;

    let answer = agent.answer("cats and dogs", 3).await.unwrap();
    assert!(answer.analysis.is_empty());
    assert_eq!(
        answer.narrative.matches("No relevant documents found.").count(),
        2
    );
    assert!(answer.narrative.contains(NO_CONTENT_SENTINEL));
}

#[tokio::test]
async fn documents_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("research.db");

    let before = {
        let agent = agent_at(path.clone()).await;
        agent
            .add_documents(vec![
                NewDocument::new("A", "Cats are mammals. Cats purr."),
                NewDocument::new("B", "Dogs are mammals. Dogs bark."),
            ])
            .await
            .unwrap();
        agent.answer("dogs", 1).await.unwrap().analysis
    };

    let reopened = agent_at(path).await;
    let ids: Vec<String> = reopened
        .documents()
        .await
        .iter()
        .map(|doc| doc.id.clone())
        .collect();
    assert_eq!(ids, vec!["A", "B"]);

    let after = reopened.answer("dogs", 1).await.unwrap().analysis;
    assert_eq!(before, after);
}
