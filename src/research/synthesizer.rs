use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::decomposer::QueryDecomposer;
use super::report::{preview, DocumentPreview, Report, ReportSection, SubtaskOutcome, SubtaskTrace};
use super::summarizer::Summarizer;
use crate::core::config::ResearchSettings;
use crate::core::errors::ResearchError;
use crate::embedding::Embedder;
use crate::rag::{AddReport, Document, DocumentStore, NewDocument, SimilarityIndex};
use crate::vector_math::validate_embedding;

const EMPTY_QUERY_NOTICE: &str = "Nothing to research: the query is empty.";

/// One scored document in the combined provenance list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisEntry {
    pub id: String,
    pub score: f32,
    pub chosen: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchAnswer {
    pub run_id: String,
    pub narrative: String,
    pub report: Report,
    pub analysis: Vec<AnalysisEntry>,
}

#[derive(Debug, Clone, Copy)]
pub struct AgentOptions {
    pub top_k: usize,
    pub preview_chars: usize,
    pub max_sentences: usize,
}

impl From<&ResearchSettings> for AgentOptions {
    fn from(settings: &ResearchSettings) -> Self {
        Self {
            top_k: settings.top_k,
            preview_chars: settings.preview_chars,
            max_sentences: settings.max_sentences,
        }
    }
}

impl Default for AgentOptions {
    fn default() -> Self {
        AgentOptions::from(&ResearchSettings::default())
    }
}

/// Caller-facing research pipeline: decompose, retrieve per subtask,
/// merge provenance and summarize the chosen documents.
#[derive(Clone)]
pub struct ResearchAgent {
    store: Arc<DocumentStore>,
    embedder: Arc<dyn Embedder>,
    decomposer: QueryDecomposer,
    summarizer: Summarizer,
    options: AgentOptions,
}

impl ResearchAgent {
    pub fn new(
        store: Arc<DocumentStore>,
        embedder: Arc<dyn Embedder>,
        summarizer: Summarizer,
        options: AgentOptions,
    ) -> Self {
        Self {
            store,
            embedder,
            decomposer: QueryDecomposer::new(),
            summarizer,
            options,
        }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn options(&self) -> AgentOptions {
        self.options
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    pub async fn add_documents(&self, documents: Vec<NewDocument>) -> Result<AddReport, ResearchError> {
        self.store.add(documents, self.embedder.as_ref()).await
    }

    pub async fn documents(&self) -> Vec<Arc<Document>> {
        self.store.all().await
    }

    pub fn decompose(&self, query: &str) -> Vec<String> {
        self.decomposer.decompose(query)
    }

    pub fn explain(&self, subtasks: &[String]) -> String {
        self.decomposer.explain(subtasks)
    }

    pub fn refine(&self, query: &str, edited: &[String]) -> Vec<String> {
        self.decomposer.refine(query, edited)
    }

    /// Answers `query` using its automatic decomposition.
    pub async fn answer(&self, query: &str, top_k: usize) -> Result<ResearchAnswer, ResearchError> {
        if query.trim().is_empty() {
            return Ok(empty_query_answer(query));
        }
        let subtasks = self.decomposer.decompose(query);
        self.run(query, subtasks, top_k).await
    }

    /// Answers `query` over caller-edited subtasks.
    pub async fn answer_with_subtasks(
        &self,
        query: &str,
        subtasks: &[String],
        top_k: usize,
    ) -> Result<ResearchAnswer, ResearchError> {
        if query.trim().is_empty() {
            return Ok(empty_query_answer(query));
        }
        let subtasks = self.decomposer.refine(query, subtasks);
        self.run(query, subtasks, top_k).await
    }

    async fn run(
        &self,
        query: &str,
        subtasks: Vec<String>,
        top_k: usize,
    ) -> Result<ResearchAnswer, ResearchError> {
        let run_id = Uuid::new_v4().to_string();
        tracing::info!(
            "Research run {} started: {} subtasks, top_k={}",
            run_id,
            subtasks.len(),
            top_k
        );

        let mut report = Report::new(query);
        report.push(ReportSection::Decomposition {
            explanation: self.decomposer.explain(&subtasks),
            subtasks: subtasks.clone(),
        });

        let mut merged = MergedAnalysis::default();
        let mut traces = Vec::with_capacity(subtasks.len());

        for subtask in subtasks {
            let outcome = self.retrieve(&run_id, &subtask, top_k, &mut merged).await?;
            traces.push(SubtaskTrace { subtask, outcome });
        }
        report.push(ReportSection::Retrieval { traces });

        let chosen = merged.chosen_contents();
        let digest = self
            .summarizer
            .summarize(&chosen, self.options.max_sentences);
        report.push(ReportSection::Summary { text: digest });

        tracing::info!(
            "Research run {} finished: {} documents analysed, {} chosen",
            run_id,
            merged.entries.len(),
            chosen.len()
        );

        Ok(ResearchAnswer {
            run_id,
            narrative: report.render(),
            report,
            analysis: merged.entries,
        })
    }

    async fn retrieve(
        &self,
        run_id: &str,
        subtask: &str,
        top_k: usize,
        merged: &mut MergedAnalysis,
    ) -> Result<SubtaskOutcome, ResearchError> {
        let snapshot = self.store.snapshot().await;
        if snapshot.is_empty() {
            return Ok(SubtaskOutcome::NoDocuments);
        }

        let vector = match self
            .embedder
            .embed(subtask)
            .await
            .and_then(|vector| validate_embedding(&vector).map(|_| vector))
        {
            Ok(vector) => vector,
            Err(ResearchError::Embedding(message)) => {
                tracing::warn!(
                    "Research run {}: embedding subtask '{}' failed: {}",
                    run_id,
                    subtask,
                    message
                );
                return Ok(SubtaskOutcome::EmbeddingFailed { error: message });
            }
            Err(err) => return Err(err),
        };

        let ranked = SimilarityIndex::rank_all_snapshot(&snapshot, &vector)?;
        let ranked_count = ranked.len();

        let mut documents = Vec::new();
        for (rank, hit) in ranked.into_iter().enumerate() {
            let chosen = rank < top_k;
            if chosen {
                documents.push(DocumentPreview {
                    id: hit.id.clone(),
                    score: hit.score,
                    preview: preview(&hit.content, self.options.preview_chars),
                });
            }
            merged.record(hit.id, hit.score, chosen, hit.content);
        }

        Ok(match (ranked_count, documents.is_empty()) {
            (0, _) => SubtaskOutcome::NoDocuments,
            (ranked, true) => SubtaskOutcome::NoneChosen { ranked },
            (_, false) => SubtaskOutcome::Found { documents },
        })
    }
}

/// Provenance across subtasks: first occurrence keeps its score and
/// position, `chosen` accumulates.
#[derive(Default)]
struct MergedAnalysis {
    entries: Vec<AnalysisEntry>,
    contents: Vec<String>,
    positions: HashMap<String, usize>,
}

impl MergedAnalysis {
    fn record(&mut self, id: String, score: f32, chosen: bool, content: String) {
        if let Some(&idx) = self.positions.get(&id) {
            self.entries[idx].chosen |= chosen;
            return;
        }
        self.positions.insert(id.clone(), self.entries.len());
        self.entries.push(AnalysisEntry { id, score, chosen });
        self.contents.push(content);
    }

    fn chosen_contents(&self) -> Vec<&str> {
        self.entries
            .iter()
            .zip(&self.contents)
            .filter(|(entry, _)| entry.chosen)
            .map(|(_, content)| content.as_str())
            .collect()
    }
}

fn empty_query_answer(query: &str) -> ResearchAnswer {
    let mut report = Report::new(query.trim());
    report.push(ReportSection::Notice {
        text: EMPTY_QUERY_NOTICE.to_string(),
    });
    ResearchAnswer {
        run_id: Uuid::new_v4().to_string(),
        narrative: report.render(),
        report,
        analysis: Vec::new(),
    }
}
