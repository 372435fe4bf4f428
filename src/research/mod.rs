//! Research pipeline.
//!
//! # Components
//!
//! - `decomposer`: splits a compound query into subtasks
//! - `summarizer`: word-frequency extractive digest
//! - `report`: ordered report sections and their text rendering
//! - `synthesizer`: `ResearchAgent`, the per-subtask retrieval and merge loop

mod decomposer;
mod report;
mod summarizer;
mod synthesizer;


pub use decomposer::QueryDecomposer;
pub use report::{preview, DocumentPreview, Report, ReportSection, SubtaskOutcome, SubtaskTrace};
pub use summarizer::{Summarizer, SummaryOrder, NO_CONTENT_SENTINEL};
pub use synthesizer::{AgentOptions, AnalysisEntry, ResearchAgent, ResearchAnswer};
