//! Structured research report.
//!
//! The synthesizer fills an ordered list of sections; `Report::render`
//! flattens them to plain text only at the edge (API response, export).

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPreview {
    pub id: String,
    pub score: f32,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubtaskOutcome {
    Found { documents: Vec<DocumentPreview> },
    NoDocuments,
    NoneChosen { ranked: usize },
    EmbeddingFailed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtaskTrace {
    pub subtask: String,
    pub outcome: SubtaskOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum ReportSection {
    Decomposition {
        subtasks: Vec<String>,
        explanation: String,
    },
    Retrieval {
        traces: Vec<SubtaskTrace>,
    },
    Summary {
        text: String,
    },
    Notice {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub query: String,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn summary(&self) -> Option<&str> {
        self.sections.iter().find_map(|section| match section {
            ReportSection::Summary { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn render(&self) -> String {
        let mut out = format!("Query: {}\n", self.query);

        for section in &self.sections {
            out.push('\n');
            match section {
                ReportSection::Decomposition { explanation, .. } => {
                    out.push_str("Initial Reasoning:\n");
                    out.push_str(explanation);
                }
                ReportSection::Retrieval { traces } => {
                    out.push_str("Detailed Reasoning Steps:\n");
                    for (idx, trace) in traces.iter().enumerate() {
                        out.push_str(&format!("\nSubtask {}: {}\n", idx + 1, trace.subtask));
                        render_outcome(&mut out, &trace.outcome);
                    }
                }
                ReportSection::Summary { text } => {
                    out.push_str("Summary:\n");
                    out.push_str(text);
                    out.push('\n');
                }
                ReportSection::Notice { text } => {
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }

        out
    }
}

fn render_outcome(out: &mut String, outcome: &SubtaskOutcome) {
    match outcome {
        SubtaskOutcome::Found { documents } => {
            out.push_str("Relevant documents considered:\n");
            for doc in documents {
                out.push_str(&format!(
                    "- [{}] ({:.3}) {}\n",
                    doc.id, doc.score, doc.preview
                ));
            }
        }
        SubtaskOutcome::NoDocuments => out.push_str("No relevant documents found.\n"),
        SubtaskOutcome::NoneChosen { ranked } => {
            out.push_str(&format!("{} documents ranked, none chosen.\n", ranked));
        }
        SubtaskOutcome::EmbeddingFailed { error } => {
            out.push_str(&format!("Embedding failed for this subtask: {}\n", error));
        }
    }
}

/// First `max_chars` characters of `content` on one line, with `...` when
/// cut.
pub fn preview(content: &str, max_chars: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
