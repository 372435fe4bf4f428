//! Query decomposition.
//!
//! Best-effort segmentation of a compound query on connectives and
//! punctuation. It is a heuristic, not a parser: "cats and dogs" is split
//! just like "summarize X and compare Y". Terminators only split when
//! followed by whitespace or the end of the query, so "2.0" stays whole.

use regex::Regex;

const EXPLANATION_HEADER: &str =
    "The query is broken down into subtasks to process each aspect separately:";

#[derive(Debug, Clone)]
pub struct QueryDecomposer {
    splitter: Regex,
}

impl QueryDecomposer {
    pub fn new() -> Self {
        Self {
            splitter: Regex::new(r"(?i)[,;]+|[.!?]+(?:\s+|$)|\b(?:and|or)\b")
                .expect("static decomposition regex"),
        }
    }

    /// Splits `query` into ordered, trimmed, non-empty subtasks.
    ///
    /// When the split produces at most one fragment the original query is
    /// returned unchanged as the only subtask.
    pub fn decompose(&self, query: &str) -> Vec<String> {
        let fragments: Vec<String> = self
            .splitter
            .split(query)
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string)
            .collect();

        if fragments.len() <= 1 {
            return vec![query.to_string()];
        }
        fragments
    }

    /// Numbered, deterministic rendering of the subtasks.
    pub fn explain(&self, subtasks: &[String]) -> String {
        let mut explanation = String::from(EXPLANATION_HEADER);
        explanation.push('\n');
        for (i, task) in subtasks.iter().enumerate() {
            explanation.push_str(&format!("{}. {}\n", i + 1, task));
        }
        explanation
    }

    /// Applies caller edits to a decomposition: entries are trimmed, empty
    /// ones dropped, and an empty result falls back to `decompose(query)`.
    pub fn refine(&self, query: &str, edited: &[String]) -> Vec<String> {
        let refined: Vec<String> = edited
            .iter()
            .map(|task| task.trim())
            .filter(|task| !task.is_empty())
            .map(str::to_string)
            .collect();

        if refined.is_empty() {
            return self.decompose(query);
        }
        refined
    }
}

impl Default for QueryDecomposer {
    fn default() -> Self {
        Self::new()
    }
}
