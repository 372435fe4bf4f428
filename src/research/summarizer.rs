//! Extractive summarization by word frequency.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Returned when there is no text at all to summarize.
pub const NO_CONTENT_SENTINEL: &str = "No content to summarize.";

/// Output order of the selected sentences.
///
/// `Score` (default) emits the highest-scoring sentence first. `Document`
/// selects the same sentences but emits them in their original order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryOrder {
    #[default]
    Score,
    Document,
}

#[derive(Debug, Clone)]
pub struct Summarizer {
    order: SummaryOrder,
    sentence_end: Regex,
    word: Regex,
}

impl Summarizer {
    pub fn new(order: SummaryOrder) -> Self {
        Self {
            order,
            sentence_end: Regex::new(r"[.!?]\s+").expect("static sentence regex"),
            word: Regex::new(r"\w+").expect("static word regex"),
        }
    }

    /// Picks the `max_sentences` sentences whose words are most frequent
    /// across all `documents`.
    ///
    /// Ties keep first-seen order. Empty input yields
    /// [`NO_CONTENT_SENTINEL`].
    pub fn summarize<S: AsRef<str>>(&self, documents: &[S], max_sentences: usize) -> String {
        let combined = documents
            .iter()
            .map(|doc| doc.as_ref())
            .collect::<Vec<_>>()
            .join("\n");

        let sentences = self.split_sentences(&combined);
        if sentences.is_empty() {
            return NO_CONTENT_SENTINEL.to_string();
        }

        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for word in self.words(&combined) {
            *frequencies.entry(word).or_insert(0) += 1;
        }

        let scores: Vec<usize> = sentences
            .iter()
            .map(|sentence| {
                self.words(sentence)
                    .map(|word| frequencies.get(&word).copied().unwrap_or(0))
                    .sum()
            })
            .collect();

        let mut ranked: Vec<usize> = (0..sentences.len()).collect();
        ranked.sort_by(|a, b| scores[*b].cmp(&scores[*a]));
        ranked.truncate(max_sentences);

        if self.order == SummaryOrder::Document {
            ranked.sort_unstable();
        }

        ranked
            .into_iter()
            .map(|idx| sentences[idx].as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Sentences end at `.`, `!` or `?` followed by whitespace. Internal
    /// whitespace runs are collapsed.
    fn split_sentences(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for boundary in self.sentence_end.find_iter(text) {
            push_sentence(&mut sentences, &text[start..boundary.start() + 1]);
            start = boundary.end();
        }
        push_sentence(&mut sentences, &text[start..]);
        sentences
    }

    fn words<'a>(&'a self, text: &'a str) -> impl Iterator<Item = String> + 'a {
        self.word.find_iter(text).map(|m| m.as_str().to_lowercase())
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(SummaryOrder::default())
    }
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !normalized.is_empty() {
        sentences.push(normalized);
    }
}
