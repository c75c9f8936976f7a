//! Core value types for the answer pipeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One retrieved passage: text plus origin metadata.
///
/// Metadata carries at minimum a `source` identifier and, when available, a
/// 1-based `page_number`. Passages are produced by the retriever and consumed
/// read-only by prompt builders and response payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub metadata: Map<String, Value>,
}

impl Passage {
    pub fn new(text: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Copy of this passage with text truncated to at most `max_chars`
    /// characters. Truncation is a payload-size control for response bodies;
    /// retrieval and prompting always see the full text.
    pub fn preview(&self, max_chars: usize) -> Passage {
        Passage {
            text: truncate_chars(&self.text, max_chars),
            metadata: self.metadata.clone(),
        }
    }
}

/// Character-based truncation (not bytes, so multi-byte text stays valid)
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// The answer produced for one question, with its preview-truncated sources.
/// Created once per question and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub answer: String,
    pub sources: Vec<Passage>,
    pub source_count: usize,
}

impl AnswerRecord {
    /// Build a record from an answer and full-text passages, truncating each
    /// passage to the preview length
    pub fn new(answer: String, passages: &[Passage], preview_chars: usize) -> Self {
        let sources: Vec<Passage> = passages.iter().map(|p| p.preview(preview_chars)).collect();
        let source_count = sources.len();
        Self {
            answer,
            sources,
            source_count,
        }
    }
}
