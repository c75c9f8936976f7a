//! HTTP request/response shapes.
//!
//! Pure transformations from core records into the wire format; no side
//! effects beyond serialization.

use crate::judge::{CycleRecord, JudgeRunResult, Label};
use crate::rag::types::{AnswerRecord, Passage};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    /// Prior (user, assistant) turns. Accepted for interface compatibility;
    /// the answer path is single-turn and does not consume it.
    #[serde(default)]
    pub history: Option<Vec<(String, String)>>,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSnippet {
    pub text: String,
    pub metadata: Map<String, Value>,
}

impl From<Passage> for SourceSnippet {
    fn from(passage: Passage) -> Self {
        Self {
            text: passage.text,
            metadata: passage.metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub num_sources: usize,
    pub sources: Vec<SourceSnippet>,
}

impl From<AnswerRecord> for ChatResponse {
    fn from(record: AnswerRecord) -> Self {
        Self {
            answer: record.answer,
            num_sources: record.source_count,
            sources: record.sources.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JudgeResponse {
    pub answer: String,
    pub label: Label,
    pub cycles: Vec<CycleRecord>,
    pub sources: Vec<SourceSnippet>,
}

impl From<JudgeRunResult> for JudgeResponse {
    fn from(result: JudgeRunResult) -> Self {
        Self {
            answer: result.answer,
            label: result.label,
            cycles: result.cycles,
            sources: result.sources.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_minimal_body() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"question": "How do returns work?"}"#).unwrap();
        assert_eq!(request.question, "How do returns work?");
        assert!(request.history.is_none());
        assert!(request.top_k.is_none());
        assert!(request.temperature.is_none());
    }

    #[test]
    fn test_chat_request_with_history_pairs() {
        let body = r#"{"question": "q", "history": [["hi", "hello"]], "top_k": 3}"#;
        let request: ChatRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.history.unwrap().len(), 1);
        assert_eq!(request.top_k, Some(3));
    }

    #[test]
    fn test_chat_response_from_record() {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), json!("faq.txt"));
        let record = AnswerRecord::new(
            "the answer".to_string(),
            &[Passage::new("passage text", metadata)],
            300,
        );

        let response = ChatResponse::from(record);
        assert_eq!(response.answer, "the answer");
        assert_eq!(response.num_sources, 1);
        assert_eq!(response.sources[0].metadata["source"], "faq.txt");
    }

    #[test]
    fn test_judge_response_serializes_label_token() {
        let response = JudgeResponse {
            answer: "a".to_string(),
            label: Label::MaxCycles,
            cycles: vec![],
            sources: vec![],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["label"], "MAX_CYCLES");
    }
}
