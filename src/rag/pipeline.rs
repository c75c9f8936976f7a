//! The answer pipeline: retrieve, build the prompt, invoke the generator.
//!
//! One retrieval and one model call per question, fully sequential. Failures
//! from the retriever or the model propagate uncaught; this is the single
//! point where I/O and inference errors surface.

use crate::config::Config;
use crate::errors::{RagError, Result};
use crate::rag::prompt::{build_answer_prompt, context_block};
use crate::rag::retrieval::Retriever;
use crate::rag::types::{AnswerRecord, Passage};
use crate::models::TextCompletion;
use std::sync::Arc;
use tracing::debug;

/// The answer for one question together with its full-text passages.
///
/// The full text is retained here so the judge loop can build its critique
/// context from the originally retrieved passages, not the truncated
/// previews that go into response payloads.
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub answer: String,
    pub passages: Vec<Passage>,
}

impl AskOutcome {
    /// Full-text context block, blank-line separated, in retrieval order
    pub fn context(&self) -> String {
        context_block(&self.passages)
    }

    /// Preview-truncated copies of the passages for response payloads
    pub fn preview_sources(&self, preview_chars: usize) -> Vec<Passage> {
        self.passages
            .iter()
            .map(|p| p.preview(preview_chars))
            .collect()
    }

    pub fn into_record(self, preview_chars: usize) -> AnswerRecord {
        AnswerRecord::new(self.answer.clone(), &self.passages, preview_chars)
    }
}

/// Retrieval-augmented answer generator
#[derive(Clone)]
pub struct RagPipeline {
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn TextCompletion>,
    config: Config,
}

impl RagPipeline {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        llm: Arc<dyn TextCompletion>,
        config: &Config,
    ) -> Self {
        Self {
            retriever,
            llm,
            config: config.clone(),
        }
    }

    /// Answer a question from the indexed corpus.
    ///
    /// `top_k` and `temperature` default to the configured values when
    /// absent. Retrieval order is preserved as returned by the retriever.
    pub async fn ask(
        &self,
        question: &str,
        top_k: Option<usize>,
        temperature: Option<f32>,
    ) -> Result<AskOutcome> {
        let k = self.config.resolve_top_k(top_k);
        let passages = self.retriever.retrieve(question, k).await?;
        debug!(retrieved = passages.len(), top_k = k, "passages retrieved");

        let prompt = build_answer_prompt(question, &passages);
        let temperature = temperature.or(Some(self.config.models.temperature));

        let output = self
            .llm
            .complete(&prompt, temperature)
            .await
            .map_err(|e| RagError::Generation(e.to_string()))?;
        let answer = output.into_text();

        Ok(AskOutcome { answer, passages })
    }

    /// Configured preview length for response payloads
    pub fn preview_chars(&self) -> usize {
        self.config.retrieval.preview_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelOutput;
    use async_trait::async_trait;
    use serde_json::{json, Map};
    use std::sync::Mutex;

    struct StaticRetriever {
        passages: Vec<Passage>,
        seen_top_k: Mutex<Option<usize>>,
    }

    #[async_trait]
    impl Retriever for StaticRetriever {
        async fn retrieve(&self, _query: &str, top_k: usize) -> Result<Vec<Passage>> {
            *self.seen_top_k.lock().unwrap() = Some(top_k);
            Ok(self.passages.iter().take(top_k).cloned().collect())
        }
    }

    struct EchoModel;

    #[async_trait]
    impl TextCompletion for EchoModel {
        async fn complete(&self, _prompt: &str, _temperature: Option<f32>) -> Result<ModelOutput> {
            Ok(ModelOutput::PlainText("Returns take 14 days.".to_string()))
        }
    }

    struct FailingModel;

    #[async_trait]
    impl TextCompletion for FailingModel {
        async fn complete(&self, _prompt: &str, _temperature: Option<f32>) -> Result<ModelOutput> {
            Err(RagError::OllamaApi("model unavailable".to_string()))
        }
    }

    fn passage(text: &str) -> Passage {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), json!("faq.txt"));
        metadata.insert("page_number".to_string(), json!(1));
        Passage::new(text, metadata)
    }

    fn pipeline_with(
        passages: Vec<Passage>,
        llm: Arc<dyn TextCompletion>,
    ) -> (RagPipeline, Arc<StaticRetriever>) {
        let retriever = Arc::new(StaticRetriever {
            passages,
            seen_top_k: Mutex::new(None),
        });
        let pipeline = RagPipeline::new(retriever.clone(), llm, &Config::default());
        (pipeline, retriever)
    }

    #[tokio::test]
    async fn test_ask_returns_answer_and_passages() {
        let (pipeline, _) = pipeline_with(
            vec![passage("Returns take 14 days."), passage("Shipping is free.")],
            Arc::new(EchoModel),
        );

        let outcome = pipeline.ask("How long do returns take?", None, None).await.unwrap();
        assert_eq!(outcome.answer, "Returns take 14 days.");
        assert_eq!(outcome.passages.len(), 2);
    }

    #[tokio::test]
    async fn test_ask_uses_default_top_k() {
        let (pipeline, retriever) = pipeline_with(vec![passage("a")], Arc::new(EchoModel));
        pipeline.ask("q", None, None).await.unwrap();
        assert_eq!(*retriever.seen_top_k.lock().unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_ask_honors_top_k_override() {
        let (pipeline, retriever) = pipeline_with(vec![passage("a")], Arc::new(EchoModel));
        pipeline.ask("q", Some(2), None).await.unwrap();
        assert_eq!(*retriever.seen_top_k.lock().unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_ask_empty_retrieval_is_well_formed() {
        let (pipeline, _) = pipeline_with(vec![], Arc::new(EchoModel));
        let outcome = pipeline.ask("q", None, None).await.unwrap();
        let record = outcome.into_record(300);
        assert_eq!(record.source_count, 0);
        assert!(record.sources.is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_propagates_as_generation() {
        let (pipeline, _) = pipeline_with(vec![passage("a")], Arc::new(FailingModel));
        let err = pipeline.ask("q", None, None).await.unwrap_err();
        assert!(matches!(err, RagError::Generation(_)));
    }

    #[tokio::test]
    async fn test_outcome_context_uses_full_text() {
        let long = "z".repeat(400);
        let (pipeline, _) = pipeline_with(vec![passage(&long)], Arc::new(EchoModel));

        let outcome = pipeline.ask("q", None, None).await.unwrap();
        // Context keeps the full text even though the record truncates it
        assert_eq!(outcome.context().chars().count(), 400);
        let record = outcome.into_record(300);
        assert_eq!(record.sources[0].text.chars().count(), 300);
    }
}
