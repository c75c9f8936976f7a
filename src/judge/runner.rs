//! The iterative judge loop.
//!
//! One answer is generated per question, then judged repeatedly against the
//! same full-text context until a verdict terminates the run or the cycle
//! budget is exhausted. The loop never re-retrieves and never regenerates.

use crate::errors::{RagError, Result};
use crate::judge::verdict::{classify, normalize_feedback, Label, Verdict};
use crate::models::TextCompletion;
use crate::rag::prompt::build_critique_prompt;
use crate::rag::types::Passage;
use crate::rag::RagPipeline;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// One critique cycle. Append-only; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    /// 1-based cycle index
    pub cycle: u32,
    /// The answer being judged (fixed across all cycles of a run)
    pub answer: String,
    /// Normalized judge text when the verdict was not CORRECT
    pub critique: Option<String>,
    pub is_correct: bool,
}

/// Terminal output of one judge run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeRunResult {
    pub answer: String,
    pub label: Label,
    pub cycles: Vec<CycleRecord>,
    /// Preview-truncated passages from the single initial retrieval
    pub sources: Vec<Passage>,
}

/// Runs the answer pipeline once, then the multi-cycle critique loop
pub struct JudgeLoop {
    pipeline: RagPipeline,
    judge_llm: Arc<dyn TextCompletion>,
    max_cycles: u32,
    judge_temperature: f32,
}

impl JudgeLoop {
    pub fn new(
        pipeline: RagPipeline,
        judge_llm: Arc<dyn TextCompletion>,
        max_cycles: u32,
        judge_temperature: f32,
    ) -> Self {
        Self {
            pipeline,
            judge_llm,
            max_cycles: max_cycles.max(1),
            judge_temperature,
        }
    }

    /// Answer the question and judge the answer.
    ///
    /// Termination: CORRECT at any cycle; two consecutive HALLUCINATION or
    /// two consecutive INCOMPLETE verdicts; otherwise the cycle budget runs
    /// out and the run is labeled MAX_CYCLES. Exactly one result per call,
    /// never partial. The judge path always uses configured retrieval and
    /// sampling defaults; per-request overrides do not apply here.
    pub async fn evaluate(&self, question: &str) -> Result<JudgeRunResult> {
        let outcome = self.pipeline.ask(question, None, None).await?;
        let context = outcome.context();
        let answer = outcome.answer.clone();
        let sources = outcome.preview_sources(self.pipeline.preview_chars());

        let mut cycles: Vec<CycleRecord> = Vec::new();
        let mut halluc_streak = 0u32;
        let mut incomplete_streak = 0u32;

        for cycle in 1..=self.max_cycles {
            let prompt = build_critique_prompt(&context, &answer);
            let raw = self
                .judge_llm
                .complete(&prompt, Some(self.judge_temperature))
                .await
                .map_err(|e| RagError::Judge(e.to_string()))?
                .into_text();

            let feedback = normalize_feedback(&raw);
            let verdict = classify(&feedback);
            debug!(cycle, ?verdict, "judge verdict");

            let is_correct = verdict == Verdict::Correct;
            cycles.push(CycleRecord {
                cycle,
                answer: answer.clone(),
                critique: if is_correct { None } else { Some(feedback) },
                is_correct,
            });

            if is_correct {
                return Ok(self.finish(answer, Label::Correct, cycles, sources));
            }

            halluc_streak = if verdict == Verdict::Hallucination {
                halluc_streak + 1
            } else {
                0
            };
            incomplete_streak = if verdict == Verdict::Incomplete {
                incomplete_streak + 1
            } else {
                0
            };

            if halluc_streak >= 2 {
                return Ok(self.finish(answer, Label::Hallucination, cycles, sources));
            }
            if incomplete_streak >= 2 {
                return Ok(self.finish(answer, Label::Incomplete, cycles, sources));
            }
        }

        Ok(self.finish(answer, Label::MaxCycles, cycles, sources))
    }

    fn finish(
        &self,
        answer: String,
        label: Label,
        cycles: Vec<CycleRecord>,
        sources: Vec<Passage>,
    ) -> JudgeRunResult {
        JudgeRunResult {
            answer,
            label,
            cycles,
            sources,
        }
    }
}
