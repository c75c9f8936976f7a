//! Offline evaluation over a JSONL dataset.
//!
//! Each example runs through the full judge loop; the report aggregates the
//! judge label distribution and mean answer overlap against the reference
//! answers.

use crate::eval::metrics::rouge_l_f1;
use crate::judge::{CycleRecord, JudgeLoop};
use crate::rag::types::Passage;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// One labeled example: a question and its reference answer
#[derive(Debug, Clone, Deserialize)]
pub struct EvalExample {
    #[serde(default)]
    pub id: Option<String>,
    pub question: String,
    pub answer: String,
}

/// Per-example outcome
#[derive(Debug, Clone, Serialize)]
pub struct EvalRecord {
    pub id: String,
    pub question: String,
    pub reference_answer: String,
    pub model_answer: String,
    pub judge_label: String,
    pub rouge_l: f64,
    pub sources: Vec<Passage>,
    pub judge_cycles: Vec<CycleRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalSummary {
    pub num_examples: usize,
    pub label_counts: BTreeMap<String, usize>,
    pub avg_rouge_l: f64,
    pub correct_rate: f64,
    pub hallucination_rate: f64,
    pub incomplete_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub generated_at: DateTime<Utc>,
    pub summary: EvalSummary,
    pub results: Vec<EvalRecord>,
}

/// Parse a JSONL dataset, skipping blank lines
pub fn load_jsonl(path: &Path) -> Result<Vec<EvalExample>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read eval dataset {}", path.display()))?;

    let mut examples = Vec::new();
    for (line_number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let example: EvalExample = serde_json::from_str(line)
            .with_context(|| format!("Malformed example on line {}", line_number + 1))?;
        examples.push(example);
    }
    Ok(examples)
}

/// Run the judge loop over every example and write the JSON report
pub async fn run(judge: &JudgeLoop, dataset_path: &Path, out_path: &Path) -> Result<EvalReport> {
    let examples = load_jsonl(dataset_path)?;
    info!(examples = examples.len(), dataset = %dataset_path.display(), "starting offline eval");

    let mut results = Vec::with_capacity(examples.len());
    let mut label_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut rouge_sum = 0.0;

    for (index, example) in examples.iter().enumerate() {
        let id = example
            .id
            .clone()
            .unwrap_or_else(|| (index + 1).to_string());

        let outcome = judge
            .evaluate(&example.question)
            .await
            .with_context(|| format!("Judge run failed for example {}", id))?;

        let label = outcome.label.as_str().to_string();
        *label_counts.entry(label.clone()).or_insert(0) += 1;

        let rouge_l = rouge_l_f1(&example.answer, &outcome.answer);
        rouge_sum += rouge_l;

        info!(example = %id, label = %label, rouge_l, "example evaluated");

        results.push(EvalRecord {
            id,
            question: example.question.clone(),
            reference_answer: example.answer.clone(),
            model_answer: outcome.answer,
            judge_label: label,
            rouge_l,
            sources: outcome.sources,
            judge_cycles: outcome.cycles,
        });
    }

    let total = results.len().max(1);
    let rate = |label: &str| *label_counts.get(label).unwrap_or(&0) as f64 / total as f64;

    let report = EvalReport {
        generated_at: Utc::now(),
        summary: EvalSummary {
            num_examples: results.len(),
            label_counts: label_counts.clone(),
            avg_rouge_l: if results.is_empty() {
                0.0
            } else {
                rouge_sum / results.len() as f64
            },
            correct_rate: rate("CORRECT"),
            hallucination_rate: rate("HALLUCINATION"),
            incomplete_rate: rate("INCOMPLETE"),
        },
        results,
    };

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).context("Failed to create report directory")?;
    }
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    fs::write(out_path, json)
        .with_context(|| format!("Failed to write report {}", out_path.display()))?;

    info!(out = %out_path.display(), "offline eval report written");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_jsonl_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": "e1", "question": "q1", "answer": "a1"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"question": "q2", "answer": "a2"}}"#).unwrap();

        let examples = load_jsonl(file.path()).unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].id.as_deref(), Some("e1"));
        assert!(examples[1].id.is_none());
    }

    #[test]
    fn test_load_jsonl_rejects_malformed_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        assert!(load_jsonl(file.path()).is_err());
    }
}
