//! Evaluation metrics.
//!
//! Retrieval metrics operate on retrieved vs. relevant chunk ids; the answer
//! metric is ROUGE-L F1 over whitespace tokens.

use std::collections::HashSet;

/// 1 if any of the top-k retrieved ids is relevant, else 0
pub fn hit_rate_at_k(retrieved_ids: &[String], relevant_ids: &HashSet<String>, k: usize) -> f64 {
    retrieved_ids
        .iter()
        .take(k)
        .any(|id| relevant_ids.contains(id)) as u8 as f64
}

/// Reciprocal rank of the first relevant id within the top k
pub fn mrr_at_k(retrieved_ids: &[String], relevant_ids: &HashSet<String>, k: usize) -> f64 {
    for (rank, id) in retrieved_ids.iter().take(k).enumerate() {
        if relevant_ids.contains(id) {
            return 1.0 / (rank + 1) as f64;
        }
    }
    0.0
}

/// Fraction of the top-k retrieved ids that are relevant
pub fn precision_at_k(retrieved_ids: &[String], relevant_ids: &HashSet<String>, k: usize) -> f64 {
    let top_k: Vec<_> = retrieved_ids.iter().take(k).collect();
    if top_k.is_empty() {
        return 0.0;
    }
    let hits = top_k.iter().filter(|id| relevant_ids.contains(**id)).count();
    hits as f64 / top_k.len() as f64
}

/// Normalized discounted cumulative gain over the top k (binary relevance)
pub fn ndcg_at_k(retrieved_ids: &[String], relevant_ids: &HashSet<String>, k: usize) -> f64 {
    let top_k: Vec<_> = retrieved_ids.iter().take(k).collect();

    let dcg = |ids: &[&String]| -> f64 {
        ids.iter()
            .enumerate()
            .filter(|(_, id)| relevant_ids.contains(**id))
            .map(|(i, _)| 1.0 / ((i + 2) as f64).log2())
            .sum()
    };

    let mut ideal_order = top_k.clone();
    ideal_order.sort_by_key(|id| !relevant_ids.contains(*id));

    let ideal = dcg(&ideal_order);
    if ideal == 0.0 {
        return 0.0;
    }
    dcg(&top_k) / ideal
}

/// ROUGE-L F1: longest common subsequence of whitespace tokens
pub fn rouge_l_f1(reference: &str, prediction: &str) -> f64 {
    let ref_tokens: Vec<&str> = reference.split_whitespace().collect();
    let pred_tokens: Vec<&str> = prediction.split_whitespace().collect();
    if ref_tokens.is_empty() || pred_tokens.is_empty() {
        return 0.0;
    }

    let lcs = lcs_len(&ref_tokens, &pred_tokens) as f64;
    if lcs == 0.0 {
        return 0.0;
    }

    let precision = lcs / pred_tokens.len() as f64;
    let recall = lcs / ref_tokens.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

fn lcs_len(a: &[&str], b: &[&str]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for x in a {
        for (j, y) in b.iter().enumerate() {
            current[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}
