//! Judge output normalization and classification.

use serde::{Deserialize, Serialize};

/// Classification of one judge reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Hallucination,
    Incomplete,
    /// Reply matched none of the known tokens; the cycle is recorded as
    /// not-correct and neither streak counter moves
    Unrecognized,
}

/// Terminal outcome of a judge run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Correct,
    Hallucination,
    Incomplete,
    MaxCycles,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Correct => "CORRECT",
            Label::Hallucination => "HALLUCINATION",
            Label::Incomplete => "INCOMPLETE",
            Label::MaxCycles => "MAX_CYCLES",
        }
    }
}

/// Normalize raw judge output: trim, uppercase, and when a `LABEL:` marker
/// is present keep only what follows its last occurrence.
pub fn normalize_feedback(raw: &str) -> String {
    let text = raw.trim().to_uppercase();
    match text.rfind("LABEL:") {
        Some(pos) => text[pos + "LABEL:".len()..].trim().to_string(),
        None => text,
    }
}

/// Classify normalized judge text.
///
/// CORRECT accepts substring matches as long as neither other token appears;
/// HALLUCINATION and INCOMPLETE require exact equality. The asymmetry is
/// deliberate: a chatty verdict mentioning hallucination must not terminate
/// the loop on its own.
pub fn classify(text: &str) -> Verdict {
    let is_correct = text == "CORRECT"
        || (text.contains("CORRECT")
            && !text.contains("HALLUCINATION")
            && !text.contains("INCOMPLETE"));

    if is_correct {
        Verdict::Correct
    } else if text == "HALLUCINATION" {
        Verdict::Hallucination
    } else if text == "INCOMPLETE" {
        Verdict::Incomplete
    } else {
        Verdict::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tokens_classify() {
        assert_eq!(classify("CORRECT"), Verdict::Correct);
        assert_eq!(classify("HALLUCINATION"), Verdict::Hallucination);
        assert_eq!(classify("INCOMPLETE"), Verdict::Incomplete);
    }

    #[test]
    fn test_case_and_whitespace_normalized() {
        assert_eq!(classify(&normalize_feedback("  correct \n")), Verdict::Correct);
        assert_eq!(
            classify(&normalize_feedback("hallucination")),
            Verdict::Hallucination
        );
    }

    #[test]
    fn test_correct_substring_rule() {
        let text = normalize_feedback("CORRECT, the answer is well-grounded");
        assert_eq!(classify(&text), Verdict::Correct);
    }

    #[test]
    fn test_hallucination_requires_exact_match() {
        let text = normalize_feedback("HALLUCINATION DETECTED");
        assert_eq!(classify(&text), Verdict::Unrecognized);
    }

    #[test]
    fn test_mixed_tokens_unrecognized() {
        assert_eq!(
            classify("CORRECT BUT INCOMPLETE IN PLACES"),
            Verdict::Unrecognized
        );
    }

    #[test]
    fn test_label_marker_keeps_last_segment() {
        let normalized = normalize_feedback("Reasoning...\nLABEL: hallucination");
        assert_eq!(normalized, "HALLUCINATION");
        assert_eq!(classify(&normalized), Verdict::Hallucination);
    }

    #[test]
    fn test_label_marker_last_occurrence_wins() {
        let normalized = normalize_feedback("LABEL: INCOMPLETE\nLABEL: CORRECT");
        assert_eq!(normalized, "CORRECT");
    }

    #[test]
    fn test_trailing_label_marker_is_unrecognized() {
        let normalized = normalize_feedback("Some musing ending in LABEL:");
        assert_eq!(normalized, "");
        assert_eq!(classify(&normalized), Verdict::Unrecognized);
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(serde_json::to_string(&Label::Correct).unwrap(), "\"CORRECT\"");
        assert_eq!(
            serde_json::to_string(&Label::MaxCycles).unwrap(),
            "\"MAX_CYCLES\""
        );
        assert_eq!(Label::Hallucination.as_str(), "HALLUCINATION");
    }
}
