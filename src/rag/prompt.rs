//! Prompt builders.
//!
//! Pure functions: identical inputs produce byte-identical prompts.

use crate::rag::types::Passage;

/// Fixed system instruction wrapped around every answer prompt
const SYSTEM_INSTRUCTION: &str = "\
You are a customer support chatbot for a document-grounded help desk.
Use only the information in <context> to answer.

Rules:
1) Use ONLY the provided <context> to answer.
2) If the answer is not in the context, say:
   \"I don't know based on the retrieved documents.\"
3) Be concise and accurate. Prefer quoting key phrases from the context.";

/// Join passage texts in retrieval order, separated by a blank line
pub fn context_block(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Compose the grounded answer prompt.
///
/// An empty passage sequence yields an empty context block; the instruction's
/// fallback rule governs the model's behavior in that case.
pub fn build_answer_prompt(question: &str, passages: &[Passage]) -> String {
    let context = context_block(passages);
    format!(
        "{SYSTEM_INSTRUCTION}\n\n<context>\n{context}\n</context>\n\nUser question: {question}\n"
    )
}

/// Compose the judge prompt for a candidate answer.
///
/// `context` is the blank-line join of the full-text retrieved passages, not
/// the truncated previews.
pub fn build_critique_prompt(context: &str, answer: &str) -> String {
    format!(
        "You are an impartial judge.\n\
         Evaluate whether the assistant's answer correctly fulfills the user's request in context.\n\
         \n\
         Reply with exactly one of these labels, no extra text:\n\
         \n\
         CORRECT\n\
         HALLUCINATION\n\
         INCOMPLETE\n\
         \n\
         === CONTEXT ===\n\
         {context}\n\
         \n\
         === ASSISTANT ANSWER ===\n\
         {answer}\n\
         \n\
         LABEL:\n"
    )
}
