//! Retrieval-augmented answer generation.

pub mod pipeline;
pub mod prompt;
pub mod retrieval;
pub mod types;

pub use pipeline::{AskOutcome, RagPipeline};
pub use retrieval::{Retriever, VectorRetriever};
pub use types::{AnswerRecord, Passage};
