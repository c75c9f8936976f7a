//! ragjudge - retrieval-augmented support chatbot with an inline
//! LLM-as-judge critique loop.
//!
//! The serving core answers a question by retrieving passages from a
//! persisted vector index, generating a grounded answer, and optionally
//! running a multi-cycle judge loop that critiques the answer until a
//! verdict sticks or the cycle budget runs out.

pub mod config;
pub mod errors;
pub mod eval;
pub mod index;
pub mod judge;
pub mod models;
pub mod rag;
pub mod server;
pub mod telemetry;

// Re-export commonly used types
pub use errors::{RagError, Result};
