//! LLM-as-judge critique loop.

pub mod runner;
pub mod verdict;

pub use runner::{CycleRecord, JudgeLoop, JudgeRunResult};
pub use verdict::{classify, normalize_feedback, Label, Verdict};
