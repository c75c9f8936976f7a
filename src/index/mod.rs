//! Offline ingestion and the persisted vector index.
//!
//! Everything here runs as a one-time batch job (`ragjudge build-index`)
//! except [`store::VectorIndex`], which the serving path loads read-only.

pub mod builder;
pub mod chunker;
pub mod loader;
pub mod store;

pub use builder::IndexBuilder;
pub use chunker::TextChunker;
pub use store::{IndexManifest, IndexedChunk, SearchHit, VectorIndex};
