//! Retrieval seam.
//!
//! The pipeline depends on the [`Retriever`] trait only; the shipped
//! implementation embeds the query and searches the loaded vector index.

use crate::errors::{RagError, Result};
use crate::index::VectorIndex;
use crate::models::Embedder;
use crate::rag::types::Passage;
use async_trait::async_trait;
use std::sync::Arc;

/// Ordered passage retrieval for a query.
///
/// Implementations return up to `top_k` passages, most relevant first, and
/// are expected to be deterministic for identical inputs absent index
/// changes.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Passage>>;
}

/// Cosine-similarity retriever over the persisted index
pub struct VectorRetriever {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
}

impl VectorRetriever {
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Passage>> {
        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| RagError::Retrieval(e.to_string()))?;

        let passages = self
            .index
            .search(&embedding, top_k)
            .into_iter()
            .map(|hit| Passage::new(hit.text, hit.metadata))
            .collect();

        Ok(passages)
    }
}
