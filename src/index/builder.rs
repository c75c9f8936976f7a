//! Offline index build: load documents, chunk, embed, persist.

use crate::config::Config;
use crate::errors::{RagError, Result};
use crate::index::chunker::TextChunker;
use crate::index::loader::load_documents;
use crate::index::store::{IndexManifest, IndexedChunk, VectorIndex};
use crate::models::Embedder;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub struct IndexBuilder {
    embedder: Arc<dyn Embedder>,
    config: Config,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn Embedder>, config: &Config) -> Self {
        Self {
            embedder,
            config: config.clone(),
        }
    }

    /// Build the index from the configured data directory.
    ///
    /// Chunk ids are derived from source, page and position so repeated
    /// builds over the same corpus produce the same ids.
    pub async fn build(&self) -> Result<VectorIndex> {
        let documents = load_documents(&self.config.index.data_dir)?;
        if documents.is_empty() {
            return Err(RagError::Config(format!(
                "no documents found in {}",
                self.config.index.data_dir.display()
            )));
        }

        let chunker = TextChunker::new(
            self.config.chunking.chunk_size,
            self.config.chunking.chunk_overlap,
        );
        let chunks = chunker.chunk_documents(&documents);
        info!(documents = documents.len(), chunks = chunks.len(), "corpus chunked");

        let mut dimension = 0;
        let mut index = VectorIndex::new(IndexManifest {
            embedding_model: self.config.index.embedding_model.clone(),
            dimension,
            chunk_size: self.config.chunking.chunk_size,
            chunk_overlap: self.config.chunking.chunk_overlap,
            built_at: Utc::now(),
        });

        for (position, chunk) in chunks.iter().enumerate() {
            let embedding = self.embedder.embed(&chunk.text).await?;

            if dimension == 0 {
                dimension = embedding.len();
            } else if embedding.len() != dimension {
                return Err(RagError::OllamaApi(format!(
                    "embedding dimension changed mid-build: got {}, expected {}",
                    embedding.len(),
                    dimension
                )));
            }

            let source = chunk.metadata.get("source").and_then(|v| v.as_str()).unwrap_or("unknown");
            let page = chunk.metadata.get("page_number").and_then(|v| v.as_u64()).unwrap_or(0);

            index.insert(IndexedChunk {
                id: format!("{}#p{}-c{}", source, page, position),
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
                embedding,
            });
        }

        index.manifest.dimension = dimension;
        info!(chunks = index.len(), dimension, "index built");
        Ok(index)
    }

    /// Build and persist to the configured index path
    pub async fn build_and_save(&self) -> Result<VectorIndex> {
        let index = self.build().await?;
        index.save(&self.config.index.index_path)?;
        info!(path = %self.config.index.index_path.display(), "index saved");
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs;

    /// Deterministic fake embedder: vector derived from text length
    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let len = text.chars().count() as f32;
            Ok(vec![len, 1.0, 0.0])
        }
    }

    fn test_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.index.data_dir = dir.join("data");
        config.index.index_path = dir.join("data/index.json");
        config
    }

    #[tokio::test]
    async fn test_build_empty_corpus_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.index.data_dir).unwrap();

        let builder = IndexBuilder::new(Arc::new(FakeEmbedder), &config);
        let err = builder.build().await.unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[tokio::test]
    async fn test_build_and_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.index.data_dir).unwrap();
        fs::write(config.index.data_dir.join("faq.txt"), "Returns take 14 days.").unwrap();

        let builder = IndexBuilder::new(Arc::new(FakeEmbedder), &config);
        let index = builder.build_and_save().await.unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.manifest.dimension, 3);

        let loaded = VectorIndex::load(&config.index.index_path).unwrap();
        assert_eq!(loaded.len(), 1);
        loaded
            .verify_embedding_model(&config.index.embedding_model)
            .unwrap();
    }
}
