//! Persisted vector index.
//!
//! One JSON file holds the manifest (embedding configuration the index was
//! built with) and the embedded chunks. The index is written by the offline
//! build job and loaded read-only at serving time; search is exact cosine
//! similarity over normalized vectors.

use crate::errors::{RagError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Embedding configuration captured at build time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    pub embedding_model: String,
    pub dimension: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub built_at: DateTime<Utc>,
}

/// One embedded chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub id: String,
    pub text: String,
    pub metadata: Map<String, Value>,
    pub embedding: Vec<f32>,
}

/// A search hit, relevance-descending
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub score: f32,
    pub id: String,
    pub text: String,
    pub metadata: Map<String, Value>,
}

/// In-memory vector index with JSON persistence
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    pub manifest: IndexManifest,
    chunks: Vec<IndexedChunk>,
}

impl VectorIndex {
    pub fn new(manifest: IndexManifest) -> Self {
        Self {
            manifest,
            chunks: Vec::new(),
        }
    }

    /// Add a chunk; its embedding is normalized so search reduces to a dot
    /// product
    pub fn insert(&mut self, mut chunk: IndexedChunk) {
        normalize(&mut chunk.embedding);
        self.chunks.push(chunk);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Top-k most similar chunks for a query embedding
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<SearchHit> {
        let mut query = query.to_vec();
        normalize(&mut query);

        let mut hits: Vec<SearchHit> = self
            .chunks
            .iter()
            .map(|chunk| SearchHit {
                score: dot(&chunk.embedding, &query),
                id: chunk.id.clone(),
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        hits
    }

    /// Serialize to disk, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously saved index
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RagError::IndexNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let index: VectorIndex = serde_json::from_str(&contents)?;
        Ok(index)
    }

    /// Reject an index built with a different embedding model than the
    /// runtime configuration expects
    pub fn verify_embedding_model(&self, configured: &str) -> Result<()> {
        if self.manifest.embedding_model != configured {
            return Err(RagError::IndexMismatch {
                indexed: self.manifest.embedding_model.clone(),
                configured: configured.to_string(),
            });
        }
        Ok(())
    }
}

fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
