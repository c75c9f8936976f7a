//! Model invocation layer.
//!
//! The serving core talks to models through the [`TextCompletion`] and
//! [`Embedder`] traits so any text-completion backend can stand in; the
//! shipped implementation is the Ollama HTTP client.

pub mod client;
pub mod types;

pub use client::OllamaClient;
pub use types::ModelOutput;

use crate::errors::Result;
use async_trait::async_trait;

/// A synchronous (one call, one response) text-completion backend
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Complete a prompt, optionally overriding the sampling temperature
    async fn complete(&self, prompt: &str, temperature: Option<f32>) -> Result<ModelOutput>;
}

/// A text embedding backend
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text into a vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[async_trait]
impl TextCompletion for OllamaClient {
    async fn complete(&self, prompt: &str, temperature: Option<f32>) -> Result<ModelOutput> {
        OllamaClient::complete(self, prompt, temperature).await
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        OllamaClient::embed(self, text).await
    }
}
