//! Ollama API client.
//!
//! Blocking-per-request HTTP client for text completion and embeddings.
//! One invocation per call, no retry: transport failures and non-success
//! statuses surface as errors to the caller.

use crate::config::ModelApi;
use crate::errors::{RagError, Result};
use crate::models::types::{
    ChatMessage, ChatRequest, ChatResponse, EmbeddingsRequest, EmbeddingsResponse,
    GenerateRequest, GenerateResponse, ModelOptions, ModelOutput,
};
use reqwest::Client;
use std::time::Duration;

/// Request timeout. A hung model call is bounded here, at the transport,
/// not in the serving core.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// HTTP client bound to one Ollama model
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    api: ModelApi,
}

impl OllamaClient {
    /// Create a client for the given backend and model
    pub fn new(base_url: &str, model: &str, api: ModelApi) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RagError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api,
        })
    }

    /// Run one completion over the configured endpoint.
    ///
    /// Returns the raw [`ModelOutput`] union; callers normalize with
    /// `into_text` exactly once.
    pub async fn complete(&self, prompt: &str, temperature: Option<f32>) -> Result<ModelOutput> {
        let options = temperature.map(|t| ModelOptions {
            temperature: Some(t),
        });

        match self.api {
            ModelApi::Generate => self.generate(prompt, options).await,
            ModelApi::Chat => self.chat(prompt, options).await,
        }
    }

    async fn generate(&self, prompt: &str, options: Option<ModelOptions>) -> Result<ModelOutput> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let body: GenerateResponse = response.json().await?;
        Ok(ModelOutput::PlainText(body.response))
    }

    async fn chat(&self, prompt: &str, options: Option<ModelOptions>) -> Result<ModelOutput> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
            options,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let body: ChatResponse = response.json().await?;
        Ok(ModelOutput::Message {
            content: body.message.content,
        })
    }

    /// Embed a single text with the configured model
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbeddingsRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let body: EmbeddingsResponse = response.json().await?;
        Ok(body.embedding)
    }

    /// Check if the Ollama server is reachable
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn status_error(response: reqwest::Response) -> RagError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        RagError::OllamaApi(format!("HTTP {}: {}", status, body))
    }

    /// Model name this client is bound to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
