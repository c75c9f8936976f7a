//! Service configuration.
//!
//! One explicit `Config` value is loaded at startup and passed by reference
//! into each component constructor. Nothing in the call graph reads ambient
//! global state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub judge: JudgeConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Model backend settings for the generator and the judge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Generation model name
    pub generator: String,
    /// Judge model name
    pub judge: String,
    /// Sampling temperature for answer generation
    pub temperature: f32,
    /// Sampling temperature for the judge (deterministic by default)
    pub judge_temperature: f32,
    /// Which Ollama API the clients speak
    pub api: ModelApi,
}

/// Ollama exposes two completion endpoints with different response shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelApi {
    /// POST /api/generate, plain-text response
    Generate,
    /// POST /api/chat, message-wrapped response
    Chat,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            generator: "gemma3:1b".to_string(),
            judge: "gemma3:1b".to_string(),
            temperature: 0.1,
            judge_temperature: 0.0,
            api: ModelApi::Generate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default number of passages per question
    pub top_k: usize,
    /// Passage text is truncated to this many characters in response payloads
    pub preview_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            preview_chars: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Critique cycle budget per question
    pub max_cycles: u32,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self { max_cycles: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory scanned for source documents at build time
    pub data_dir: PathBuf,
    /// Where the serialized index lives
    pub index_path: PathBuf,
    /// Embedding model used to build and query the index
    pub embedding_model: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            index_path: PathBuf::from("data/index.json"),
            embedding_model: "nomic-embed-text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, creating a default file
    /// when none exists
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".ragjudge").join("config.toml"))
    }

    /// Resolve a per-request top_k override against the configured default.
    /// A non-positive override falls back to the default rather than
    /// silently retrieving nothing.
    pub fn resolve_top_k(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|k| *k > 0)
            .unwrap_or(self.retrieval.top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.preview_chars, 300);
        assert_eq!(config.judge.max_cycles, 3);
        assert_eq!(config.chunking.chunk_size, 512);
        assert_eq!(config.chunking.chunk_overlap, 64);
        assert_eq!(config.models.api, ModelApi::Generate);
    }

    #[test]
    fn test_resolve_top_k() {
        let config = Config::default();
        assert_eq!(config.resolve_top_k(None), 5);
        assert_eq!(config.resolve_top_k(Some(2)), 2);
        assert_eq!(config.resolve_top_k(Some(0)), 5);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.models.generator = "llama3.1:8b".to_string();
        config.judge.max_cycles = 5;

        let toml_string = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.models.generator, "llama3.1:8b");
        assert_eq!(parsed.judge.max_cycles, 5);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.retrieval.top_k, 5);

        // Second load reads the file it just wrote
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.retrieval.top_k, config.retrieval.top_k);
    }
}
