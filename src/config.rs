//! Configuration management for MedQuery
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.medquery/config.toml
//!
//! API credentials never live in the config file; they are read once from
//! the environment (a `.env` file in the working directory is honored).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::{MedQueryError, Result};

pub const PINECONE_API_KEY_VAR: &str = "PINECONE_API_KEY";
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const QDRANT_API_KEY_VAR: &str = "QDRANT_API_KEY";
pub const QDRANT_URL_VAR: &str = "QDRANT_URL";

/// Complete configuration for MedQuery
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub vector_store: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub search: SearchConfig,
    pub model: ModelConfig,
    pub image: ImageConfig,
    pub ingest: IngestConfig,
    pub telemetry: TelemetryConfig,
    pub paths: PathsConfig,
}

/// Which managed vector database backs the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    Pinecone,
    Qdrant,
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorBackend,
    pub index_name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
    pub pinecone_control_url: String,
    pub qdrant_url: String,
}

/// Sentence embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model_id: String,
    pub max_sequence_length: usize,
}

/// Knowledge-base retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub preview_chars: usize,
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub max_results: usize,
    pub timeout_secs: u64,
    pub domains: Vec<String>,
}

/// Generative model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub temperature: f32,
    pub base_url: String,
}

/// Image preprocessing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub max_dimension: u32,
}

/// Offline index population configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub data_dir: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embed_batch_size: usize,
    pub upsert_batch_size: usize,
}

/// Terminal display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub default_verbosity: String,
    pub show_progress_bars: bool,
    pub color_output: bool,
}

/// File system paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state_dir: String,
    pub history_file: String,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorBackend::Pinecone,
            index_name: "medicalbot".to_string(),
            dimension: 384,
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            pinecone_control_url: "https://api.pinecone.io".to_string(),
            qdrant_url: "http://localhost:6334".to_string(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_id: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            max_sequence_length: 256,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            preview_chars: 200,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            max_results: 5,
            timeout_secs: 20,
            domains: crate::search::MEDICAL_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-2.0-flash".to_string(),
            temperature: 0.4,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self { max_dimension: 224 }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: "Data/".to_string(),
            chunk_size: 500,
            chunk_overlap: 20,
            embed_batch_size: 32,
            upsert_batch_size: 100,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_verbosity: "normal".to_string(),
            show_progress_bars: true,
            color_output: true,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: "~/.medquery".to_string(),
            history_file: "~/.medquery/history".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MedQueryError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| MedQueryError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Config::default())
    }

    /// Standard config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".medquery").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.vector_store.index_name.trim().is_empty() {
            return Err(MedQueryError::ConfigError(
                "vector_store.index_name must not be empty".to_string(),
            ));
        }

        if self.vector_store.dimension == 0 {
            return Err(MedQueryError::ConfigError(
                "vector_store.dimension must be greater than 0".to_string(),
            ));
        }

        match self.vector_store.metric.as_str() {
            "cosine" | "euclidean" | "dotproduct" => {}
            other => {
                return Err(MedQueryError::ConfigError(format!(
                    "Invalid vector metric: {}",
                    other
                )))
            }
        }

        if self.retrieval.top_k == 0 {
            return Err(MedQueryError::ConfigError(
                "retrieval.top_k must be greater than 0".to_string(),
            ));
        }

        if self.search.max_results == 0 {
            return Err(MedQueryError::ConfigError(
                "search.max_results must be greater than 0".to_string(),
            ));
        }

        if self.search.timeout_secs == 0 {
            return Err(MedQueryError::ConfigError(
                "search.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(MedQueryError::ConfigError(
                "model.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.image.max_dimension == 0 {
            return Err(MedQueryError::ConfigError(
                "image.max_dimension must be greater than 0".to_string(),
            ));
        }

        if self.ingest.chunk_size == 0 {
            return Err(MedQueryError::ConfigError(
                "ingest.chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(MedQueryError::ConfigError(
                "ingest.chunk_overlap must be less than ingest.chunk_size".to_string(),
            ));
        }

        if self.ingest.embed_batch_size == 0 || self.ingest.upsert_batch_size == 0 {
            return Err(MedQueryError::ConfigError(
                "ingest batch sizes must be greater than 0".to_string(),
            ));
        }

        match self.telemetry.default_verbosity.as_str() {
            "quiet" | "normal" | "verbose" | "very_verbose" => {}
            _ => {
                return Err(MedQueryError::ConfigError(format!(
                    "Invalid verbosity level: {}",
                    self.telemetry.default_verbosity
                )))
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| MedQueryError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MedQueryError::ConfigError(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| MedQueryError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// REPL history file path
    pub fn history_path(&self) -> PathBuf {
        Self::expand_path(&self.paths.history_file)
    }

    /// Directory scanned by `medquery ingest`
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.ingest.data_dir)
    }
}

/// API credentials, read once from the environment at startup
#[derive(Clone, Default)]
pub struct Credentials {
    pub pinecone_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub qdrant_api_key: Option<String>,
    pub qdrant_url: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("pinecone_api_key", &mask(&self.pinecone_api_key))
            .field("google_api_key", &mask(&self.google_api_key))
            .field("qdrant_api_key", &mask(&self.qdrant_api_key))
            .field("qdrant_url", &self.qdrant_url)
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment, loading `.env` first
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            pinecone_api_key: non_empty_var(PINECONE_API_KEY_VAR),
            google_api_key: non_empty_var(GOOGLE_API_KEY_VAR),
            qdrant_api_key: non_empty_var(QDRANT_API_KEY_VAR),
            qdrant_url: non_empty_var(QDRANT_URL_VAR),
        }
    }

    pub fn pinecone(&self) -> Result<&str> {
        self.pinecone_api_key
            .as_deref()
            .ok_or_else(|| MedQueryError::MissingCredential(PINECONE_API_KEY_VAR.to_string()))
    }

    pub fn google(&self) -> Result<&str> {
        self.google_api_key
            .as_deref()
            .ok_or_else(|| MedQueryError::MissingCredential(GOOGLE_API_KEY_VAR.to_string()))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
