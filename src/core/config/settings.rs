use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::paths::AppPaths;
use super::validation::{validate_config, ConfigError};

/// Typed view of the merged `config.yml` + `secrets.yaml` + environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub search: SearchSettings,
    pub rag: RagSettings,
    pub shell: ShellSettings,
    pub server: ServerSettings,
    pub secrets: Secrets,
}

impl Settings {
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        validate_config(value)?;
        serde_json::from_value(value.clone()).map_err(|err| ConfigError::Invalid {
            path: "root".to_string(),
            message: err.to_string(),
        })
    }

    pub fn index_path(&self, paths: &AppPaths) -> PathBuf {
        self.rag
            .index_path
            .clone()
            .unwrap_or_else(|| paths.index_path.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub draft_model: String,
    pub refine_model: String,
    pub classifier_model: String,
    pub timeout_secs: Option<u64>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai".to_string(),
            draft_model: "llama-3.3-70b-versatile".to_string(),
            refine_model: "qwen/qwen3-32b".to_string(),
            classifier_model: "llama-3.1-8b-instant".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub base_url: String,
    pub model: String,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            batch_size: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub endpoint: String,
    pub max_snippets: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://google.serper.dev/search".to_string(),
            max_snippets: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    pub index_path: Option<PathBuf>,
    pub top_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            index_path: None,
            top_k: 5,
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    pub topic_gate: bool,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self { topic_gate: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Secrets {
    pub web_search_api_key: Option<String>,
    pub llm_api_key: Option<String>,
    pub embedding_api_key: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |value: &Option<String>| value.as_ref().map(|_| "****");
        f.debug_struct("Secrets")
            .field("web_search_api_key", &mask(&self.web_search_api_key))
            .field("llm_api_key", &mask(&self.llm_api_key))
            .field("embedding_api_key", &mask(&self.embedding_api_key))
            .finish()
    }
}
