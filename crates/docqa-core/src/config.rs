//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (nested keys separated by `__`, e.g. `APP_LLM__MODEL`).
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;

/// Typed view of every tunable the pipeline reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API credential.
    pub api_key_env: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
            api_key_env: "GOOGLE_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Local,
    Fake,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    pub model_dir: String,
    pub max_len: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Local,
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
            max_len: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    pub top_k: usize,
    /// Number of leading chunks used as context when no retriever could be built.
    pub fallback_context_chunks: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5, fallback_context_chunks: 3 }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be positive".into()));
        }
        if self.chunking.chunk_overlap > self.chunking.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.chunk_overlap ({}) is larger than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::InvalidConfig(format!(
                "llm.temperature must be within [0, 2], got {}",
                self.llm.temperature
            )));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
    settings: Settings,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let settings: Settings = figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        tracing::debug!(env = env_name, ?settings, "configuration loaded");
        Ok(Self { figment, settings })
    }

    /// Configuration built from defaults only, without reading files or env.
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        settings.validate()?;
        let figment = Figment::from(Serialized::defaults(settings.clone()));
        Ok(Self { figment, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
