//! Layered configuration and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys split on `__`, e.g. `APP_RAG__TOP_K=5`). Typed [`Settings`]
//! are extracted once and validated before anything is wired up.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;
use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        tracing::debug!(env = %env_name, "configuration sources merged");

        Ok(Self { figment })
    }

    /// Build from an inline TOML document layered over the defaults.
    pub fn from_toml_str(toml: &str) -> Self {
        Self { figment: Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml)) }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    /// Extract and validate the full typed settings tree.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rag: RagConfig,
    pub embed: EmbedConfig,
    pub llm: LlmConfig,
    pub wiki: WikiConfig,
    pub history: HistoryConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.rag.validate()?;
        if self.embed.batch_size == 0 { return Err(Error::InvalidConfig("embed.batch_size must be greater than zero".into())); }
        if self.embed.concurrency == 0 { return Err(Error::InvalidConfig("embed.concurrency must be greater than zero".into())); }
        if self.history.capacity == 0 { return Err(Error::InvalidConfig("history.capacity must be greater than zero".into())); }
        Ok(())
    }
}

/// Retrieval and synthesis knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub chunk_size: usize,
    pub overlap: usize,
    pub top_k: usize,
    pub context_char_budget: usize,
    pub confidence_floor: f32,
    pub confidence_medium: f32,
    pub confidence_high: f32,
    pub source_preview_chars: Option<usize>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
            top_k: 3,
            context_char_budget: 4000,
            confidence_floor: 0.2,
            confidence_medium: 0.4,
            confidence_high: 0.7,
            source_preview_chars: None,
        }
    }
}

impl RagConfig {
    pub fn chunking(&self) -> Result<ChunkingConfig> { ChunkingConfig::new(self.chunk_size, self.overlap) }

    pub fn validate(&self) -> Result<()> {
        self.chunking()?;
        if self.top_k == 0 { return Err(Error::InvalidConfig("top_k must be greater than zero".into())); }
        if self.context_char_budget == 0 { return Err(Error::InvalidConfig("context_char_budget must be greater than zero".into())); }
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if !in_unit(self.confidence_floor) || !in_unit(self.confidence_medium) || !in_unit(self.confidence_high) {
            return Err(Error::InvalidConfig("confidence thresholds must lie in [0, 1]".into()));
        }
        if self.confidence_medium > self.confidence_high {
            return Err(Error::InvalidConfig(format!(
                "confidence_medium ({}) must not exceed confidence_high ({})",
                self.confidence_medium, self.confidence_high
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// `ollama` or `hash`.
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub batch_size: usize,
    pub concurrency: usize,
    pub query_prefix: String,
    pub document_prefix: String,
    /// Dimensionality of the hash embedder.
    pub dim: usize,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".into(),
            base_url: "http://127.0.0.1:11434".into(),
            model: "nomic-embed-text".into(),
            timeout_secs: 30,
            batch_size: 32,
            concurrency: 4,
            query_prefix: String::new(),
            document_prefix: String::new(),
            dim: 384,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self { base_url: "http://127.0.0.1:11434".into(), model: "llama3.1".into(), timeout_secs: 120, temperature: 0.3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/w/api.php".into(),
            timeout_secs: 15,
            user_agent: concat!("docqa/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// JSONL file to append to; in-memory when unset.
    pub path: Option<String>,
    /// Entries kept by the in-memory log.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self { Self { path: None, capacity: 50 } }
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

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
