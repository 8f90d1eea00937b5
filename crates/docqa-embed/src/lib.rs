//! Embedding adapters.
//!
//! `OllamaEmbedder` talks to a local or remote Ollama server; `HashEmbedder`
//! is a deterministic stand-in for tests and offline development. Set
//! `APP_USE_FAKE_EMBEDDINGS=1` to force the hash embedder regardless of config.

use std::sync::Arc;

use docqa_core::config::EmbedConfig;
use docqa_core::traits::Embedder;
use docqa_core::{Error, Result};

pub mod hash;
pub mod ollama;

pub use hash::HashEmbedder;
pub use ollama::OllamaEmbedder;

fn fake_forced() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Build the embedder named by `cfg.provider`.
pub fn build_embedder(cfg: &EmbedConfig) -> Result<Arc<dyn Embedder>> {
    if fake_forced() {
        tracing::info!(dim = cfg.dim, "using hash embedder (APP_USE_FAKE_EMBEDDINGS)");
        return Ok(Arc::new(HashEmbedder::new(cfg.dim)));
    }
    match cfg.provider.as_str() {
        "ollama" => {
            tracing::info!(model = %cfg.model, base_url = %cfg.base_url, "using ollama embedder");
            Ok(Arc::new(OllamaEmbedder::new(cfg)?))
        }
        "hash" | "fake" => Ok(Arc::new(HashEmbedder::new(cfg.dim))),
        other => Err(Error::InvalidConfig(format!("unknown embed.provider '{other}'"))),
    }
}
