//! Ollama `/api/embed` client.
//!
//! Large inputs are split into `batch_size` requests issued with bounded
//! concurrency; results are reassembled in input order.

use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use docqa_core::config::EmbedConfig;
use docqa_core::traits::{EmbedMode, Embedder};
use docqa_core::{Error, Result};

pub struct OllamaEmbedder {
    http: reqwest::Client,
    base_url: String,
    model: String,
    batch_size: usize,
    concurrency: usize,
    query_prefix: String,
    document_prefix: String,
    id: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(cfg: &EmbedConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("embedding client: {e}")))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            batch_size: cfg.batch_size.max(1),
            concurrency: cfg.concurrency.max(1),
            query_prefix: cfg.query_prefix.clone(),
            document_prefix: cfg.document_prefix.clone(),
            id: format!("ollama:{}", cfg.model),
        })
    }

    fn prefix(&self, mode: EmbedMode) -> &str {
        match mode {
            EmbedMode::Query => &self.query_prefix,
            EmbedMode::Document => &self.document_prefix,
        }
    }

    async fn request(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let expected = input.len();
        let url = format!("{}/api/embed", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&EmbedRequest { model: &self.model, input })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, url = %url, "embedding service unreachable");
                Error::retrieval(format!("embedding service unreachable: {e}"))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::retrieval(format!("embedding service returned {status}: {body}")));
        }
        let parsed: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| Error::retrieval(format!("malformed embedding response: {e}")))?;
        if parsed.embeddings.len() != expected {
            return Err(Error::retrieval(format!("asked for {expected} embeddings, got {}", parsed.embeddings.len())));
        }
        if parsed.embeddings.iter().any(Vec::is_empty) {
            return Err(Error::retrieval("embedding response contained an empty vector"));
        }
        Ok(parsed.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn embedder_id(&self) -> &str { &self.id }

    async fn embed(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        let prefix = self.prefix(mode);
        let batches: Vec<Vec<String>> = texts
            .chunks(self.batch_size)
            .map(|batch| batch.iter().map(|t| format!("{prefix}{t}")).collect())
            .collect();
        debug!(texts = texts.len(), batches = batches.len(), ?mode, "requesting embeddings");

        let results: Vec<Vec<Vec<f32>>> = stream::iter(batches)
            .map(|batch| self.request(batch))
            .buffered(self.concurrency)
            .try_collect()
            .await?;
        let out: Vec<Vec<f32>> = results.into_iter().flatten().collect();

        let dim = out[0].len();
        if let Some(bad) = out.iter().position(|v| v.len() != dim) {
            return Err(Error::retrieval(format!("embedding {bad} has dim {} (expected {dim})", out[bad].len())));
        }
        Ok(out)
    }
}
