use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use docqa_core::config::LlmConfig;
use docqa_core::traits::Generator;
use docqa_core::{Error, Result};

/// Non-streaming client for Ollama's `/api/generate`.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaGenerator {
    pub fn new(cfg: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("generation client: {e}")))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn model_id(&self) -> &str { &self.model }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let req = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature: self.temperature },
        };

        let resp = self
            .http
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| Error::generation(format!("failed to call generate endpoint: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::generation(format!("generate request failed: status={status} body={body}")));
        }
        let v: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| Error::generation(format!("failed to decode generate response: {e}")))?;
        if v.response.trim().is_empty() {
            return Err(Error::generation("generate response was empty"));
        }
        Ok(v.response)
    }
}
