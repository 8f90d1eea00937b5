use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Article, DocumentFormat, HistoryEntry};

/// Which side of a retrieval pair a text is embedded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
    Document,
    Query,
}

/// Maps text into a fixed-dimension dense vector space.
///
/// Implementations must return one vector per input, in input order, all of
/// the same dimensionality, and must be deterministic for a fixed model.
/// Transport or decoding failures map to `Error::RetrievalUnavailable`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model, e.g. `ollama:nomic-embed-text`.
    fn embedder_id(&self) -> &str;

    async fn embed(&self, texts: &[String], mode: EmbedMode) -> Result<Vec<Vec<f32>>>;

    /// Embed corpus chunks.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed(texts, EmbedMode::Document).await
    }

    /// Embed a single incoming question.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut out = self.embed(&[text.to_string()], EmbedMode::Query).await?;
        out.pop().ok_or_else(|| crate::Error::retrieval("embedder returned no vector for query"))
    }
}

/// Free-text generation from a prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    fn model_id(&self) -> &str;
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, raw: &[u8], format: &DocumentFormat) -> Result<String>;
}

#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_article(&self, topic: &str) -> Result<Article>;
}

/// Append-only question/answer log shared with the presentation layer.
pub trait HistoryStore: Send + Sync {
    fn append(&self, entry: HistoryEntry) -> Result<()>;
    /// Most recent first.
    fn list_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>>;
    fn len(&self) -> Result<usize>;
    fn clear(&self) -> Result<()>;
}
