//! Domain types shared by the chunker, index, retriever and synthesizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ordinal position of a chunk within its source text.
pub type ChunkId = usize;

/// A contiguous window of source words together with its embedding.
///
/// Chunks are immutable once built and shared by `Arc` between the index
/// snapshot and any in-flight retrieval results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// The single loaded document or topic, ready for querying.
///
/// Construct through [`Corpus::new`], which refuses empty chunk lists, checks
/// that every embedding has the same dimensionality and L2-normalizes them.
#[derive(Debug, Clone)]
pub struct Corpus {
    source_label: String,
    chunks: Vec<Arc<Chunk>>,
    created_at: DateTime<Utc>,
    digest: String,
    dim: usize,
}

impl Corpus {
    pub fn new(source_label: impl Into<String>, texts: Vec<String>, embeddings: Vec<Vec<f32>>, digest: impl Into<String>) -> crate::Result<Self> {
        if texts.is_empty() { return Err(crate::Error::EmptyCorpus); }
        if texts.len() != embeddings.len() {
            return Err(crate::Error::retrieval(format!("expected {} embeddings, got {}", texts.len(), embeddings.len())));
        }
        let dim = embeddings[0].len();
        if dim == 0 { return Err(crate::Error::retrieval("embedding service returned empty vectors")); }
        let mut chunks = Vec::with_capacity(texts.len());
        for (id, (text, mut embedding)) in texts.into_iter().zip(embeddings).enumerate() {
            if embedding.len() != dim {
                return Err(crate::Error::retrieval(format!("chunk {id} has dim {} (expected {dim})", embedding.len())));
            }
            l2_normalize(&mut embedding);
            chunks.push(Arc::new(Chunk { id, text, embedding }));
        }
        Ok(Self { source_label: source_label.into(), chunks, created_at: Utc::now(), digest: digest.into(), dim })
    }

    pub fn source_label(&self) -> &str { &self.source_label }
    pub fn chunks(&self) -> &[Arc<Chunk>] { &self.chunks }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn digest(&self) -> &str { &self.digest }
    pub fn dim(&self) -> usize { self.dim }
    pub fn len(&self) -> usize { self.chunks.len() }

    /// Always false for a constructed corpus; present for API symmetry.
    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }
}

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        for x in v.iter_mut() { *x /= norm; }
    }
}

/// A question as received, before retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub question: String,
    pub asked_at: DateTime<Utc>,
}

impl Query {
    pub fn new(question: impl Into<String>) -> Self { Self { question: question.into(), asked_at: Utc::now() } }
}

/// One ranked hit. `score` is the cosine similarity in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub chunk: Arc<Chunk>,
    pub score: f32,
}

/// Three-tier bucket over the retrieval confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// A grounded answer with the sources that were placed in the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// Chunk texts as they appeared in the prompt, best first. A block cut
    /// by the context budget is cited in its cut form.
    pub sources: Vec<String>,
    pub confidence: f32,
    pub level: ConfidenceLevel,
    pub low_confidence: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
    pub sources: Vec<String>,
    pub confidence: f32,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_answer(query: &Query, answer: &Answer) -> Self {
        Self {
            question: query.question.clone(),
            answer: answer.text.clone(),
            sources: answer.sources.clone(),
            confidence: answer.confidence,
            timestamp: query.asked_at,
        }
    }
}

/// Plain text of a fetched encyclopedia article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub text: String,
}

/// Declared format of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Markdown,
    Pdf,
    Other(String),
}

impl DocumentFormat {
    /// Infer the format from a filename extension (case-insensitive).
    pub fn from_filename(name: &str) -> Self {
        let ext = std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "txt" | "text" => Self::PlainText,
            "md" | "markdown" => Self::Markdown,
            "pdf" => Self::Pdf,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Outcome of replacing the active corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub label: String,
    pub chunks: usize,
    pub digest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub ready: bool,
    pub label: Option<String>,
    pub chunks: usize,
    pub history_count: usize,
}
