use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use docqa_core::chunker::{chunk_text, ChunkingConfig};
use docqa_core::traits::Embedder;
use docqa_core::types::Corpus;
use docqa_core::{Error, Result};
use docqa_vector::VectorIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusStatus {
    pub ready: bool,
    pub label: Option<String>,
    pub chunks: usize,
}

/// Owns the lifecycle of the active corpus.
///
/// Loads are serialized by `load_lock`, which is separate from the index's
/// snapshot lock: queries keep running against the previous corpus while a
/// new one is being chunked and embedded.
pub struct CorpusManager {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    load_lock: Mutex<()>,
}

impl CorpusManager {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>) -> Self {
        Self { embedder, index, load_lock: Mutex::new(()) }
    }

    /// Chunk, embed and swap in `raw_text` as the active corpus.
    ///
    /// Fails with `EmptyCorpus` when chunking yields nothing; the previous
    /// corpus stays active on any failure.
    pub async fn load_from_text(&self, source_label: &str, raw_text: &str, chunking: &ChunkingConfig) -> Result<Arc<Corpus>> {
        let texts = chunk_text(raw_text, chunking);
        if texts.is_empty() { return Err(Error::EmptyCorpus); }
        let digest = blake3::hash(raw_text.as_bytes()).to_hex().to_string();

        let _guard = self.load_lock.lock().await;
        info!(label = source_label, chunks = texts.len(), embedder = self.embedder.embedder_id(), "embedding corpus");
        let embeddings = self.embedder.embed_batch(&texts).await?;
        let corpus = Corpus::new(source_label, texts, embeddings, digest)?;
        Ok(self.index.load(corpus))
    }

    /// Whether a non-empty corpus is loaded. Gates every query.
    pub fn is_ready(&self) -> bool { !self.index.is_empty() }

    pub fn current_label(&self) -> Option<String> { self.index.snapshot().map(|c| c.source_label().to_string()) }

    pub fn current(&self) -> Option<Arc<Corpus>> { self.index.snapshot() }

    pub fn status(&self) -> CorpusStatus {
        match self.index.snapshot() {
            Some(c) => CorpusStatus { ready: true, label: Some(c.source_label().to_string()), chunks: c.len() },
            None => CorpusStatus { ready: false, label: None, chunks: 0 },
        }
    }

    /// Drop the active corpus. Waits for any in-progress load to finish first.
    pub async fn clear(&self) {
        let _guard = self.load_lock.lock().await;
        if let Some(old) = self.index.clear() {
            info!(label = old.source_label(), "corpus cleared");
        }
    }
}
