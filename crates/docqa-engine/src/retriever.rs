use std::sync::Arc;

use docqa_core::traits::Embedder;
use docqa_core::types::RetrievalResult;
use docqa_core::{Error, Result};
use docqa_vector::{search_corpus, VectorIndex};

/// Embeds a question and ranks the loaded corpus against it.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<VectorIndex>) -> Self { Self { embedder, index } }

    /// Top-`k` chunks for `question`, best first.
    ///
    /// The snapshot is captured before the embedding call so the whole query
    /// runs against one corpus even if a reload lands meanwhile. No corpus is
    /// reported as `RetrievalUnavailable`; with a corpus loaded the result is
    /// never empty.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        let question = question.trim();
        if question.is_empty() { return Err(Error::InvalidRequest("question must not be empty".into())); }
        let Some(corpus) = self.index.snapshot() else {
            return Err(Error::retrieval("no corpus loaded; load a document or topic first"));
        };
        let query_vector = self.embedder.embed_one(question).await?;
        let hits = search_corpus(&corpus, &query_vector, k.max(1))?;
        tracing::debug!(label = corpus.source_label(), k, hits = hits.len(), top = hits.first().map(|h| h.score), "retrieved");
        Ok(hits)
    }
}
