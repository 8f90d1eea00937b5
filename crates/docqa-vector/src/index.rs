use std::sync::{Arc, RwLock};

use docqa_core::types::{Corpus, RetrievalResult};
use docqa_core::{Error, Result};

use crate::similarity::{cosine_similarity, l2_norm};

/// Holds the active corpus as an immutable snapshot.
///
/// `load` swaps the whole `Arc<Corpus>`; the lock is only held for the pointer
/// clone or replace, never while embedding or searching. A reader that grabbed
/// a snapshot keeps searching it even if a newer corpus is loaded meanwhile.
#[derive(Default)]
pub struct VectorIndex {
    current: RwLock<Option<Arc<Corpus>>>,
}

impl VectorIndex {
    pub fn new() -> Self { Self::default() }

    /// Replace any existing content. Returns the snapshot now being served.
    pub fn load(&self, corpus: Corpus) -> Arc<Corpus> {
        let snapshot = Arc::new(corpus);
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.replace(Arc::clone(&snapshot))
        };
        tracing::info!(
            label = snapshot.source_label(),
            chunks = snapshot.len(),
            dim = snapshot.dim(),
            replaced = previous.as_ref().map(|p| p.source_label()),
            "vector index loaded"
        );
        snapshot
    }

    pub fn snapshot(&self) -> Option<Arc<Corpus>> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn clear(&self) -> Option<Arc<Corpus>> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner()).take()
    }

    pub fn len(&self) -> usize { self.snapshot().map_or(0, |c| c.len()) }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Search whatever snapshot is current. An empty index yields no results.
    pub fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<RetrievalResult>> {
        match self.snapshot() {
            Some(corpus) => search_corpus(&corpus, query_vector, k),
            None => Ok(Vec::new()),
        }
    }
}

/// Rank every chunk of `corpus` by cosine similarity to `query_vector`.
///
/// Results are sorted by descending score; equal scores keep chunk order
/// (lower ordinal first). At most `k` results are returned.
pub fn search_corpus(corpus: &Corpus, query_vector: &[f32], k: usize) -> Result<Vec<RetrievalResult>> {
    if query_vector.len() != corpus.dim() {
        return Err(Error::retrieval(format!(
            "query embedding dims do not match index dims (index={}, query={})",
            corpus.dim(),
            query_vector.len()
        )));
    }
    let qnorm = l2_norm(query_vector);
    let mut hits: Vec<RetrievalResult> = corpus
        .chunks()
        .iter()
        .map(|chunk| {
            let score = cosine_similarity(query_vector, &chunk.embedding, qnorm, l2_norm(&chunk.embedding));
            RetrievalResult { chunk: Arc::clone(chunk), score: if score.is_nan() { 0.0 } else { score } }
        })
        .collect();

    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.chunk.id.cmp(&b.chunk.id)));
    hits.truncate(k);
    Ok(hits)
}
