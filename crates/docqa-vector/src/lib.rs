//! In-memory vector index over the active corpus.
//!
//! Embeddings are L2-normalized when the corpus is built, and similarity is
//! cosine. Only whole-corpus replacement is supported.

pub mod index;
pub mod similarity;

pub use index::{search_corpus, VectorIndex};
