//! Retrieval-augmented question answering over a single loaded corpus.
//!
//! [`QueryService`] is the entry point: it owns the [`CorpusManager`] (load,
//! replace, readiness), the [`Retriever`] (question → ranked chunks) and the
//! answer synthesizer, and appends every answered question to the history.

pub mod corpus;
pub mod retriever;
pub mod service;

pub use corpus::{CorpusManager, CorpusStatus};
pub use retriever::Retriever;
pub use service::{QueryService, ServiceParts};
