//! Answer synthesis over retrieved chunks.
//!
//! `prompt` assembles the bounded grounding prompt, `ollama` is the HTTP
//! generator, and `synthesizer` ties them together with the retrieval-based
//! confidence policy.

pub mod ollama;
pub mod prompt;
pub mod synthesizer;

pub use ollama::OllamaGenerator;
pub use synthesizer::{AnswerSynthesizer, ConfidencePolicy, SynthesisConfig, NO_CONTEXT_ANSWER};
