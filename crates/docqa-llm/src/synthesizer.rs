use std::sync::Arc;

use tracing::{debug, info};

use docqa_core::config::RagConfig;
use docqa_core::traits::Generator;
use docqa_core::types::{Answer, ConfidenceLevel, RetrievalResult};
use docqa_core::Result;

use crate::prompt::grounding_prompt;

pub const NO_CONTEXT_ANSWER: &str = "I couldn't find relevant information to answer your question.";

/// Thresholds that turn retrieval similarity into a confidence figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidencePolicy {
    pub floor: f32,
    pub medium: f32,
    pub high: f32,
}

impl Default for ConfidencePolicy {
    fn default() -> Self { Self { floor: 0.2, medium: 0.4, high: 0.7 } }
}

impl ConfidencePolicy {
    /// Top-1 similarity clamped to `[0, 1]`; zero below the floor or when
    /// there is no score at all.
    pub fn confidence(&self, top_score: Option<f32>) -> f32 {
        match top_score {
            Some(s) if !s.is_nan() && s >= self.floor => s.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    pub fn level(&self, confidence: f32) -> ConfidenceLevel {
        if confidence >= self.high {
            ConfidenceLevel::High
        } else if confidence >= self.medium {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub context_char_budget: usize,
    pub source_preview_chars: Option<usize>,
    pub confidence: ConfidencePolicy,
}

impl Default for SynthesisConfig {
    fn default() -> Self { Self::from(&RagConfig::default()) }
}

impl From<&RagConfig> for SynthesisConfig {
    fn from(rag: &RagConfig) -> Self {
        Self {
            context_char_budget: rag.context_char_budget,
            source_preview_chars: rag.source_preview_chars,
            confidence: ConfidencePolicy { floor: rag.confidence_floor, medium: rag.confidence_medium, high: rag.confidence_high },
        }
    }
}

/// Builds the grounding prompt, calls the generator and scores the answer.
///
/// Confidence is taken from retrieval similarity only; the generator's text
/// has no say in it.
pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
    config: SynthesisConfig,
}

impl AnswerSynthesizer {
    pub fn new(generator: Arc<dyn Generator>, config: SynthesisConfig) -> Self { Self { generator, config } }

    pub fn config(&self) -> &SynthesisConfig { &self.config }

    /// Results are borrowed so a failed generation can be retried with the
    /// same retrieval.
    pub async fn synthesize(&self, question: &str, results: &[RetrievalResult]) -> Result<Answer> {
        let policy = self.config.confidence;
        let prompt = grounding_prompt(question, results, self.config.context_char_budget);
        if prompt.placed.is_empty() {
            debug!("no retrieval results; skipping generation");
            return Ok(Answer {
                text: NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: 0.0,
                level: ConfidenceLevel::Low,
                low_confidence: true,
            });
        }

        debug!(model = self.generator.model_id(), used = prompt.used(), context_chars = prompt.context_chars, "invoking generator");
        let text = self.generator.generate(&prompt.text).await?;

        let confidence = policy.confidence(results.first().map(|r| r.score));
        let level = policy.level(confidence);
        let sources: Vec<String> = prompt.placed.iter().map(|t| self.preview(t)).collect();
        info!(confidence, ?level, sources = sources.len(), "answer synthesized");
        Ok(Answer { text, sources, confidence, level, low_confidence: level == ConfidenceLevel::Low })
    }

    fn preview(&self, text: &str) -> String {
        match self.config.source_preview_chars {
            Some(max) if text.chars().count() > max => {
                let mut s: String = text.chars().take(max).collect();
                s.push_str("...");
                s
            }
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_monotonic_in_top_score() {
        let p = ConfidencePolicy::default();
        let mut prev = p.confidence(Some(-1.0));
        let mut s = -1.0f32;
        while s <= 1.0 {
            let c = p.confidence(Some(s));
            assert!(c >= prev, "confidence dropped at score {s}");
            assert!((0.0..=1.0).contains(&c));
            prev = c;
            s += 0.01;
        }
    }

    #[test]
    fn below_floor_or_missing_is_zero() {
        let p = ConfidencePolicy { floor: 0.3, medium: 0.4, high: 0.7 };
        assert_eq!(p.confidence(Some(0.29)), 0.0);
        assert_eq!(p.confidence(None), 0.0);
        assert_eq!(p.confidence(Some(f32::NAN)), 0.0);
        assert_eq!(p.confidence(Some(0.5)), 0.5);
    }

    #[test]
    fn tiers_follow_thresholds() {
        let p = ConfidencePolicy::default();
        assert_eq!(p.level(0.0), ConfidenceLevel::Low);
        assert_eq!(p.level(0.39), ConfidenceLevel::Low);
        assert_eq!(p.level(0.4), ConfidenceLevel::Medium);
        assert_eq!(p.level(0.7), ConfidenceLevel::High);
    }
}
