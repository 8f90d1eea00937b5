use std::sync::Arc;

use tracing::{info, warn};

use docqa_core::chunker::ChunkingConfig;
use docqa_core::config::{expand_path, Settings};
use docqa_core::history::{InMemoryHistory, JsonlHistory};
use docqa_core::traits::{ArticleSource, Embedder, Generator, HistoryStore, TextExtractor};
use docqa_core::types::{Answer, DocumentFormat, HistoryEntry, LoadReport, Query, RetrievalResult, ServiceStatus};
use docqa_core::Result;
use docqa_llm::{AnswerSynthesizer, OllamaGenerator, SynthesisConfig};
use docqa_sources::{UploadExtractor, WikipediaSource};
use docqa_vector::VectorIndex;

use crate::corpus::CorpusManager;
use crate::retriever::Retriever;

/// Collaborators the service is assembled from.
pub struct ServiceParts {
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn Generator>,
    pub extractor: Arc<dyn TextExtractor>,
    pub articles: Arc<dyn ArticleSource>,
    pub history: Arc<dyn HistoryStore>,
}

/// The surface the presentation layer talks to: load, query, status, history.
pub struct QueryService {
    corpus: CorpusManager,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    extractor: Arc<dyn TextExtractor>,
    articles: Arc<dyn ArticleSource>,
    history: Arc<dyn HistoryStore>,
    chunking: ChunkingConfig,
    top_k: usize,
}

impl QueryService {
    pub fn new(parts: ServiceParts, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let index = Arc::new(VectorIndex::new());
        Ok(Self {
            corpus: CorpusManager::new(Arc::clone(&parts.embedder), Arc::clone(&index)),
            retriever: Retriever::new(parts.embedder, index),
            synthesizer: AnswerSynthesizer::new(parts.generator, SynthesisConfig::from(&settings.rag)),
            extractor: parts.extractor,
            articles: parts.articles,
            history: parts.history,
            chunking: settings.rag.chunking()?,
            top_k: settings.rag.top_k,
        })
    }

    /// Wire the default HTTP-backed collaborators described by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let history: Arc<dyn HistoryStore> = match settings.history.path.as_deref() {
            Some(path) => Arc::new(JsonlHistory::open(expand_path(path))?),
            None => Arc::new(InMemoryHistory::new(settings.history.capacity)),
        };
        let parts = ServiceParts {
            embedder: docqa_embed::build_embedder(&settings.embed)?,
            generator: Arc::new(OllamaGenerator::new(&settings.llm)?),
            extractor: Arc::new(UploadExtractor),
            articles: Arc::new(WikipediaSource::new(&settings.wiki)?),
            history,
        };
        Self::new(parts, settings)
    }

    pub async fn load_document(&self, label: &str, raw_text: &str) -> Result<LoadReport> {
        let corpus = self.corpus.load_from_text(label, raw_text, &self.chunking).await?;
        Ok(LoadReport { label: corpus.source_label().to_string(), chunks: corpus.len(), digest: corpus.digest().to_string() })
    }

    /// Extract text from an uploaded file (format taken from its extension)
    /// and load it.
    pub async fn load_upload(&self, filename: &str, raw: &[u8]) -> Result<LoadReport> {
        let text = self.extractor.extract_text(raw, &DocumentFormat::from_filename(filename))?;
        self.load_document(filename, &text).await
    }

    pub async fn load_topic(&self, topic: &str) -> Result<LoadReport> {
        let article = self.articles.fetch_article(topic).await?;
        self.load_document(&article.title, &article.text).await
    }

    /// Retrieve, synthesize and record. Failures are returned as errors and
    /// are never turned into a low-confidence answer.
    pub async fn query(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        let results = self.retrieve(question).await?;
        self.answer(question, &results).await
    }

    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievalResult>> {
        self.retriever.retrieve(question, self.top_k).await
    }

    /// Synthesis alone, for retrying after `GenerationUnavailable` without
    /// repeating retrieval. A successful answer is recorded in history; a
    /// failed one is not.
    pub async fn answer(&self, question: &str, results: &[RetrievalResult]) -> Result<Answer> {
        let query = Query::new(question.trim());
        let answer = self.synthesizer.synthesize(&query.question, results).await?;
        if let Err(e) = self.history.append(HistoryEntry::from_answer(&query, &answer)) {
            warn!(error = %e, "failed to record history entry");
        }
        info!(confidence = answer.confidence, sources = answer.sources.len(), "query answered");
        Ok(answer)
    }

    pub fn is_ready(&self) -> bool { self.corpus.is_ready() }

    pub fn status(&self) -> ServiceStatus {
        let corpus = self.corpus.status();
        let history_count = self.history.len().unwrap_or_else(|e| {
            warn!(error = %e, "history unavailable for status");
            0
        });
        ServiceStatus { ready: corpus.ready, label: corpus.label, chunks: corpus.chunks, history_count }
    }

    pub fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>> { self.history.list_recent(limit) }

    pub fn clear_history(&self) -> Result<()> { self.history.clear() }

    pub async fn clear_corpus(&self) { self.corpus.clear().await }

    pub fn corpus(&self) -> &CorpusManager { &self.corpus }
}
