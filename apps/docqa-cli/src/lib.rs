//! Shared plumbing for the `docqa` binaries.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use docqa_core::config::{Config, Settings};
use docqa_core::types::{Answer, HistoryEntry, LoadReport, ServiceStatus};
use docqa_core::Error;
use docqa_engine::QueryService;

/// Install the global subscriber on stderr. Filtering comes from `DOCQA_LOG`
/// (default `info`); `DOCQA_LOG_FORMAT=json` switches to structured output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("DOCQA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("DOCQA_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(true);
    let _ = if json { builder.json().try_init() } else { builder.try_init() };
}

/// Load and validate layered configuration.
pub fn load_settings() -> anyhow::Result<Settings> {
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    Ok(config.settings()?)
}

pub fn build_service(settings: &Settings) -> anyhow::Result<QueryService> {
    Ok(QueryService::from_settings(settings)?)
}

/// Warning for one-shot runs whose history would vanish with the process.
pub fn ephemeral_history_note(settings: &Settings) -> Option<&'static str> {
    match settings.history.path {
        Some(_) => None,
        None => Some("⚠️  history.path is not set; questions are only remembered for this run (set APP_HISTORY__PATH to keep them)"),
    }
}

/// Run `fut` behind a spinner that is cleared once it resolves.
pub async fn with_spinner<F, T>(message: String, fut: F) -> T
where
    F: Future<Output = T>,
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed}]").unwrap_or_else(|_| ProgressStyle::default_spinner()));
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    let out = fut.await;
    pb.finish_and_clear();
    out
}

pub async fn load_file(service: &QueryService, path: &Path) -> anyhow::Result<LoadReport> {
    let bytes = tokio::fs::read(path).await?;
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string());
    let report = with_spinner(format!("Indexing {}", name), service.load_upload(&name, &bytes)).await?;
    Ok(report)
}

pub async fn load_topic(service: &QueryService, topic: &str) -> anyhow::Result<LoadReport> {
    Ok(with_spinner(format!("Fetching '{}' from Wikipedia", topic), service.load_topic(topic)).await?)
}

pub fn print_loaded(report: &LoadReport) {
    println!("✅ Loaded \"{}\" ({} chunks)", report.label, report.chunks);
}

pub fn print_answer(answer: &Answer) {
    println!("\n💬 {}", answer.text.trim());
    let marker = if answer.low_confidence { "⚠️ " } else { "📈" };
    println!("\n{} confidence: {:.0}% ({:?})", marker, answer.confidence * 100.0, answer.level);
    if answer.low_confidence {
        println!("   The document may not cover this question well.");
    }
    for (i, source) in answer.sources.iter().enumerate() {
        println!("  [{}] {}", i + 1, source);
    }
}

pub fn print_status(status: &ServiceStatus) {
    match &status.label {
        Some(label) if status.ready => println!("📚 Loaded: {} ({} chunks)", label, status.chunks),
        _ => println!("📚 No document loaded"),
    }
    println!("🕘 History entries: {}", status.history_count);
}

pub fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No questions asked yet.");
        return;
    }
    for entry in entries {
        println!("\n[{}] Q: {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S"), entry.question);
        println!("    A: {} ({:.0}%)", entry.answer.trim(), entry.confidence * 100.0);
    }
}

/// One-line explanation for failures a user can act on.
pub fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<Error>() {
        Some(Error::AmbiguousTopic { topic, options }) => {
            format!("'{}' is ambiguous. Try one of: {}", topic, options.join(", "))
        }
        Some(Error::GenerationUnavailable(reason)) => {
            format!("language model unavailable ({}); the document is still loaded, try again", reason)
        }
        Some(e) => format!("{} [{}]", e, e.code()),
        None => format!("{:#}", err),
    }
}
