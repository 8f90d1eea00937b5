use chrono::Utc;
use tempfile::TempDir;

use docqa_core::chunker::{chunk_text, ChunkingConfig};
use docqa_core::history::{InMemoryHistory, JsonlHistory};
use docqa_core::traits::HistoryStore;
use docqa_core::types::{Corpus, DocumentFormat, HistoryEntry};
use docqa_core::Error;

fn words(n: usize) -> Vec<String> { (0..n).map(|i| format!("t{i}")).collect() }

fn expected_count(n: usize, size: usize, overlap: usize) -> usize {
    if n == 0 { 0 } else if n <= size { 1 } else { (n - size).div_ceil(size - overlap) + 1 }
}

#[test]
fn chunk_counts_and_overlap_hold_across_parameters() {
    for size in 1..12 {
        for overlap in 0..size {
            let cfg = ChunkingConfig::new(size, overlap).expect("valid config");
            for n in 0..40 {
                let w = words(n);
                let chunks = chunk_text(&w.join(" "), &cfg);
                assert_eq!(chunks.len(), expected_count(n, size, overlap), "n={n} size={size} overlap={overlap}");

                let split: Vec<Vec<&str>> = chunks.iter().map(|c| c.split(' ').collect()).collect();
                for (i, c) in split.iter().enumerate() {
                    if i + 1 < split.len() { assert_eq!(c.len(), size); }
                    assert!(!c.is_empty() && c.len() <= size);
                }
                for pair in split.windows(2) {
                    let tail = &pair[0][pair[0].len() - overlap..];
                    assert_eq!(tail, &pair[1][..overlap], "consecutive chunks share exactly {overlap} words");
                }
                if let Some(last) = split.last() {
                    assert_eq!(last.last().copied(), w.last().map(String::as_str), "last chunk reaches the final word");
                }
            }
        }
    }
}

#[test]
fn corpus_rejects_empty_and_ragged_input() {
    let err = Corpus::new("empty", vec![], vec![], "d").unwrap_err();
    assert!(matches!(err, Error::EmptyCorpus));

    let err = Corpus::new("ragged", vec!["a".into(), "b".into()], vec![vec![1.0, 0.0], vec![1.0]], "d").unwrap_err();
    assert!(matches!(err, Error::RetrievalUnavailable(_)));

    let err = Corpus::new("short", vec!["a".into(), "b".into()], vec![vec![1.0, 0.0]], "d").unwrap_err();
    assert!(matches!(err, Error::RetrievalUnavailable(_)));
}

#[test]
fn corpus_normalizes_embeddings_and_keeps_order() {
    let corpus = Corpus::new("doc.txt", vec!["first".into(), "second".into()], vec![vec![3.0, 4.0], vec![0.0, 2.0]], "abc").expect("corpus");
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus.dim(), 2);
    assert_eq!(corpus.source_label(), "doc.txt");
    assert_eq!(corpus.chunks()[0].id, 0);
    assert_eq!(corpus.chunks()[1].text, "second");
    let e = &corpus.chunks()[0].embedding;
    assert!((e[0] - 0.6).abs() < 1e-6 && (e[1] - 0.8).abs() < 1e-6);
}

#[test]
fn document_format_from_extension() {
    assert_eq!(DocumentFormat::from_filename("notes.TXT"), DocumentFormat::PlainText);
    assert_eq!(DocumentFormat::from_filename("README.md"), DocumentFormat::Markdown);
    assert_eq!(DocumentFormat::from_filename("paper.pdf"), DocumentFormat::Pdf);
    assert_eq!(DocumentFormat::from_filename("sheet.xlsx"), DocumentFormat::Other("xlsx".into()));
}

fn entry(q: &str) -> HistoryEntry {
    HistoryEntry { question: q.into(), answer: format!("answer to {q}"), sources: vec!["src".into()], confidence: 0.5, timestamp: Utc::now() }
}

#[test]
fn in_memory_history_evicts_oldest() {
    let history = InMemoryHistory::new(2);
    for q in ["one", "two", "three"] { history.append(entry(q)).expect("append"); }
    let recent = history.list_recent(10).expect("list");
    let questions: Vec<&str> = recent.iter().map(|e| e.question.as_str()).collect();
    assert_eq!(questions, vec!["three", "two"]);
    assert_eq!(history.len().expect("len"), 2);
    history.clear().expect("clear");
    assert_eq!(history.len().expect("len"), 0);
}

#[test]
fn jsonl_history_round_trips_most_recent_first() {
    let tmp = TempDir::new().expect("tmp");
    let history = JsonlHistory::open(tmp.path().join("nested/history.jsonl")).expect("open");
    assert!(history.list_recent(5).expect("empty list").is_empty());

    for q in ["alpha", "beta", "gamma"] { history.append(entry(q)).expect("append"); }
    let recent = history.list_recent(2).expect("list");
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].question, "gamma");
    assert_eq!(recent[1].question, "beta");

    // A fresh handle on the same file sees the same log.
    let reopened = JsonlHistory::open(history.path()).expect("reopen");
    assert_eq!(reopened.len().expect("len"), 3);

    reopened.clear().expect("clear");
    assert_eq!(history.len().expect("len"), 0);
}
