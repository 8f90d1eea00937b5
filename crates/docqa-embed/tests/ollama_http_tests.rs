use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use docqa_core::config::EmbedConfig;
use docqa_core::traits::Embedder;
use docqa_core::Error;
use docqa_embed::OllamaEmbedder;

fn request_complete(buf: &[u8]) -> bool {
    let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else { return false };
    let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
    let body_len = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    buf.len() >= end + 4 + body_len
}

/// Serve the same canned HTTP response to every connection; returns the base URL.
async fn canned_server(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap_or(0);
                if n == 0 { break; }
                buf.extend_from_slice(&chunk[..n]);
                if request_complete(&buf) { break; }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}")
}

async fn embed_two(status: &'static str, body: &'static str) -> docqa_core::Result<Vec<Vec<f32>>> {
    let cfg = EmbedConfig { base_url: canned_server(status, body).await, timeout_secs: 5, ..EmbedConfig::default() };
    let embedder = OllamaEmbedder::new(&cfg).expect("client");
    embedder.embed_batch(&["first chunk".to_string(), "second chunk".to_string()]).await
}

#[tokio::test]
async fn well_formed_response_is_returned_in_order() -> anyhow::Result<()> {
    let out = embed_two("200 OK", r#"{"model":"m","embeddings":[[1.0,0.0],[0.0,1.0]]}"#).await?;
    assert_eq!(out, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    Ok(())
}

#[tokio::test]
async fn wrong_embedding_count_is_retrieval_unavailable() {
    let err = embed_two("200 OK", r#"{"embeddings":[[1.0,0.0]]}"#).await.unwrap_err();
    assert!(matches!(err, Error::RetrievalUnavailable(_)), "{err}");
}

#[tokio::test]
async fn ragged_dimensions_are_retrieval_unavailable() {
    let err = embed_two("200 OK", r#"{"embeddings":[[1.0,0.0],[0.5]]}"#).await.unwrap_err();
    assert!(matches!(err, Error::RetrievalUnavailable(_)), "{err}");
}

#[tokio::test]
async fn empty_vectors_are_retrieval_unavailable() {
    let err = embed_two("200 OK", r#"{"embeddings":[[],[]]}"#).await.unwrap_err();
    assert!(matches!(err, Error::RetrievalUnavailable(_)), "{err}");
}

#[tokio::test]
async fn malformed_body_is_retrieval_unavailable() {
    let err = embed_two("200 OK", r#"{"detail":"no embeddings here"}"#).await.unwrap_err();
    assert!(matches!(err, Error::RetrievalUnavailable(_)), "{err}");
}

#[tokio::test]
async fn error_status_is_retrieval_unavailable() {
    let err = embed_two("500 Internal Server Error", r#"{"error":"model not loaded"}"#).await.unwrap_err();
    match err {
        Error::RetrievalUnavailable(msg) => assert!(msg.contains("500"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}
