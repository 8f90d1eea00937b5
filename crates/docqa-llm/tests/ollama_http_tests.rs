use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use docqa_core::config::LlmConfig;
use docqa_core::traits::Generator;
use docqa_core::Error;
use docqa_llm::OllamaGenerator;

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

async fn generate(status: &'static str, body: &'static str) -> docqa_core::Result<String> {
    let cfg = LlmConfig { base_url: canned_server(status, body).await, timeout_secs: 5, ..LlmConfig::default() };
    OllamaGenerator::new(&cfg).expect("client").generate("Context: ...\nQuestion: why?").await
}

#[tokio::test]
async fn response_text_is_returned() -> anyhow::Result<()> {
    let text = generate("200 OK", r#"{"model":"m","response":"Because of iron oxide.","done":true}"#).await?;
    assert_eq!(text, "Because of iron oxide.");
    Ok(())
}

#[tokio::test]
async fn blank_response_is_generation_unavailable() {
    let err = generate("200 OK", r#"{"response":"  ","done":true}"#).await.unwrap_err();
    assert!(matches!(err, Error::GenerationUnavailable(_)), "{err}");
}

#[tokio::test]
async fn malformed_body_is_generation_unavailable() {
    let err = generate("200 OK", "this is not json").await.unwrap_err();
    assert!(matches!(err, Error::GenerationUnavailable(_)), "{err}");
}

#[tokio::test]
async fn error_status_is_generation_unavailable() {
    let err = generate("500 Internal Server Error", r#"{"error":"model crashed"}"#).await.unwrap_err();
    match err {
        Error::GenerationUnavailable(msg) => assert!(msg.contains("500"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}
