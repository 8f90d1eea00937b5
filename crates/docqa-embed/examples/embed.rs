use docqa_core::traits::Embedder;
use docqa_embed::HashEmbedder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let embedder = HashEmbedder::new(384);
    let texts = vec!["hello world".to_string(), "rust embeddings".to_string()];
    let embs = embedder.embed_batch(&texts).await?;
    println!("B={} dim={} id={}", embs.len(), embedder.dim(), embedder.embedder_id());
    Ok(())
}
