//! Word-window chunking with fixed overlap.

use crate::error::{Error, Result};

/// Window size and overlap, both in words. Always `chunk_size > overlap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    chunk_size: usize,
    overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 500, overlap: 50 }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than zero".into()));
        }
        if overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!("overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize { self.chunk_size }
    pub fn overlap(&self) -> usize { self.overlap }

    /// Words the window advances per step.
    pub fn stride(&self) -> usize { self.chunk_size - self.overlap }
}

/// Split `text` into overlapping windows of whitespace-separated words.
///
/// Every window but the last holds exactly `chunk_size` words and consecutive
/// windows share exactly `overlap` words. The last window ends at the final
/// word and may be shorter. Blank input produces no windows.
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + config.chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end >= words.len() { break; }
        start += config.stride();
    }
    chunks
}
