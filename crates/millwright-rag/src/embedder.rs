//! Embedding generation for semantic search
//!
//! A trait-based embedder so the store does not care where vectors come
//! from. The default implementation derives a deterministic embedding from
//! the text content itself; it needs no model download and no external
//! service, which is enough for the lexical-overlap retrieval this system
//! performs over plant documentation.

use crate::error::RagResult;
use async_trait::async_trait;

/// Default embedding dimension
pub const EMBEDDING_DIM_DEFAULT: usize = 384;

/// Trait for generating text embeddings
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Dimension of produced vectors
    fn dimension(&self) -> usize;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Embed a single text
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>>;

    /// Embed a batch of texts
    async fn embed_batch(&self, texts: &[&str]) -> RagResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Deterministic content-hash embedder
///
/// Tokenizes on non-alphanumeric boundaries and accumulates a hashed
/// contribution per token, so texts sharing vocabulary land near each
/// other under cosine similarity. Vectors are normalized to unit length.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder with the given dimension
    pub fn new(dimension: usize) -> Self {
        assert!(dimension > 0, "embedding dimension must be positive");
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM_DEFAULT)
    }
}

fn token_hash(token: &str) -> u64 {
    // FNV-1a over the lowercased token
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.bytes() {
        hash ^= u64::from(byte.to_ascii_lowercase());
        hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
    }
    hash
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "hash-embedder"
    }

    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            let hash = token_hash(token);
            let index = (hash % self.dimension as u64) as usize;
            // Sign from a high bit decorrelates buckets that collide.
            let sign = if hash & (1u64 << 63) == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }
}
