//! In-memory vector store and document ingestion
//!
//! Named collections of embedded document chunks with cosine-similarity
//! search. Plant documentation is chunked paragraph-wise at ingestion;
//! collections are append-only for the process lifetime.

use crate::embedder::Embedder;
use crate::error::{RagError, RagResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Maximum characters per ingested chunk
pub const CHUNK_SIZE_CHARS_MAX: usize = 1000;

/// An embedded document chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Chunk content
    pub content: String,
    /// Source identifier (file name, system name)
    pub source: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
}

/// A search hit with its similarity score
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    /// The matching document
    pub document: Document,
    /// Cosine similarity against the query
    pub score: f32,
}

/// Cosine similarity between two vectors
///
/// Returns 0.0 for mismatched dimensions or zero-length vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Named collections of embedded documents
pub struct VectorStore {
    embedder: Arc<dyn Embedder>,
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl VectorStore {
    /// Create an empty store over the given embedder
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Embed and append documents to a collection, creating it if needed
    pub async fn add_documents(
        &self,
        collection: &str,
        documents: Vec<(String, String)>,
    ) -> RagResult<usize> {
        let mut embedded = Vec::with_capacity(documents.len());
        for (source, content) in documents {
            let embedding = self.embedder.embed(&content).await?;
            embedded.push(Document {
                content,
                source,
                embedding,
            });
        }

        let count = embedded.len();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(embedded);

        info!(collection = %collection, added = count, "Documents ingested");
        Ok(count)
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Top-k documents by cosine similarity against the query
    pub async fn query_similarity(
        &self,
        collection: &str,
        query: &str,
        k: usize,
    ) -> RagResult<Vec<ScoredDocument>> {
        let query_embedding = self.embedder.embed(query).await?;

        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .ok_or_else(|| RagError::CollectionNotFound {
                name: collection.to_string(),
            })?;

        let mut scored: Vec<ScoredDocument> = documents
            .iter()
            .map(|document| ScoredDocument {
                document: document.clone(),
                score: cosine_similarity(&query_embedding, &document.embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        debug!(collection = %collection, hits = scored.len(), "Similarity query");
        Ok(scored)
    }
}

/// Split text into paragraph chunks bounded by [`CHUNK_SIZE_CHARS_MAX`]
pub fn chunk_text(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if !current.is_empty() && current.len() + paragraph.len() + 2 > CHUNK_SIZE_CHARS_MAX {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);

        // A single oversized paragraph still becomes its own chunk.
        if current.len() >= CHUNK_SIZE_CHARS_MAX {
            chunks.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Load and chunk all `.md` and `.txt` files under a directory
///
/// Returns `(source, chunk)` pairs ready for [`VectorStore::add_documents`].
/// A missing directory yields an empty set rather than an error; a file
/// that cannot be read fails ingestion.
pub fn load_directory(dir: impl AsRef<Path>) -> RagResult<Vec<(String, String)>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "Document directory missing; nothing to ingest");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| RagError::ingestion(dir.display().to_string(), e.to_string()))?;

    let mut documents = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| RagError::ingestion(dir.display().to_string(), e.to_string()))?;
        let path = entry.path();

        let is_doc = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if !is_doc {
            continue;
        }

        let text = std::fs::read_to_string(&path)
            .map_err(|e| RagError::ingestion(path.display().to_string(), e.to_string()))?;
        let source = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string();

        for chunk in chunk_text(&text) {
            documents.push((source.clone(), chunk));
        }
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;

    fn store() -> VectorStore {
        VectorStore::new(Arc::new(HashEmbedder::default()))
    }

    #[tokio::test]
    async fn test_add_and_count() {
        let store = store();
        let added = store
            .add_documents(
                "manufacturing_docs",
                vec![
                    ("sop.md".to_string(), "Lockout tagout procedure".to_string()),
                    ("sop.md".to_string(), "Spindle warmup cycle".to_string()),
                ],
            )
            .await
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.count("manufacturing_docs").await, 2);
    }

    #[tokio::test]
    async fn test_query_ranks_relevant_first() {
        let store = store();
        store
            .add_documents(
                "maintenance_logs",
                vec![
                    (
                        "log-1.txt".to_string(),
                        "Replaced worn spindle bearing on CNC-Machine-1".to_string(),
                    ),
                    (
                        "log-2.txt".to_string(),
                        "Monthly fire extinguisher inspection complete".to_string(),
                    ),
                ],
            )
            .await
            .unwrap();

        let hits = store
            .query_similarity("maintenance_logs", "spindle bearing noise", 2)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].document.content.contains("spindle bearing"));
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_query_unknown_collection_fails() {
        let result = store().query_similarity("nope", "anything", 4).await;
        assert!(matches!(result, Err(RagError::CollectionNotFound { .. })));
    }

    #[tokio::test]
    async fn test_query_respects_k() {
        let store = store();
        let docs: Vec<(String, String)> = (0..10)
            .map(|i| ("doc.md".to_string(), format!("maintenance note number {i}")))
            .collect();
        store.add_documents("manufacturing_docs", docs).await.unwrap();

        let hits = store
            .query_similarity("manufacturing_docs", "maintenance note", 3)
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_cosine_similarity_edges() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_chunk_text_splits_paragraphs() {
        let long_paragraph = "word ".repeat(300);
        let text = format!("short intro\n\n{long_paragraph}\n\nclosing note");
        let chunks = chunk_text(&text);
        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_chunk_text_empty() {
        assert!(chunk_text("").is_empty());
        assert!(chunk_text("\n\n\n").is_empty());
    }

    #[test]
    fn test_load_missing_directory_is_empty() {
        let docs = load_directory("/definitely/not/a/real/path").unwrap();
        assert!(docs.is_empty());
    }
}
