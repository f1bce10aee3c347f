//! Millwright RAG - retrieval layer
//!
//! A thin retrieval-augmented-generation layer over an in-memory vector
//! store: deterministic embeddings, cosine-similarity search, paragraph
//! chunking for document ingestion, and two named search tools handed to
//! the analysis subagent.

pub mod embedder;
pub mod error;
pub mod retrieval;
pub mod store;

pub use embedder::{Embedder, HashEmbedder, EMBEDDING_DIM_DEFAULT};
pub use error::{RagError, RagResult};
pub use retrieval::{
    docs_search_tool, maintenance_search_tool, search_tool, DOCS_COLLECTION,
    MAINTENANCE_COLLECTION,
};
pub use store::{
    chunk_text, cosine_similarity, load_directory, Document, ScoredDocument, VectorStore,
    CHUNK_SIZE_CHARS_MAX,
};
