//! DeepScout Pipeline - Document processing and retrieval
//!
//! Turns raw source text into indexed, searchable chunks: normalization and
//! chunking, embedding via the OpenAI API, and vector storage in Qdrant or
//! an in-memory backend. The `DocumentPipeline` composes these behind the
//! capability traits so callers never touch a backend directly.

pub mod embeddings;
pub mod memory;
pub mod pipeline;
pub mod processing;
pub mod qdrant;

pub use embeddings::OpenAiEmbeddings;
pub use memory::InMemoryIndex;
pub use pipeline::DocumentPipeline;
pub use processing::{chunk, normalize, truncate_chars};
pub use qdrant::QdrantIndex;
