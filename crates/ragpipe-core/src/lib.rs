//! Core of the retrieval pipeline: domain types, chunking, configuration and
//! the contracts of the external collaborators (embedding, semantic search,
//! keyword search).

pub mod chunking;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use chunking::{clean_text, ChunkStrategy, Chunker, ChunkingOptions};
pub use config::{Config, RetrievalOptions, Settings};
pub use error::{Error, Result};
pub use types::{Candidate, Chunk, Document, SearchFilter, SourceKind};
