//! ragpipe-text
//!
//! Tantivy-backed keyword search over chunks, implementing the
//! `KeywordSearcher` collaborator contract used by the hybrid retriever.
pub mod index;
pub mod tantivy_utils;

pub use index::KeywordIndex;
