//! Contracts for the external collaborators the retriever coordinates.
//!
//! Implementations live outside the core (model clients, vector stores,
//! keyword indexes). All return `anyhow::Result`; the retriever wraps
//! failures with the stage that produced them.

use async_trait::async_trait;

use crate::types::{Candidate, SearchFilter};

#[async_trait]
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Vector similarity search. Results are rank-ordered, best first, with
/// cosine similarity as the score.
#[async_trait]
pub trait SemanticSearcher: Send + Sync {
    /// Candidates come back without embeddings.
    async fn search(&self, query: &[f32], top_k: usize, filter: &SearchFilter) -> anyhow::Result<Vec<Candidate>>;

    /// Same contract as [`SemanticSearcher::search`] but every candidate
    /// carries its stored embedding. Required for diversity re-ranking.
    async fn search_with_embeddings(&self, query: &[f32], top_k: usize, filter: &SearchFilter) -> anyhow::Result<Vec<Candidate>>;
}

/// Lexical search. Only the rank order of the results is meaningful.
#[async_trait]
pub trait KeywordSearcher: Send + Sync {
    async fn search(&self, query: &str, top_k: usize, filter: &SearchFilter) -> anyhow::Result<Vec<Candidate>>;
}
