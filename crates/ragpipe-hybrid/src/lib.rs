//! Retrieval orchestration: embed the query, gather semantic and keyword
//! candidates, fuse them and optionally re-rank for diversity.
use std::sync::Arc;

use ragpipe_core::error::{Error, Result};
use ragpipe_core::traits::{Embedder, KeywordSearcher, SemanticSearcher};
use ragpipe_core::types::{Candidate, SearchFilter};
use ragpipe_core::RetrievalOptions;
use ragpipe_rank::{MmrSelector, RankFusion};

/// One query. `hybrid` and `rerank` override the configured defaults when set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalRequest {
    pub query: String,
    pub top_k: usize,
    pub filter: SearchFilter,
    pub hybrid: Option<bool>,
    pub rerank: Option<bool>,
}

impl RetrievalRequest {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self { query: query.into(), top_k, ..Self::default() }
    }

    pub fn with_filter(mut self, filter: SearchFilter) -> Self { self.filter = filter; self }
    pub fn with_hybrid(mut self, enabled: bool) -> Self { self.hybrid = Some(enabled); self }
    pub fn with_rerank(mut self, enabled: bool) -> Self { self.rerank = Some(enabled); self }
}

pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    semantic: Arc<dyn SemanticSearcher>,
    keyword: Arc<dyn KeywordSearcher>,
    options: RetrievalOptions,
    fusion: RankFusion,
    mmr: MmrSelector,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        semantic: Arc<dyn SemanticSearcher>,
        keyword: Arc<dyn KeywordSearcher>,
        options: RetrievalOptions,
    ) -> Result<Self> {
        options.validate()?;
        let fusion = RankFusion::new(options.rrf_k);
        let mmr = MmrSelector::new(options.mmr_lambda)?;
        Ok(Self { embedder, semantic, keyword, options, fusion, mmr })
    }

    pub fn options(&self) -> &RetrievalOptions { &self.options }

    /// Runs one query end to end and returns at most `top_k` candidates with
    /// positions matching the returned order.
    pub async fn retrieve(&self, request: &RetrievalRequest) -> Result<Vec<Candidate>> {
        let top_k = request.top_k;
        if top_k == 0 { return Ok(Vec::new()); }
        let hybrid = request.hybrid.unwrap_or(self.options.hybrid_enabled);
        let rerank = request.rerank.unwrap_or(self.options.rerank_enabled);

        let query_vector = self.embedder.embed(&request.query).await.map_err(|e| Error::collaborator("query embedding", e))?;

        // Fusion and re-ranking both need a pool deeper than the final answer.
        let fetch = if hybrid || rerank { top_k.saturating_mul(self.options.candidate_multiplier) } else { top_k };
        let (semantic_hits, keyword_hits) = futures::try_join!(
            self.semantic_candidates(&query_vector, fetch, &request.filter, rerank),
            self.keyword_candidates(&request.query, fetch, &request.filter, hybrid),
        )?;
        tracing::debug!(semantic = semantic_hits.len(), keyword = keyword_hits.len(), fetch, hybrid, rerank, "candidates gathered");

        let pool = if hybrid {
            let limit = if rerank { semantic_hits.len() + keyword_hits.len() } else { top_k };
            self.fusion.fuse(&[semantic_hits.as_slice(), keyword_hits.as_slice()], limit)
        } else {
            semantic_hits
        };

        let mut results = if rerank {
            self.mmr.select(pool, &query_vector, top_k)
        } else {
            let mut pool = pool;
            pool.truncate(top_k);
            pool
        };
        for (position, candidate) in results.iter_mut().enumerate() { candidate.position = position; }
        tracing::debug!(returned = results.len(), "retrieval finished");
        Ok(results)
    }

    async fn semantic_candidates(&self, query: &[f32], fetch: usize, filter: &SearchFilter, with_embeddings: bool) -> Result<Vec<Candidate>> {
        let hits = if with_embeddings {
            self.semantic.search_with_embeddings(query, fetch, filter).await
        } else {
            self.semantic.search(query, fetch, filter).await
        };
        hits.map_err(|e| Error::collaborator("semantic search", e))
    }

    async fn keyword_candidates(&self, query: &str, fetch: usize, filter: &SearchFilter, enabled: bool) -> Result<Vec<Candidate>> {
        if !enabled { return Ok(Vec::new()); }
        self.keyword.search(query, fetch, filter).await.map_err(|e| Error::collaborator("keyword search", e))
    }
}
