//! Reciprocal Rank Fusion: score = Σ 1/(k + rank + 1), rank 0-based.
//!
//! Combines ranked lists from methods whose raw scores are not comparable
//! (cosine similarity, BM25) using rank positions alone.

use std::collections::{HashMap, HashSet};

use ragpipe_core::config::DEFAULT_RRF_K;
use ragpipe_core::types::{Candidate, SourceKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankFusion {
    k: f64,
}

impl Default for RankFusion {
    fn default() -> Self {
        Self { k: DEFAULT_RRF_K }
    }
}

struct Fused {
    candidate: Candidate,
    score: f64,
}

impl RankFusion {
    /// `k` is the smoothing constant; larger values flatten the advantage of
    /// top ranks. Must be positive (checked by `RetrievalOptions::validate`).
    pub fn new(k: f64) -> Self {
        Self { k }
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    /// Contribution of an item at 0-based `rank` within one list.
    pub fn contribution(&self, rank: usize) -> f64 {
        1.0 / (self.k + rank as f64 + 1.0)
    }

    /// Fuses rank-ordered `lists` (best first) into one list keyed by chunk id,
    /// sorted by fused score and truncated to `limit`.
    ///
    /// Equal scores keep first-encountered order, so earlier lists win ties.
    /// An id repeated inside one list counts once, at its best rank. The
    /// first occurrence supplies the candidate's fields; a missing embedding
    /// is filled from a later occurrence. `score` becomes the fused score and
    /// `position` the output index.
    pub fn fuse(&self, lists: &[&[Candidate]], limit: usize) -> Vec<Candidate> {
        let mut fused: Vec<Fused> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for list in lists {
            let mut seen: HashSet<&str> = HashSet::new();
            for (rank, candidate) in list.iter().enumerate() {
                if !seen.insert(candidate.chunk_id.as_str()) {
                    continue;
                }
                let contribution = self.contribution(rank);
                match by_id.get(&candidate.chunk_id) {
                    Some(&slot) => {
                        let entry = &mut fused[slot];
                        entry.score += contribution;
                        if entry.candidate.source != candidate.source {
                            entry.candidate.source = SourceKind::Hybrid;
                        }
                        if entry.candidate.embedding.is_none() {
                            entry.candidate.embedding = candidate.embedding.clone();
                        }
                    }
                    None => {
                        by_id.insert(candidate.chunk_id.clone(), fused.len());
                        fused.push(Fused { candidate: candidate.clone(), score: contribution });
                    }
                }
            }
        }

        // stable sort keeps insertion order among equal scores
        fused.sort_by(|a, b| b.score.total_cmp(&a.score));
        fused.truncate(limit);
        tracing::debug!(lists = lists.len(), fused = fused.len(), k = self.k, "rank fusion");

        fused
            .into_iter()
            .enumerate()
            .map(|(position, f)| Candidate { score: f.score as f32, position, ..f.candidate })
            .collect()
    }
}
