//! Maximal Marginal Relevance selection.
//!
//! Greedily picks the candidate maximising
//! `lambda * sim(query) - (1 - lambda) * max sim(selected)`, so each pick
//! trades relevance against redundancy with what is already chosen.

use ragpipe_core::error::{Error, Result};
use ragpipe_core::types::Candidate;

use crate::similarity::{cosine_similarity, optional_similarity};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MmrSelector {
    lambda: f32,
}

impl MmrSelector {
    /// `lambda` must lie in `[0, 1]`: 1.0 is pure relevance, 0.0 pure diversity.
    pub fn new(lambda: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&lambda) {
            return Err(Error::InvalidConfig(format!("mmr lambda must be within [0, 1], got {}", lambda)));
        }
        Ok(Self { lambda })
    }

    pub fn lambda(&self) -> f32 {
        self.lambda
    }

    /// Selects up to `top_k` candidates in pick order.
    ///
    /// Query similarity is the cosine between a candidate's embedding and
    /// `query`; candidates without an embedding fall back to their existing
    /// `score`. Pairs missing an embedding count as 0 similarity. Equal MMR
    /// scores go to the candidate less similar to the selection, then to the
    /// earlier candidate. Scores are left as they were; `position` is
    /// rewritten to the pick order. Cost is `O(top_k * candidates)`.
    pub fn select(&self, candidates: Vec<Candidate>, query: &[f32], top_k: usize) -> Vec<Candidate> {
        if candidates.is_empty() || top_k == 0 {
            return Vec::new();
        }
        let top_k = top_k.min(candidates.len());
        let relevance: Vec<f32> = candidates
            .iter()
            .map(|c| c.embedding.as_deref().map_or(c.score, |e| cosine_similarity(e, query)))
            .collect();

        // Highest similarity to any selected item; `None` until something is selected.
        let mut redundancy: Vec<Option<f32>> = vec![None; candidates.len()];
        let mut remaining: Vec<usize> = (0..candidates.len()).collect();
        let mut selected: Vec<usize> = Vec::with_capacity(top_k);

        while selected.len() < top_k && !remaining.is_empty() {
            let mut best: Option<(usize, f32, f32)> = None;
            for (slot, &i) in remaining.iter().enumerate() {
                let overlap = redundancy[i].unwrap_or(0.0);
                let score = self.lambda * relevance[i] - (1.0 - self.lambda) * overlap;
                let better = match best {
                    None => true,
                    Some((_, best_score, best_overlap)) => {
                        score > best_score || (score == best_score && overlap < best_overlap)
                    }
                };
                if better {
                    best = Some((slot, score, overlap));
                }
            }
            let Some((slot, _, _)) = best else { break };
            let chosen = remaining.remove(slot);
            selected.push(chosen);

            let chosen_embedding = candidates[chosen].embedding.as_deref();
            for &i in &remaining {
                let sim = optional_similarity(candidates[i].embedding.as_deref(), chosen_embedding);
                redundancy[i] = Some(redundancy[i].map_or(sim, |r| r.max(sim)));
            }
        }
        tracing::debug!(pool = candidates.len(), selected = selected.len(), lambda = self.lambda, "mmr selection");

        let mut pool: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
        selected
            .into_iter()
            .filter_map(|i| pool[i].take())
            .enumerate()
            .map(|(position, c)| Candidate { position, ..c })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragpipe_core::types::SourceKind;

    fn cand(id: &str, score: f32, embedding: Option<Vec<f32>>) -> Candidate {
        Candidate {
            chunk_id: id.to_string(),
            document_id: "doc".to_string(),
            filename: "doc.txt".to_string(),
            content: String::new(),
            score,
            position: 9,
            source: SourceKind::Vector,
            embedding,
        }
    }

    fn ids(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.chunk_id.as_str()).collect()
    }

    #[test]
    fn redundant_candidate_loses_to_diverse_one() {
        let pool = vec![
            cand("A", 0.9, Some(vec![1.0, 0.0])),
            cand("B", 0.85, Some(vec![1.0, 0.0])),
            cand("C", 0.5, Some(vec![0.0, 1.0])),
        ];
        let picked = MmrSelector::new(0.5).unwrap().select(pool, &[1.0, 0.0], 2);
        assert_eq!(ids(&picked), vec!["A", "C"]);
        assert_eq!(picked[1].position, 1);
        assert_eq!(picked[1].score, 0.5);
    }

    #[test]
    fn lambda_one_orders_by_query_similarity() {
        let pool = vec![
            cand("far", 0.0, Some(vec![0.0, 1.0])),
            cand("near", 0.0, Some(vec![1.0, 0.1])),
            cand("mid", 0.0, Some(vec![1.0, 1.0])),
        ];
        let picked = MmrSelector::new(1.0).unwrap().select(pool, &[1.0, 0.0], 3);
        assert_eq!(ids(&picked), vec!["near", "mid", "far"]);
    }

    #[test]
    fn missing_embedding_falls_back_to_score() {
        let pool = vec![cand("low", 0.1, None), cand("high", 0.8, None)];
        let picked = MmrSelector::new(0.7).unwrap().select(pool, &[1.0, 0.0], 1);
        assert_eq!(ids(&picked), vec!["high"]);
    }

    #[test]
    fn top_k_larger_than_pool_returns_everything_once() {
        let pool = vec![cand("a", 0.3, None), cand("b", 0.2, Some(vec![1.0])), cand("c", 0.1, None)];
        let picked = MmrSelector::new(0.5).unwrap().select(pool, &[1.0], 10);
        let mut got = ids(&picked);
        got.sort();
        assert_eq!(got, vec!["a", "b", "c"]);
    }

    #[test]
    fn ties_go_to_first_candidate() {
        let pool = vec![cand("first", 0.5, None), cand("second", 0.5, None)];
        let picked = MmrSelector::new(0.5).unwrap().select(pool, &[], 1);
        assert_eq!(ids(&picked), vec!["first"]);
    }

    #[test]
    fn empty_pool_and_zero_k() {
        let selector = MmrSelector::new(0.5).unwrap();
        assert!(selector.select(Vec::new(), &[1.0], 3).is_empty());
        assert!(selector.select(vec![cand("a", 1.0, None)], &[1.0], 0).is_empty());
    }

    #[test]
    fn lambda_outside_unit_interval_is_rejected() {
        assert!(MmrSelector::new(1.01).is_err());
        assert!(MmrSelector::new(-0.1).is_err());
        assert!(MmrSelector::new(f32::NAN).is_err());
    }
}
