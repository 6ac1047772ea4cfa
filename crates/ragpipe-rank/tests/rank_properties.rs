use proptest::prelude::*;
use std::collections::HashSet;

use ragpipe_core::types::{Candidate, SourceKind};
use ragpipe_rank::{cosine_similarity, MmrSelector, RankFusion};

fn candidate(id: usize, score: f32, embedding: Option<Vec<f32>>, source: SourceKind) -> Candidate {
    Candidate {
        chunk_id: format!("c{id}"),
        document_id: format!("d{}", id % 3),
        filename: format!("d{}.txt", id % 3),
        content: format!("chunk {id}"),
        score,
        position: 0,
        source,
        embedding,
    }
}

fn ranked_ids(max_id: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..max_id, 0..15)
}

fn embedded_pool() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec((prop::collection::vec(-1.0f32..1.0, 4), 0.0f32..1.0), 1..12).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (v, s))| candidate(i, s, Some(v), SourceKind::Vector))
            .collect()
    })
}

fn max_sim(c: &Candidate, selected: &[Candidate]) -> f32 {
    selected
        .iter()
        .map(|s| cosine_similarity(c.embedding.as_deref().unwrap_or(&[]), s.embedding.as_deref().unwrap_or(&[])))
        .fold(f32::NEG_INFINITY, f32::max)
}

#[test]
fn candidate_in_both_lists_ranks_first() {
    let semantic = vec![candidate(0, 0.9, None, SourceKind::Vector), candidate(1, 0.8, None, SourceKind::Vector)];
    let keyword = vec![candidate(1, 0.0, None, SourceKind::Text), candidate(2, 0.0, None, SourceKind::Text)];
    let fused = RankFusion::new(60.0).fuse(&[semantic.as_slice(), keyword.as_slice()], 3);
    assert_eq!(fused[0].chunk_id, "c1");
    assert!(fused[0].score > fused[1].score && fused[0].score > fused[2].score);
}

proptest! {
    #[test]
    fn fusion_has_no_duplicates_and_respects_limit(sem in ranked_ids(20), kw in ranked_ids(20), limit in 0usize..25) {
        let semantic: Vec<Candidate> = sem.iter().map(|&i| candidate(i, 0.5, None, SourceKind::Vector)).collect();
        let keyword: Vec<Candidate> = kw.iter().map(|&i| candidate(i, 0.0, None, SourceKind::Text)).collect();
        let fused = RankFusion::default().fuse(&[semantic.as_slice(), keyword.as_slice()], limit);

        let distinct: HashSet<usize> = sem.iter().chain(kw.iter()).copied().collect();
        prop_assert!(fused.len() <= limit);
        prop_assert!(fused.len() <= distinct.len());
        let ids: HashSet<&str> = fused.iter().map(|c| c.chunk_id.as_str()).collect();
        prop_assert_eq!(ids.len(), fused.len());
        for pair in fused.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn appearing_in_both_lists_never_scores_lower(sem in ranked_ids(10), kw in ranked_ids(10)) {
        let semantic: Vec<Candidate> = sem.iter().map(|&i| candidate(i, 0.5, None, SourceKind::Vector)).collect();
        let keyword: Vec<Candidate> = kw.iter().map(|&i| candidate(i, 0.0, None, SourceKind::Text)).collect();
        let fusion = RankFusion::default();
        let both = fusion.fuse(&[semantic.as_slice(), keyword.as_slice()], usize::MAX);
        let only_sem = fusion.fuse(&[semantic.as_slice()], usize::MAX);
        let only_kw = fusion.fuse(&[keyword.as_slice()], usize::MAX);
        for c in &both {
            for alone in only_sem.iter().chain(only_kw.iter()).filter(|a| a.chunk_id == c.chunk_id) {
                prop_assert!(c.score >= alone.score);
            }
        }
    }

    #[test]
    fn mmr_is_deterministic(pool in embedded_pool(), k in 0usize..15, lambda in 0.0f32..=1.0) {
        let selector = MmrSelector::new(lambda).unwrap();
        let query = [1.0, 0.5, -0.25, 0.0];
        prop_assert_eq!(selector.select(pool.clone(), &query, k), selector.select(pool, &query, k));
    }

    #[test]
    fn mmr_clamps_and_never_repeats(pool in embedded_pool(), k in 0usize..30, lambda in 0.0f32..=1.0) {
        let n = pool.len();
        let picked = MmrSelector::new(lambda).unwrap().select(pool, &[0.1, 0.2, 0.3, 0.4], k);
        prop_assert_eq!(picked.len(), k.min(n));
        let ids: HashSet<&str> = picked.iter().map(|c| c.chunk_id.as_str()).collect();
        prop_assert_eq!(ids.len(), picked.len());
        for (i, c) in picked.iter().enumerate() {
            prop_assert_eq!(c.position, i);
        }
    }

    #[test]
    fn mmr_pure_relevance_sorts_by_query_similarity(pool in embedded_pool()) {
        let query = [0.3, -0.2, 0.9, 0.1];
        let n = pool.len();
        let picked = MmrSelector::new(1.0).unwrap().select(pool, &query, n);
        let sims: Vec<f32> = picked.iter().map(|c| cosine_similarity(c.embedding.as_deref().unwrap_or(&[]), &query)).collect();
        for pair in sims.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn mmr_pure_diversity_minimizes_redundancy(pool in embedded_pool()) {
        let n = pool.len();
        let picked = MmrSelector::new(0.0).unwrap().select(pool.clone(), &[1.0, 0.0, 0.0, 0.0], n);
        for step in 1..picked.len() {
            let chosen = max_sim(&picked[step], &picked[..step]);
            for other in &picked[step + 1..] {
                prop_assert!(chosen <= max_sim(other, &picked[..step]) + 1e-6);
            }
        }
    }
}
