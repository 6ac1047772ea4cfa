//! ragpipe-rank
//!
//! Pure ranking primitives: cosine similarity, Reciprocal Rank Fusion of
//! several ranked candidate lists, and Maximal Marginal Relevance selection.
//! Nothing here performs I/O or holds state between calls.
pub mod fusion;
pub mod mmr;
pub mod similarity;

pub use fusion::RankFusion;
pub use mmr::MmrSelector;
pub use similarity::cosine_similarity;
