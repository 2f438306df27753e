//! Concept ranking: keyphrase candidates scored by salience.

/// Candidate type, ranker trait, and the fixed test ranker.
pub mod candidate;
/// Average-linkage topic clustering.
pub mod clustering;
/// Topic-aware graph ranking over noun-phrase candidates.
pub mod multipartite;
/// Weighted PageRank power iteration.
pub mod pagerank;

pub use candidate::{pool_size, Candidate, ConceptRanker, FixedRanker, RankingError};
pub use multipartite::{MultipartiteRanker, RankingParams};
