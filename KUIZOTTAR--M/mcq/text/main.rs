//! Text machinery shared by the ranking and distractor stages.

/// Closed-class word tables and stopwords.
pub mod lexicon;
/// Source normalization.
pub mod normalize;
/// Heuristic part-of-speech tagging.
pub mod tagger;
/// Sentence splitting and word tokenization.
pub mod tokenize;

pub use normalize::{normalize_source, SourceText};
pub use tagger::{HeuristicTagger, PosTag, TaggedToken};
pub use tokenize::{split_sentences, tokenize, word_count, Token};
