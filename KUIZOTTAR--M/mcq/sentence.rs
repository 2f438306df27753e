use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::text::word_count;

/// Exclusive word-count bounds for a question sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceBounds {
    /// Sentences must have more words than this.
    pub min_words: usize,
    /// Sentences must have fewer words than this.
    pub max_words: usize,
}

impl Default for SentenceBounds {
    fn default() -> Self {
        Self {
            min_words: 5,
            max_words: 80,
        }
    }
}

impl SentenceBounds {
    /// True when `sentence` lies strictly inside the bounds.
    #[must_use]
    pub fn admits(&self, sentence: &str) -> bool {
        let words = word_count(sentence);
        self.min_words < words && words < self.max_words
    }
}

/// Finds the sentence a concept will be asked about.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceMatcher {
    bounds: SentenceBounds,
}

impl SentenceMatcher {
    /// Matcher with the given bounds.
    #[must_use]
    pub const fn new(bounds: SentenceBounds) -> Self {
        Self { bounds }
    }

    /// Active bounds.
    #[must_use]
    pub const fn bounds(&self) -> SentenceBounds {
        self.bounds
    }

    /// First sentence that contains `concept` ignoring case, fits the bounds
    /// and is not in `used`.
    #[must_use]
    pub fn find_sentence<'a>(
        &self,
        concept: &str,
        sentences: &'a [String],
        used: &HashSet<String>,
    ) -> Option<&'a str> {
        let needle = concept.to_lowercase();
        if needle.is_empty() {
            return None;
        }
        sentences
            .iter()
            .filter(|sentence| !used.contains(sentence.as_str()))
            .filter(|sentence| self.bounds.admits(sentence))
            .find(|sentence| sentence.to_lowercase().contains(&needle))
            .map(String::as_str)
    }
}
