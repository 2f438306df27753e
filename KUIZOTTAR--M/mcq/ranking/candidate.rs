use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::SourceText;

/// Keyphrase judged salient to the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Lowercased surface form.
    pub phrase: String,
    /// Salience score; higher is more central.
    pub salience: f64,
}

impl Candidate {
    /// Creates a candidate.
    #[must_use]
    pub fn new(phrase: impl Into<String>, salience: f64) -> Self {
        Self {
            phrase: phrase.into(),
            salience,
        }
    }
}

/// Errors raised by a ranking backend.
#[derive(Debug, Error)]
pub enum RankingError {
    /// The backend only handles the listed language.
    #[error("unsupported language `{0}`")]
    UnsupportedLanguage(String),
    /// Power iteration did not settle.
    #[error("ranking did not converge after {iterations} iterations")]
    Convergence {
        /// Iterations performed.
        iterations: usize,
    },
    /// Backend-specific failure.
    #[error("ranking backend failed: {0}")]
    Backend(String),
}

/// Capability that extracts and scores keyphrase candidates.
///
/// Implementations are shared read-only across requests.
pub trait ConceptRanker: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Returns at most `pool_size` candidates sorted by descending salience.
    /// Empty text yields an empty list.
    fn rank(&self, text: &SourceText, pool_size: usize) -> Result<Vec<Candidate>, RankingError>;
}

/// Number of candidates requested from the ranker for `count` questions.
#[must_use]
pub fn pool_size(count: usize, floor: usize, multiplier: usize) -> usize {
    floor.max(count.saturating_mul(multiplier))
}

/// Deterministic ranker returning a configured list.
#[derive(Debug, Clone, Default)]
pub struct FixedRanker {
    candidates: Vec<Candidate>,
    failure: Option<String>,
}

impl FixedRanker {
    /// Ranker that returns `phrases` with descending synthetic salience.
    #[must_use]
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases.into_iter().map(Into::into).collect();
        let total = phrases.len();
        #[allow(clippy::cast_precision_loss)]
        let candidates = phrases
            .into_iter()
            .enumerate()
            .map(|(rank, phrase)| Candidate::new(phrase, (total - rank) as f64 / total as f64))
            .collect();
        Self {
            candidates,
            failure: None,
        }
    }

    /// Ranker that returns the given candidates verbatim.
    #[must_use]
    pub fn with_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            failure: None,
        }
    }

    /// Ranker that always fails with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            failure: Some(reason.into()),
        }
    }
}

impl ConceptRanker for FixedRanker {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn rank(&self, text: &SourceText, pool_size: usize) -> Result<Vec<Candidate>, RankingError> {
        if let Some(reason) = &self.failure {
            return Err(RankingError::Backend(reason.clone()));
        }
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.candidates.iter().take(pool_size).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_has_a_floor() {
        assert_eq!(pool_size(1, 50, 5), 50);
        assert_eq!(pool_size(20, 50, 5), 100);
    }

    #[test]
    fn fixed_ranker_truncates_and_orders() {
        let ranker = FixedRanker::new(["alpha", "beta", "gamma"]);
        let ranked = ranker.rank(&SourceText::new("text"), 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].phrase, "alpha");
        assert!(ranked[0].salience > ranked[1].salience);
    }

    #[test]
    fn fixed_ranker_returns_nothing_for_empty_text() {
        let ranker = FixedRanker::new(["alpha"]);
        assert!(ranker.rank(&SourceText::new("  "), 5).unwrap().is_empty());
    }

    #[test]
    fn failing_ranker_reports_backend_error() {
        let err = FixedRanker::failing("boom")
            .rank(&SourceText::new("text"), 5)
            .unwrap_err();
        assert!(matches!(err, RankingError::Backend(reason) if reason == "boom"));
    }
}
