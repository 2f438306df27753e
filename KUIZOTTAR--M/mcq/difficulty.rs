use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ranking::Candidate;

/// Difficulty tier controlling which slice of the ranked list is eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// Top of the ranking.
    #[default]
    Medium,
    /// Starts a third of the way down.
    Hard,
    /// Starts halfway down.
    Expert,
}

impl Difficulty {
    /// Parses a tier name; anything unrecognized is `Medium`.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hard" => Self::Hard,
            "expert" => Self::Expert,
            _ => Self::Medium,
        }
    }

    /// Canonical tier name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Expert => "Expert",
        }
    }

    /// First eligible index in a ranked list of `len` candidates.
    #[must_use]
    pub const fn start_index(self, len: usize) -> usize {
        match self {
            Self::Medium => 0,
            Self::Hard => len / 3,
            Self::Expert => len / 2,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

/// Eligible candidates for `difficulty`: `count * window_multiplier` items
/// from the tier's start, or from the top when that slice cannot supply
/// `count` items.
#[must_use]
pub fn select_window(
    candidates: &[Candidate],
    difficulty: Difficulty,
    count: usize,
    window_multiplier: usize,
) -> Vec<Candidate> {
    let width = count.saturating_mul(window_multiplier);
    let window = clamped(candidates, difficulty.start_index(candidates.len()), width);
    if window.len() < count {
        clamped(candidates, 0, width).to_vec()
    } else {
        window.to_vec()
    }
}

fn clamped(candidates: &[Candidate], start: usize, width: usize) -> &[Candidate] {
    let start = start.min(candidates.len());
    let end = start.saturating_add(width).min(candidates.len());
    &candidates[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(format!("c{i}"), 1.0 / (i as f64 + 1.0)))
            .collect()
    }

    fn phrases(window: &[Candidate]) -> Vec<&str> {
        window.iter().map(|c| c.phrase.as_str()).collect()
    }

    #[test]
    fn unknown_names_are_medium() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("EXPERT".parse::<Difficulty>().unwrap(), Difficulty::Expert);
        assert_eq!(Difficulty::parse_lenient("Impossible"), Difficulty::Medium);
        assert_eq!(Difficulty::parse_lenient(""), Difficulty::Medium);
    }

    #[test]
    fn tiers_shift_the_window() {
        let list = ranked(30);
        assert_eq!(
            phrases(&select_window(&list, Difficulty::Medium, 2, 2)),
            ["c0", "c1", "c2", "c3"]
        );
        assert_eq!(phrases(&select_window(&list, Difficulty::Hard, 2, 2))[0], "c10");
        assert_eq!(phrases(&select_window(&list, Difficulty::Expert, 2, 2))[0], "c15");
    }

    #[test]
    fn short_tail_falls_back_to_the_top() {
        let list = ranked(6);
        // Expert starts at 3 and the tail holds 3 < 4 items.
        let window = select_window(&list, Difficulty::Expert, 4, 2);
        assert_eq!(phrases(&window), ["c0", "c1", "c2", "c3", "c4", "c5"]);
    }

    #[test]
    fn empty_candidates_give_empty_windows() {
        for tier in [Difficulty::Medium, Difficulty::Hard, Difficulty::Expert] {
            assert!(select_window(&[], tier, 5, 2).is_empty());
        }
    }
}
