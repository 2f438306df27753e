use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{
    candidate::{Candidate, ConceptRanker, RankingError},
    clustering::cluster_topics,
    pagerank::{pagerank, WeightedGraph},
};
use crate::text::{
    lexicon::{is_stopword, light_stem},
    split_sentences, HeuristicTagger, SourceText,
};

/// Tunables of the multipartite ranker, read from the `[ranking]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingParams {
    /// Language code of the source text. Only `en` is supported.
    pub language: String,
    /// Jaccard distance at which topic clustering stops merging.
    pub cluster_threshold: f64,
    /// Strength of the first-occurrence boost.
    pub alpha: f64,
    /// PageRank damping factor.
    pub damping: f64,
    /// PageRank per-node tolerance.
    pub tolerance: f64,
    /// PageRank iteration cap.
    pub max_iterations: usize,
    /// Longest candidate, in words.
    pub max_words: usize,
    /// Shortest candidate, in characters.
    pub min_phrase_chars: usize,
    /// Shortest word allowed inside a candidate.
    pub min_word_chars: usize,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            cluster_threshold: 0.74,
            alpha: 1.1,
            damping: 0.85,
            tolerance: 1e-4,
            max_iterations: 100,
            max_words: 5,
            min_phrase_chars: 3,
            min_word_chars: 2,
        }
    }
}

/// Every occurrence of one normalized keyphrase.
#[derive(Debug, Clone)]
struct PhraseOccurrences {
    surface: String,
    stems: BTreeSet<String>,
    length: usize,
    offsets: Vec<usize>,
}

impl PhraseOccurrences {
    fn first_offset(&self) -> usize {
        self.offsets.first().copied().unwrap_or(0)
    }
}

/// Keyphrase ranker over a multipartite graph of topic-clustered noun
/// phrases.
///
/// Candidates are maximal noun/adjective runs. Phrases sharing stems are
/// grouped into topics, edges only join phrases of different topics, and
/// the earliest phrase of every topic absorbs extra weight from its
/// siblings before PageRank runs.
#[derive(Debug, Clone, Default)]
pub struct MultipartiteRanker {
    params: RankingParams,
    tagger: HeuristicTagger,
}

impl MultipartiteRanker {
    /// Creates a ranker with the given parameters.
    #[must_use]
    pub const fn new(params: RankingParams) -> Self {
        Self {
            params,
            tagger: HeuristicTagger::new(),
        }
    }

    /// Active parameters.
    #[must_use]
    pub const fn params(&self) -> &RankingParams {
        &self.params
    }

    fn keeps(&self, words: &[&str]) -> bool {
        if words.is_empty() || words.len() > self.params.max_words {
            return false;
        }
        if words.iter().any(|word| is_stopword(word)) {
            return false;
        }
        if words
            .iter()
            .any(|word| word.chars().count() < self.params.min_word_chars)
        {
            return false;
        }
        let phrase_chars =
            words.iter().map(|word| word.chars().count()).sum::<usize>() + words.len() - 1;
        if phrase_chars < self.params.min_phrase_chars {
            return false;
        }
        words.iter().all(|word| {
            word.chars()
                .all(|ch| ch.is_alphanumeric() || ch == '-' || ch == '.')
        })
    }

    fn select_candidates(&self, text: &str) -> Vec<PhraseOccurrences> {
        let mut by_key: IndexMap<String, PhraseOccurrences> = IndexMap::new();
        let mut offset = 0;
        for sentence in split_sentences(text) {
            let tagged = self.tagger.tag_sentence(&sentence);
            let mut i = 0;
            while i < tagged.len() {
                if !tagged[i].tag.is_phrase_part() {
                    i += 1;
                    continue;
                }
                let mut j = i;
                while j < tagged.len() && tagged[j].tag.is_phrase_part() {
                    j += 1;
                }
                let words: Vec<&str> = tagged[i..j].iter().map(|t| t.token.text.as_str()).collect();
                if self.keeps(&words) {
                    let lowered: Vec<String> =
                        words.iter().map(|word| word.to_lowercase()).collect();
                    let stems: Vec<String> = lowered.iter().map(|word| light_stem(word)).collect();
                    let entry = by_key
                        .entry(stems.join(" "))
                        .or_insert_with(|| PhraseOccurrences {
                            surface: lowered.join(" "),
                            stems: stems.iter().cloned().collect(),
                            length: words.len(),
                            offsets: Vec::new(),
                        });
                    entry.offsets.push(offset + i);
                }
                i = j;
            }
            offset += tagged.len();
        }
        by_key.into_values().collect()
    }

    fn build_graph(&self, phrases: &[PhraseOccurrences], topics: &[usize]) -> WeightedGraph {
        let n = phrases.len();
        let mut graph = WeightedGraph::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                if topics[i] == topics[j] {
                    continue;
                }
                let weight = proximity(&phrases[i], &phrases[j]);
                if weight > 0.0 {
                    graph.set_edge(i, j, weight);
                    graph.set_edge(j, i, weight);
                }
            }
        }

        let topic_count = topics.iter().max().map_or(0, |max| max + 1);
        let mut boosts: Vec<(usize, usize, f64)> = Vec::new();
        for topic in 0..topic_count {
            let members: Vec<usize> = (0..n).filter(|&node| topics[node] == topic).collect();
            if members.len() < 2 {
                continue;
            }
            let Some(&first) = members
                .iter()
                .min_by_key(|&&node| phrases[node].first_offset())
            else {
                continue;
            };
            #[allow(clippy::cast_precision_loss)]
            let position = (1.0 / (1.0 + phrases[first].first_offset() as f64)).exp();
            for (end, _) in graph.edges(first) {
                let boosters: Vec<f64> = members
                    .iter()
                    .filter(|&&sibling| sibling != first)
                    .filter_map(|&sibling| graph.weight(sibling, end))
                    .collect();
                if !boosters.is_empty() {
                    let total: f64 = boosters.iter().sum();
                    boosts.push((end, first, total * self.params.alpha * position));
                }
            }
        }
        for (from, to, delta) in boosts {
            graph.bump_edge(from, to, delta);
        }
        graph
    }
}

/// Sum of inverse word gaps between every pair of occurrences.
fn proximity(a: &PhraseOccurrences, b: &PhraseOccurrences) -> f64 {
    let mut weight = 0.0;
    for &pa in &a.offsets {
        for &pb in &b.offsets {
            let gap = if pa < pb {
                (pb - pa).saturating_sub(a.length - 1)
            } else {
                (pa - pb).saturating_sub(b.length - 1)
            };
            #[allow(clippy::cast_precision_loss)]
            let gap = gap.max(1) as f64;
            weight += 1.0 / gap;
        }
    }
    weight
}

impl ConceptRanker for MultipartiteRanker {
    fn name(&self) -> &'static str {
        "multipartite"
    }

    fn rank(&self, text: &SourceText, pool_size: usize) -> Result<Vec<Candidate>, RankingError> {
        if !self.params.language.eq_ignore_ascii_case("en") {
            return Err(RankingError::UnsupportedLanguage(self.params.language.clone()));
        }
        if text.is_empty() || pool_size == 0 {
            return Ok(Vec::new());
        }
        let phrases = self.select_candidates(text.as_str());
        if phrases.is_empty() {
            return Ok(Vec::new());
        }
        let stem_sets: Vec<BTreeSet<String>> = phrases.iter().map(|p| p.stems.clone()).collect();
        let topics = cluster_topics(&stem_sets, self.params.cluster_threshold);
        let graph = self.build_graph(&phrases, &topics);
        let scores = pagerank(
            &graph,
            self.params.damping,
            self.params.tolerance,
            self.params.max_iterations,
        )?;

        let mut order: Vec<usize> = (0..phrases.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .total_cmp(&scores[a])
                .then_with(|| phrases[a].first_offset().cmp(&phrases[b].first_offset()))
        });
        Ok(order
            .into_iter()
            .take(pool_size)
            .map(|node| Candidate::new(phrases[node].surface.clone(), scores[node]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL_TEXT: &str = "The mitochondria is the powerhouse of the cell. \
        Cells contain organelles that perform specific functions.";

    #[test]
    fn ranks_cell_biology_phrases() {
        let ranker = MultipartiteRanker::default();
        let ranked = ranker.rank(&SourceText::new(CELL_TEXT), 50).unwrap();
        let phrases: Vec<&str> = ranked.iter().map(|c| c.phrase.as_str()).collect();
        assert!(phrases.contains(&"mitochondria"));
        assert!(phrases.contains(&"cell"));
        assert!(!phrases.contains(&"cells"), "plural folds into the first form");
        for window in ranked.windows(2) {
            assert!(window[0].salience >= window[1].salience);
        }
        for candidate in &ranked {
            assert_eq!(candidate.phrase, candidate.phrase.to_lowercase());
        }
    }

    #[test]
    fn pool_size_truncates() {
        let ranker = MultipartiteRanker::default();
        let ranked = ranker.rank(&SourceText::new(CELL_TEXT), 2).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn empty_text_yields_nothing() {
        let ranker = MultipartiteRanker::default();
        assert!(ranker.rank(&SourceText::new(" \n "), 50).unwrap().is_empty());
    }

    #[test]
    fn other_languages_are_rejected() {
        let ranker = MultipartiteRanker::new(RankingParams {
            language: "fr".to_string(),
            ..RankingParams::default()
        });
        let err = ranker.rank(&SourceText::new(CELL_TEXT), 50).unwrap_err();
        assert!(matches!(err, RankingError::UnsupportedLanguage(lang) if lang == "fr"));
    }

    #[test]
    fn candidates_respect_filters() {
        let ranker = MultipartiteRanker::default();
        let text = "Vitamin C deficiency causes scurvy in sailors. \
            The long wooden sailing ship carried fresh citrus fruit across the ocean.";
        for candidate in ranker.rank(&SourceText::new(text), 50).unwrap() {
            let words: Vec<&str> = candidate.phrase.split(' ').collect();
            assert!(words.len() <= 5);
            assert!(words.iter().all(|w| w.chars().count() >= 2), "{}", candidate.phrase);
            assert!(words.iter().all(|w| !is_stopword(w)));
        }
    }

    #[test]
    fn shared_topic_boosts_first_member() {
        let ranker = MultipartiteRanker::default();
        let phrases = ranker.select_candidates(
            "Plant cell walls are rigid. A cell wall protects the plant. Water enters the root.",
        );
        let stem_sets: Vec<BTreeSet<String>> = phrases.iter().map(|p| p.stems.clone()).collect();
        let topics = cluster_topics(&stem_sets, 0.74);
        let graph = ranker.build_graph(&phrases, &topics);
        assert_eq!(graph.len(), phrases.len());
        let walls = phrases
            .iter()
            .position(|p| p.surface == "plant cell walls")
            .unwrap();
        let wall = phrases.iter().position(|p| p.surface == "cell wall").unwrap();
        assert_eq!(topics[walls], topics[wall]);
        let water = phrases.iter().position(|p| p.surface == "water").unwrap();
        let into_first = graph.weight(water, walls).unwrap();
        let out_of_first = graph.weight(walls, water).unwrap();
        assert!(into_first > out_of_first);
    }
}
