use std::{collections::HashSet, fmt, sync::Arc};

use rand::{seq::SliceRandom, Rng};
use regex::{NoExpand, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    difficulty::{select_window, Difficulty},
    distractor::{DistractorSynthesizer, SourceNouns},
    question::{Question, QuestionSet, MASK_TOKEN},
    ranking::{pool_size, ConceptRanker},
    sentence::SentenceMatcher,
    telemetry::McqTelemetry,
    text::{split_sentences, SourceText},
};

/// Sizing knobs for the candidate pool and the difficulty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Smallest pool requested from the ranker.
    pub pool_floor: usize,
    /// Pool size per requested question.
    pub pool_multiplier: usize,
    /// Window width per requested question.
    pub window_multiplier: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            pool_floor: 50,
            pool_multiplier: 5,
            window_multiplier: 2,
        }
    }
}

/// Parameters of a single assembly run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyRequest {
    /// Questions wanted.
    pub count: usize,
    /// Tier for concept selection.
    pub difficulty: Difficulty,
    /// Seconds per question, recorded in the metadata.
    pub time_per_question: u32,
    /// Attempts allowed, recorded in the metadata.
    pub max_attempts: u32,
}

/// Replaces every case-insensitive occurrence of `concept` with the mask.
///
/// Returns `None` when the concept does not occur.
#[must_use]
pub fn mask_concept(sentence: &str, concept: &str) -> Option<String> {
    if concept.is_empty() {
        return None;
    }
    let pattern = RegexBuilder::new(&regex::escape(concept))
        .case_insensitive(true)
        .build()
        .ok()?;
    if !pattern.is_match(sentence) {
        return None;
    }
    Some(pattern.replace_all(sentence, NoExpand(MASK_TOKEN)).into_owned())
}

/// Runs ranking, selection, sentence matching and distractor synthesis for
/// one text.
#[derive(Clone)]
pub struct QuestionAssembler {
    ranker: Arc<dyn ConceptRanker>,
    synthesizer: DistractorSynthesizer,
    matcher: SentenceMatcher,
    pools: PoolSettings,
    telemetry: Option<McqTelemetry>,
}

impl fmt::Debug for QuestionAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuestionAssembler")
            .field("ranker", &self.ranker.name())
            .field("synthesizer", &self.synthesizer)
            .field("matcher", &self.matcher)
            .field("pools", &self.pools)
            .finish_non_exhaustive()
    }
}

impl QuestionAssembler {
    /// Creates an assembler from its stages.
    #[must_use]
    pub fn new(
        ranker: Arc<dyn ConceptRanker>,
        synthesizer: DistractorSynthesizer,
        matcher: SentenceMatcher,
        pools: PoolSettings,
    ) -> Self {
        Self {
            ranker,
            synthesizer,
            matcher,
            pools,
            telemetry: None,
        }
    }

    /// Attaches telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: McqTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Name of the ranking backend.
    #[must_use]
    pub fn ranker_name(&self) -> &'static str {
        self.ranker.name()
    }

    /// Builds up to `request.count` questions from `text`.
    ///
    /// Ranking failures and unmatched concepts shrink the result; they are
    /// never errors.
    pub fn assemble<R>(
        &self,
        text: &SourceText,
        request: &AssemblyRequest,
        rng: &mut R,
    ) -> QuestionSet
    where
        R: Rng + ?Sized,
    {
        let empty = || {
            QuestionSet::new(
                Vec::new(),
                request.difficulty,
                request.count,
                request.time_per_question,
                request.max_attempts,
            )
        };
        if text.is_empty() || request.count == 0 {
            self.log(
                LogLevel::Info,
                "mcq.assemble.empty",
                json!({ "requested": request.count, "chars": text.len() }),
            );
            return empty();
        }

        let pool = pool_size(request.count, self.pools.pool_floor, self.pools.pool_multiplier);
        let candidates = match self.ranker.rank(text, pool) {
            Ok(candidates) => candidates,
            Err(err) => {
                self.log(
                    LogLevel::Warn,
                    "mcq.rank.failed",
                    json!({ "backend": self.ranker.name(), "error": err.to_string() }),
                );
                Vec::new()
            }
        };
        self.log(
            LogLevel::Debug,
            "mcq.rank.complete",
            json!({
                "backend": self.ranker.name(),
                "pool_size": pool,
                "candidates": candidates.len(),
            }),
        );

        let mut window = select_window(
            &candidates,
            request.difficulty,
            request.count,
            self.pools.window_multiplier,
        );
        window.shuffle(rng);

        let sentences = split_sentences(text.as_str());
        let nouns = SourceNouns::new(text.as_str());
        let mut used: HashSet<String> = HashSet::new();
        let mut questions = Vec::with_capacity(request.count);
        let mut unmatched = 0_usize;
        for candidate in &window {
            if questions.len() >= request.count {
                break;
            }
            let concept = candidate.phrase.as_str();
            let Some(sentence) = self.matcher.find_sentence(concept, &sentences, &used) else {
                unmatched += 1;
                continue;
            };
            used.insert(sentence.to_string());
            let Some(stem) = mask_concept(sentence, concept) else {
                continue;
            };
            let options = self.synthesizer.build_options(concept, &nouns, rng);
            match Question::new(stem, options, concept) {
                Ok(question) => questions.push(question),
                Err(err) => self.log(
                    LogLevel::Debug,
                    "mcq.question.rejected",
                    json!({ "concept": concept, "error": err.to_string() }),
                ),
            }
        }

        let set = QuestionSet::new(
            questions,
            request.difficulty,
            request.count,
            request.time_per_question,
            request.max_attempts,
        );
        let summary = json!({
            "requested": request.count,
            "achieved": set.achieved(),
            "window": window.len(),
            "unmatched": unmatched,
            "difficulty": request.difficulty.label(),
        });
        if set.is_partial() {
            self.log(LogLevel::Info, "mcq.assemble.partial", summary);
        } else {
            self.log(LogLevel::Debug, "mcq.assemble.complete", summary);
        }
        set
    }

    fn log(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Some(telemetry) = &self.telemetry {
            let _ = telemetry.log(level, message, metadata);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shared_logging::MemoryLogger;

    use super::*;
    use crate::{
        distractor::OPTION_COUNT,
        lexical::{NullOntology, RelationResolver},
        ranking::{FixedRanker, MultipartiteRanker},
    };

    const CELL_TEXT: &str = "The mitochondria is the powerhouse of the cell. \
        Cells contain organelles that perform specific functions.";

    fn assembler(ranker: Arc<dyn ConceptRanker>) -> QuestionAssembler {
        QuestionAssembler::new(
            ranker,
            DistractorSynthesizer::new(RelationResolver::new(Arc::new(NullOntology))),
            SentenceMatcher::default(),
            PoolSettings::default(),
        )
    }

    fn request(count: usize) -> AssemblyRequest {
        AssemblyRequest {
            count,
            difficulty: Difficulty::Medium,
            time_per_question: 30,
            max_attempts: 1,
        }
    }

    #[test]
    fn masks_every_occurrence_ignoring_case() {
        let masked = mask_concept("Cell walls surround the cell.", "cell").unwrap();
        assert_eq!(masked, "______ walls surround the ______.");
        assert!(mask_concept("No match here.", "cell").is_none());
        assert_eq!(mask_concept("Costs $1 (a+b).", "(a+b)").unwrap(), "Costs $1 ______.");
    }

    #[test]
    fn mitochondria_text_yields_one_question() {
        let assembler = assembler(Arc::new(MultipartiteRanker::default()));
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let set = assembler.assemble(&SourceText::new(CELL_TEXT), &request(1), &mut rng);
        assert_eq!(set.achieved(), 1);
        let question = &set.questions[0];
        assert!(question.stem().contains(MASK_TOKEN));
        assert_eq!(question.options().len(), OPTION_COUNT);
        assert!(question.options().iter().any(|o| o == question.answer()));
        assert!(!question
            .stem()
            .to_lowercase()
            .contains(&question.answer().to_lowercase()));
    }

    #[test]
    fn sentences_are_not_reused() {
        let ranker = FixedRanker::new(["cell", "mitochondria", "powerhouse", "organelles"]);
        let assembler = assembler(Arc::new(ranker));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let set = assembler.assemble(&SourceText::new(CELL_TEXT), &request(4), &mut rng);
        assert_eq!(set.achieved(), 2);
        assert!(set.is_partial());
        assert_ne!(set.questions[0].stem(), set.questions[1].stem());
        for question in &set.questions {
            let unique: HashSet<&String> = question.options().iter().collect();
            assert_eq!(unique.len(), OPTION_COUNT);
        }
    }

    #[test]
    fn empty_text_skips_the_ranker() {
        let memory = Arc::new(MemoryLogger::new());
        let telemetry = McqTelemetry::builder("mcq")
            .sink(memory.clone())
            .build()
            .unwrap();
        let assembler =
            assembler(Arc::new(FixedRanker::failing("must not run"))).with_telemetry(telemetry);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let set = assembler.assemble(&SourceText::new("  [3] \n"), &request(3), &mut rng);
        assert!(set.is_empty());
        assert_eq!(set.meta.total_questions, 0);
        assert_eq!(memory.messages(), vec!["mcq.assemble.empty".to_string()]);
    }

    #[test]
    fn ranking_failure_is_absorbed() {
        let memory = Arc::new(MemoryLogger::new());
        let telemetry = McqTelemetry::builder("mcq")
            .sink(memory.clone())
            .build()
            .unwrap();
        let assembler =
            assembler(Arc::new(FixedRanker::failing("backend down"))).with_telemetry(telemetry);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let set = assembler.assemble(&SourceText::new(CELL_TEXT), &request(2), &mut rng);
        assert!(set.is_empty());
        let messages = memory.messages();
        assert!(messages.contains(&"mcq.rank.failed".to_string()));
        assert!(messages.contains(&"mcq.assemble.partial".to_string()));
    }

    #[test]
    fn achieved_never_exceeds_requested() {
        let ranker = FixedRanker::new(["cell", "mitochondria", "organelles", "functions"]);
        let assembler = assembler(Arc::new(ranker));
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let set = assembler.assemble(&SourceText::new(CELL_TEXT), &request(1), &mut rng);
            assert!(set.achieved() <= 1);
        }
    }
}
