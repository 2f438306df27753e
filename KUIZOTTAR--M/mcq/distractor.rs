use indexmap::IndexSet;
use once_cell::unsync::OnceCell;
use rand::{seq::SliceRandom, Rng};

use crate::{lexical::RelationResolver, text::HeuristicTagger};

/// Options per question.
pub const OPTION_COUNT: usize = 4;

/// Filler answers used when the ontology and source nouns run dry.
pub const DEFAULT_FILLERS: [&str; 3] = [
    "None of the above",
    "All of the above",
    "Not enough information",
];

/// Noun tokens of a source text, tagged on first use and then reused for
/// every question of the request.
#[derive(Debug)]
pub struct SourceNouns<'a> {
    text: &'a str,
    tagger: HeuristicTagger,
    nouns: OnceCell<IndexSet<String>>,
}

impl<'a> SourceNouns<'a> {
    /// Lazily tagged view over `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            tagger: HeuristicTagger::new(),
            nouns: OnceCell::new(),
        }
    }

    /// Unique nouns in first-appearance order.
    pub fn get(&self) -> &IndexSet<String> {
        self.nouns.get_or_init(|| self.tagger.nouns(self.text))
    }

    /// True once the text has been tagged.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.nouns.get().is_some()
    }
}

fn contains_ignore_case(options: &[String], candidate: &str) -> bool {
    let candidate = candidate.to_lowercase();
    options.iter().any(|option| option.to_lowercase() == candidate)
}

/// Builds the four answer options of a question in three tiers: ontology
/// siblings, nouns from the source, then fillers.
#[derive(Debug, Clone)]
pub struct DistractorSynthesizer {
    resolver: RelationResolver,
    fillers: Vec<String>,
}

impl DistractorSynthesizer {
    /// Synthesizer with the default fillers.
    #[must_use]
    pub fn new(resolver: RelationResolver) -> Self {
        Self {
            resolver,
            fillers: DEFAULT_FILLERS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replaces the filler list. An empty list keeps the defaults.
    #[must_use]
    pub fn with_fillers(mut self, fillers: Vec<String>) -> Self {
        if !fillers.is_empty() {
            self.fillers = fillers;
        }
        self
    }

    /// Resolver used for the ontology tier.
    #[must_use]
    pub const fn resolver(&self) -> &RelationResolver {
        &self.resolver
    }

    /// Exactly four shuffled options, one of which is `correct`.
    pub fn build_options<R>(
        &self,
        correct: &str,
        nouns: &SourceNouns<'_>,
        rng: &mut R,
    ) -> Vec<String>
    where
        R: Rng + ?Sized,
    {
        let mut options = vec![correct.to_string()];
        for alternative in self.resolver.related_alternatives(correct) {
            if options.len() >= OPTION_COUNT {
                break;
            }
            if !contains_ignore_case(&options, &alternative) {
                options.push(alternative);
            }
        }

        if options.len() < OPTION_COUNT {
            let mut pool: Vec<&String> = Vec::new();
            let mut seen: IndexSet<String> = IndexSet::new();
            for noun in nouns.get() {
                let lower = noun.to_lowercase();
                if !contains_ignore_case(&options, noun) && seen.insert(lower) {
                    pool.push(noun);
                }
            }
            pool.shuffle(rng);
            let missing = OPTION_COUNT - options.len();
            options.extend(pool.into_iter().take(missing).cloned());
        }

        let mut fillers = self.fillers.iter();
        while options.len() < OPTION_COUNT {
            match fillers.next() {
                Some(filler) if contains_ignore_case(&options, filler) => {}
                Some(filler) => options.push(filler.clone()),
                None => options.push(self.repeat_filler(correct, &options).to_string()),
            }
        }

        options.truncate(OPTION_COUNT);
        options.shuffle(rng);
        options
    }

    /// Padding once the filler list is spent: the last filler, unless it is
    /// the answer, then an unused default, then any default but the answer.
    fn repeat_filler(&self, correct: &str, options: &[String]) -> &str {
        let is_answer = |filler: &str| filler.to_lowercase() == correct.to_lowercase();
        self.fillers
            .last()
            .map(String::as_str)
            .filter(|filler| !is_answer(filler))
            .or_else(|| {
                DEFAULT_FILLERS
                    .iter()
                    .copied()
                    .find(|filler| !contains_ignore_case(options, filler))
            })
            .or_else(|| DEFAULT_FILLERS.iter().copied().find(|filler| !is_answer(filler)))
            .unwrap_or(DEFAULT_FILLERS[0])
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::lexical::{NullOntology, PartOfSpeech, StaticOntology};

    fn synthesizer_without_ontology() -> DistractorSynthesizer {
        DistractorSynthesizer::new(RelationResolver::new(Arc::new(NullOntology)))
    }

    #[test]
    fn ontology_tier_fills_all_slots() {
        let mut onto = StaticOntology::new();
        let vehicle = onto.add_sense(PartOfSpeech::Noun, &["vehicle"]);
        for name in ["car", "bus", "truck", "tram"] {
            let sense = onto.add_sense(PartOfSpeech::Noun, &[name]);
            onto.add_hypernym(sense, vehicle);
        }
        let synth = DistractorSynthesizer::new(RelationResolver::new(Arc::new(onto)));
        let nouns = SourceNouns::new("Roads carry traffic.");
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut options = synth.build_options("car", &nouns, &mut rng);
        options.sort();
        assert_eq!(options, vec!["bus", "car", "tram", "truck"]);
        assert!(!nouns.is_computed(), "noun tier untouched");
    }

    #[test]
    fn unknown_word_falls_through_to_source_nouns() {
        let synth = synthesizer_without_ontology();
        let nouns = SourceNouns::new("The zzqorp feeds on algae, plankton and krill in the ocean.");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let options = synth.build_options("zzqorp", &nouns, &mut rng);
        assert_eq!(options.len(), OPTION_COUNT);
        assert!(nouns.is_computed());
        assert_eq!(options.iter().filter(|o| *o == "zzqorp").count(), 1);
        assert!(options.iter().all(|o| !DEFAULT_FILLERS.contains(&o.as_str())));
    }

    #[test]
    fn fillers_pad_without_duplicates() {
        let synth = synthesizer_without_ontology();
        let nouns = SourceNouns::new("");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut options = synth.build_options("photosynthesis", &nouns, &mut rng);
        options.sort();
        let mut expected: Vec<String> = DEFAULT_FILLERS.iter().map(ToString::to_string).collect();
        expected.push("photosynthesis".to_string());
        expected.sort();
        assert_eq!(options, expected);
    }

    #[test]
    fn short_filler_list_repeats_its_last_entry() {
        let synth = synthesizer_without_ontology().with_fillers(vec!["n/a".to_string()]);
        let nouns = SourceNouns::new("");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let options = synth.build_options("osmosis", &nouns, &mut rng);
        assert_eq!(options.iter().filter(|o| *o == "n/a").count(), 3);
    }

    #[test]
    fn answer_equal_to_the_filler_appears_once() {
        let synth = synthesizer_without_ontology().with_fillers(vec!["N/A".to_string()]);
        let nouns = SourceNouns::new("");
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let options = synth.build_options("n/a", &nouns, &mut rng);
        assert_eq!(options.len(), OPTION_COUNT);
        assert_eq!(options.iter().filter(|o| o.to_lowercase() == "n/a").count(), 1);
        let mut sorted = options.clone();
        sorted.sort();
        let mut expected: Vec<String> = DEFAULT_FILLERS.iter().map(ToString::to_string).collect();
        expected.push("n/a".to_string());
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn same_seed_same_order() {
        let synth = synthesizer_without_ontology();
        let text = "Glucose, oxygen, water and carbon dioxide take part in respiration.";
        let build = |seed| {
            synth.build_options(
                "glucose",
                &SourceNouns::new(text),
                &mut ChaCha8Rng::seed_from_u64(seed),
            )
        };
        let (first, second) = (build(9), build(9));
        assert_eq!(first, second);
    }
}
