use std::{fmt, sync::Arc};

use indexmap::IndexSet;

use super::ontology::{LexicalOntology, PartOfSpeech};

/// Default number of alternatives requested per word.
pub const DEFAULT_ALTERNATIVES: usize = 3;

/// Produces semantically related but incorrect alternatives for a word by
/// walking to the hyponyms of its first noun sense's hypernyms.
#[derive(Clone)]
pub struct RelationResolver {
    ontology: Arc<dyn LexicalOntology>,
    limit: usize,
}

impl fmt::Debug for RelationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationResolver")
            .field("ontology", &self.ontology.name())
            .field("limit", &self.limit)
            .finish()
    }
}

impl RelationResolver {
    /// Resolver over `ontology` returning up to three alternatives.
    #[must_use]
    pub fn new(ontology: Arc<dyn LexicalOntology>) -> Self {
        Self {
            ontology,
            limit: DEFAULT_ALTERNATIVES,
        }
    }

    /// Overrides the alternative limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Name of the backing ontology.
    #[must_use]
    pub fn ontology_name(&self) -> &'static str {
        self.ontology.name()
    }

    /// Sibling concepts of `word` in ontology order.
    ///
    /// Words without a noun sense, and noun senses without hypernyms, yield
    /// an empty set. Names equal to `word` ignoring case are skipped.
    #[must_use]
    pub fn related_alternatives(&self, word: &str) -> IndexSet<String> {
        let mut alternatives = IndexSet::new();
        if self.limit == 0 {
            return alternatives;
        }
        let Some(sense) = self
            .ontology
            .senses(word)
            .into_iter()
            .find(|sense| sense.pos == PartOfSpeech::Noun)
        else {
            return alternatives;
        };
        let target = word.trim().to_lowercase();
        for &hypernym in self.ontology.hypernyms(sense.id) {
            for &hyponym in self.ontology.hyponyms(hypernym) {
                let Some(name) = self.ontology.lemma_names(hyponym).first() else {
                    continue;
                };
                let surface = name.replace('_', " ");
                if surface.to_lowercase() == target {
                    continue;
                }
                alternatives.insert(surface);
                if alternatives.len() >= self.limit {
                    return alternatives;
                }
            }
        }
        alternatives
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::{
        ontology::{NullOntology, StaticOntology},
        wordnet::{fixture, WordNetOntology},
    };
    use tempfile::tempdir;

    fn wordnet_resolver() -> RelationResolver {
        let dir = tempdir().unwrap();
        fixture::write(dir.path());
        RelationResolver::new(Arc::new(WordNetOntology::load(dir.path()).unwrap()))
    }

    #[test]
    fn car_yields_vehicle_siblings() {
        let alternatives = wordnet_resolver().related_alternatives("car");
        let names: Vec<&str> = alternatives.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["bus", "truck", "go-kart"]);
        assert!(names.iter().all(|name| !name.eq_ignore_ascii_case("car")));
    }

    #[test]
    fn unknown_word_yields_nothing() {
        assert!(wordnet_resolver().related_alternatives("zzqorp").is_empty());
    }

    #[test]
    fn sense_without_hypernym_yields_nothing() {
        assert!(wordnet_resolver().related_alternatives("conveyance").is_empty());
    }

    #[test]
    fn first_noun_sense_is_used_and_underscores_become_spaces() {
        let mut onto = StaticOntology::new();
        let verb = onto.add_sense(PartOfSpeech::Verb, &["plant"]);
        let organism = onto.add_sense(PartOfSpeech::Noun, &["organism"]);
        let plant = onto.add_sense(PartOfSpeech::Noun, &["plant", "flora"]);
        let animal = onto.add_sense(PartOfSpeech::Noun, &["animal"]);
        let fungus = onto.add_sense(PartOfSpeech::Noun, &["true_fungus"]);
        onto.add_hypernym(plant, organism);
        onto.add_hypernym(animal, organism);
        onto.add_hypernym(fungus, organism);
        onto.add_hypernym(verb, organism);
        let resolver = RelationResolver::new(Arc::new(onto));
        let alternatives = resolver.related_alternatives("Plant");
        let names: Vec<&str> = alternatives.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["animal", "true fungus"]);
    }

    #[test]
    fn limit_caps_the_walk() {
        let alternatives = wordnet_resolver().with_limit(1).related_alternatives("truck");
        assert_eq!(alternatives.len(), 1);
        assert_eq!(alternatives[0], "bus");
    }

    #[test]
    fn disabled_ontology_yields_nothing() {
        let resolver = RelationResolver::new(Arc::new(NullOntology));
        assert!(resolver.related_alternatives("car").is_empty());
        assert_eq!(resolver.ontology_name(), "disabled");
    }
}
