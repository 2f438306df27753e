use std::{collections::HashMap, fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of one word sense inside an ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SenseId(pub u64);

impl fmt::Display for SenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.0)
    }
}

/// Syntactic category of a sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    /// Noun sense.
    Noun,
    /// Verb sense.
    Verb,
    /// Adjective sense.
    Adjective,
    /// Adverb sense.
    Adverb,
}

/// Sense returned by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sense {
    /// Identifier used for relation queries.
    pub id: SenseId,
    /// Category of the sense.
    pub pos: PartOfSpeech,
}

/// Errors raised while loading an ontology.
#[derive(Debug, Error)]
pub enum OntologyError {
    /// A required database file is absent.
    #[error("ontology file {0} not found")]
    MissingFile(PathBuf),
    /// Reading a database file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A database line could not be parsed.
    #[error("{path}:{line}: {reason}")]
    Malformed {
        /// File being parsed.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Parser complaint.
        reason: String,
    },
}

/// Read-only ontology of word senses with hypernym/hyponym relations.
///
/// Every list is returned in the backend's stable order so walks over the
/// graph are deterministic.
pub trait LexicalOntology: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Senses of `word` in ontology order, all parts of speech.
    fn senses(&self, word: &str) -> Vec<Sense>;

    /// Direct hypernyms of a sense.
    fn hypernyms(&self, sense: SenseId) -> &[SenseId];

    /// Direct hyponyms of a sense.
    fn hyponyms(&self, sense: SenseId) -> &[SenseId];

    /// Lemma names of a sense, multiword names joined with `_`.
    fn lemma_names(&self, sense: SenseId) -> &[String];
}

/// Lookup key: lowercase with spaces joined by `_`.
#[must_use]
pub fn lookup_key(word: &str) -> String {
    word.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Ontology with no senses; every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOntology;

impl LexicalOntology for NullOntology {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn senses(&self, _word: &str) -> Vec<Sense> {
        Vec::new()
    }

    fn hypernyms(&self, _sense: SenseId) -> &[SenseId] {
        &[]
    }

    fn hyponyms(&self, _sense: SenseId) -> &[SenseId] {
        &[]
    }

    fn lemma_names(&self, _sense: SenseId) -> &[String] {
        &[]
    }
}

#[derive(Debug, Clone)]
struct StaticSense {
    pos: PartOfSpeech,
    lemmas: Vec<String>,
    hypernyms: Vec<SenseId>,
    hyponyms: Vec<SenseId>,
}

/// In-memory ontology assembled programmatically.
///
/// Senses are numbered in insertion order and every lemma becomes a lookup
/// key for its sense.
#[derive(Debug, Clone, Default)]
pub struct StaticOntology {
    senses: Vec<StaticSense>,
    index: HashMap<String, Vec<SenseId>>,
}

impl StaticOntology {
    /// Empty ontology.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sense carrying `lemmas` and returns its id.
    pub fn add_sense(&mut self, pos: PartOfSpeech, lemmas: &[&str]) -> SenseId {
        let id = SenseId(self.senses.len() as u64);
        for lemma in lemmas {
            self.index.entry(lookup_key(lemma)).or_default().push(id);
        }
        self.senses.push(StaticSense {
            pos,
            lemmas: lemmas.iter().map(|lemma| (*lemma).to_string()).collect(),
            hypernyms: Vec::new(),
            hyponyms: Vec::new(),
        });
        id
    }

    /// Records `hypernym` as a parent of `sense` and the inverse hyponym link.
    pub fn add_hypernym(&mut self, sense: SenseId, hypernym: SenseId) {
        if let Some(entry) = self.get_mut(sense) {
            entry.hypernyms.push(hypernym);
        }
        if let Some(entry) = self.get_mut(hypernym) {
            entry.hyponyms.push(sense);
        }
    }

    /// Number of senses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.senses.len()
    }

    /// True when no sense was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.senses.is_empty()
    }

    fn get(&self, id: SenseId) -> Option<&StaticSense> {
        usize::try_from(id.0).ok().and_then(|idx| self.senses.get(idx))
    }

    fn get_mut(&mut self, id: SenseId) -> Option<&mut StaticSense> {
        usize::try_from(id.0).ok().and_then(|idx| self.senses.get_mut(idx))
    }
}

impl LexicalOntology for StaticOntology {
    fn name(&self) -> &'static str {
        "static"
    }

    fn senses(&self, word: &str) -> Vec<Sense> {
        self.index
            .get(&lookup_key(word))
            .map(|ids| {
                ids.iter()
                    .filter_map(|&id| self.get(id).map(|sense| Sense { id, pos: sense.pos }))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn hypernyms(&self, sense: SenseId) -> &[SenseId] {
        self.get(sense).map_or(&[], |s| s.hypernyms.as_slice())
    }

    fn hyponyms(&self, sense: SenseId) -> &[SenseId] {
        self.get(sense).map_or(&[], |s| s.hyponyms.as_slice())
    }

    fn lemma_names(&self, sense: SenseId) -> &[String] {
        self.get(sense).map_or(&[], |s| s.lemmas.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_ontology_links_both_directions() {
        let mut onto = StaticOntology::new();
        let vehicle = onto.add_sense(PartOfSpeech::Noun, &["motor_vehicle"]);
        let car = onto.add_sense(PartOfSpeech::Noun, &["car", "auto"]);
        onto.add_hypernym(car, vehicle);
        assert_eq!(onto.hypernyms(car), &[vehicle]);
        assert_eq!(onto.hyponyms(vehicle), &[car]);
        assert_eq!(onto.senses("Auto")[0].id, car);
        assert_eq!(onto.senses("motor vehicle")[0].id, vehicle);
        assert_eq!(onto.len(), 2);
    }

    #[test]
    fn null_ontology_knows_nothing() {
        let onto = NullOntology;
        assert!(onto.senses("car").is_empty());
        assert!(onto.lemma_names(SenseId(1)).is_empty());
    }

    #[test]
    fn lookup_key_joins_words() {
        assert_eq!(lookup_key("  Plant  Cell "), "plant_cell");
    }
}
