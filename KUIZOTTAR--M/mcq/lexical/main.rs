//! Word-sense ontologies and the related-alternative resolver.

/// Noun morphology used to resolve inflected lookups.
pub mod morphy;
/// Ontology trait, sense types, and in-memory backends.
pub mod ontology;
/// Hypernym/hyponym walk producing distractor alternatives.
pub mod resolver;
/// Princeton WordNet database reader.
pub mod wordnet;

pub use ontology::{
    LexicalOntology, NullOntology, OntologyError, PartOfSpeech, Sense, SenseId, StaticOntology,
};
pub use resolver::RelationResolver;
pub use wordnet::WordNetOntology;
