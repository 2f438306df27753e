#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Kuizottar multiple-choice question generation: concept ranking, sentence
//! matching, distractor synthesis and quiz hand-off.

/// Text normalization, tokenization and tagging.
#[path = "../text/main.rs"]
pub mod text;

/// Keyphrase ranking backends.
#[path = "../ranking/main.rs"]
pub mod ranking;

/// Word-sense ontologies and related alternatives.
#[path = "../lexical/main.rs"]
pub mod lexical;

/// Difficulty tiers and window selection.
#[path = "../difficulty.rs"]
pub mod difficulty;

/// Sentence matching.
#[path = "../sentence.rs"]
pub mod sentence;

/// Answer option synthesis.
#[path = "../distractor.rs"]
pub mod distractor;

/// Question and quiz data model.
#[path = "../question.rs"]
pub mod question;

/// Per-text question assembly.
#[path = "../assembler.rs"]
pub mod assembler;

/// Access code generation.
#[path = "../access_code.rs"]
pub mod access_code;

/// Source documents and text providers.
#[path = "../source.rs"]
pub mod source;

/// TOML configuration.
#[path = "../config.rs"]
pub mod config;

/// Telemetry helpers.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Persistence hand-off.
#[path = "../handoff.rs"]
pub mod handoff;

/// Concurrent batch generation.
#[path = "../batch.rs"]
pub mod batch;

/// High-level orchestration entry point.
#[path = "../main.rs"]
pub mod orchestration_entry;

pub use assembler::{mask_concept, AssemblyRequest, PoolSettings, QuestionAssembler};
pub use batch::BatchGenerator;
pub use config::{ConfigError, KuizConfig, OntologySettings};
pub use difficulty::{select_window, Difficulty};
pub use distractor::{DistractorSynthesizer, SourceNouns, DEFAULT_FILLERS};
pub use handoff::{
    find_record, read_store, HandoffError, JsonlQuizSink, MemoryQuizSink, QuizRecord, QuizSink,
};
pub use lexical::{
    LexicalOntology, NullOntology, OntologyError, RelationResolver, StaticOntology,
    WordNetOntology,
};
pub use orchestration_entry::{
    GeneratedQuiz, GenerationRequest, GenerationSummary, KuizError, QuizRuntime,
};
pub use question::{Question, QuestionError, QuestionSet, QuizMeta, MASK_TOKEN};
pub use ranking::{Candidate, ConceptRanker, FixedRanker, MultipartiteRanker, RankingError};
pub use sentence::{SentenceBounds, SentenceMatcher};
pub use source::{SourceDocument, SourceError, SourceOrigin};
pub use telemetry::{McqTelemetry, McqTelemetryBuilder};
pub use text::SourceText;
