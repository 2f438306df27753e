//! High-level orchestration for quiz generation.

use std::{fmt, sync::Arc};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde_json::json;
use shared_logging::LogLevel;
use thiserror::Error;

use crate::{
    access_code::generate_access_code,
    assembler::{AssemblyRequest, QuestionAssembler},
    config::{ConfigError, KuizConfig, OntologySettings},
    difficulty::Difficulty,
    distractor::DistractorSynthesizer,
    handoff::{HandoffError, QuizRecord, QuizSink},
    lexical::{LexicalOntology, NullOntology, OntologyError, RelationResolver, WordNetOntology},
    question::QuestionSet,
    ranking::{ConceptRanker, MultipartiteRanker},
    sentence::SentenceMatcher,
    source::{SourceDocument, SourceError},
    telemetry::McqTelemetry,
};

/// Access-code draws attempted before a duplicate is reported.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Errors surfaced by the generation runtime.
#[derive(Debug, Error)]
pub enum KuizError {
    /// The source supplied no text.
    #[error("no content to generate questions from")]
    NoContent,
    /// The request parameters are unusable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Configuration failed to load.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The ontology failed to load.
    #[error(transparent)]
    Ontology(#[from] OntologyError),
    /// The source document could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// Publishing failed.
    #[error(transparent)]
    Handoff(#[from] HandoffError),
    /// Log sinks could not be opened.
    #[error("telemetry setup failed: {0}")]
    Telemetry(String),
    /// A batch worker panicked or was cancelled.
    #[error("generation worker failed: {0}")]
    Worker(String),
}

/// Parameters of one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Text provider output.
    pub document: SourceDocument,
    /// Questions wanted; the configured default when absent.
    pub count: Option<usize>,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Seconds per question; the configured default when absent.
    pub time_per_question: Option<u32>,
    /// Attempts per player; the configured default when absent.
    pub max_attempts: Option<u32>,
    /// RNG seed; the configured seed or entropy when absent.
    pub seed: Option<u64>,
}

impl GenerationRequest {
    /// Request with configured defaults for everything but the document.
    #[must_use]
    pub fn new(document: SourceDocument) -> Self {
        Self {
            document,
            count: None,
            difficulty: Difficulty::default(),
            time_per_question: None,
            max_attempts: None,
            seed: None,
        }
    }

    /// Sets the question count.
    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets the difficulty tier.
    #[must_use]
    pub const fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Fixes the RNG seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Generated quiz awaiting publication.
#[derive(Debug, Clone)]
pub struct GeneratedQuiz {
    /// Code players use to open the quiz.
    pub access_code: String,
    /// Display title.
    pub title: String,
    /// Questions and metadata.
    pub question_set: QuestionSet,
    rng: ChaCha8Rng,
    code_length: usize,
}

impl GeneratedQuiz {
    /// Response body reported to the requester.
    #[must_use]
    pub fn summary(&self) -> GenerationSummary {
        GenerationSummary {
            message: "Quiz generated successfully".to_string(),
            quiz_code: self.access_code.clone(),
            title: self.title.clone(),
            count: self.question_set.achieved(),
        }
    }

    fn redraw_code(&mut self) -> String {
        self.access_code = generate_access_code(&mut self.rng, self.code_length);
        self.access_code.clone()
    }
}

/// Outcome of a generation call as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    /// Status line.
    pub message: String,
    /// Access code.
    pub quiz_code: String,
    /// Quiz title.
    pub title: String,
    /// Questions produced.
    pub count: usize,
}

/// Initialized generation pipeline, shared across requests.
#[derive(Clone)]
pub struct QuizRuntime {
    config: KuizConfig,
    assembler: QuestionAssembler,
    ontology_name: &'static str,
    telemetry: Option<McqTelemetry>,
}

impl fmt::Debug for QuizRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizRuntime")
            .field("assembler", &self.assembler)
            .field("ontology", &self.ontology_name)
            .finish_non_exhaustive()
    }
}

impl QuizRuntime {
    /// Loads the ontology and ranker described by `config` and opens the
    /// configured log file.
    pub fn initialize(config: &KuizConfig) -> Result<Self, KuizError> {
        config.validate()?;
        let ontology: Arc<dyn LexicalOntology> = match &config.ontology {
            OntologySettings::Wordnet { dir } => Arc::new(WordNetOntology::load(dir)?),
            OntologySettings::Disabled => Arc::new(NullOntology),
        };
        let ranker = Arc::new(MultipartiteRanker::new(config.ranking.clone()));
        let mut runtime = Self::with_backends(config, ranker, ontology);
        if let Some(path) = &config.logging.path {
            let telemetry = McqTelemetry::builder("mcq")
                .log_path(path)
                .min_level(config.logging.level()?)
                .build()
                .map_err(|err| KuizError::Telemetry(err.to_string()))?;
            runtime = runtime.with_telemetry(telemetry);
        }
        Ok(runtime)
    }

    /// Runtime over explicit backends, e.g. stubs in tests.
    #[must_use]
    pub fn with_backends(
        config: &KuizConfig,
        ranker: Arc<dyn ConceptRanker>,
        ontology: Arc<dyn LexicalOntology>,
    ) -> Self {
        let ontology_name = ontology.name();
        let synthesizer = DistractorSynthesizer::new(RelationResolver::new(ontology))
            .with_fillers(config.distractors.fillers.clone());
        let assembler = QuestionAssembler::new(
            ranker,
            synthesizer,
            SentenceMatcher::new(config.sentences),
            config.generation.pools(),
        );
        Self {
            config: config.clone(),
            assembler,
            ontology_name,
            telemetry: None,
        }
    }

    /// Attaches telemetry to the runtime and its assembler.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: McqTelemetry) -> Self {
        self.assembler = self.assembler.with_telemetry(telemetry.clone());
        self.telemetry = Some(telemetry);
        self.log(
            LogLevel::Info,
            "mcq.runtime.initialized",
            json!({ "ranker": self.assembler.ranker_name(), "ontology": self.ontology_name }),
        );
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &KuizConfig {
        &self.config
    }

    /// Accesses the telemetry handle.
    #[must_use]
    pub const fn telemetry(&self) -> Option<&McqTelemetry> {
        self.telemetry.as_ref()
    }

    /// Generates a quiz for `request`.
    ///
    /// Missing text is an error; a short or empty question set is not.
    pub fn generate(&self, request: &GenerationRequest) -> Result<GeneratedQuiz, KuizError> {
        let generation = &self.config.generation;
        let count = request.count.unwrap_or(generation.default_count);
        if count == 0 {
            return Err(KuizError::InvalidRequest("count must be positive".into()));
        }
        let Some(text) = request.document.source_text() else {
            self.log(
                LogLevel::Warn,
                "mcq.generate.no_content",
                json!({ "title": request.document.title() }),
            );
            return Err(KuizError::NoContent);
        };
        let mut rng = match request.seed.or(generation.seed) {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let assembly = AssemblyRequest {
            count,
            difficulty: request.difficulty,
            time_per_question: request
                .time_per_question
                .unwrap_or(generation.time_per_question),
            max_attempts: request.max_attempts.unwrap_or(generation.max_attempts),
        };
        let question_set = self.assembler.assemble(&text, &assembly, &mut rng);
        let access_code = generate_access_code(&mut rng, generation.code_length);
        self.log(
            LogLevel::Info,
            "mcq.generate.complete",
            json!({
                "title": request.document.title(),
                "access_code": access_code,
                "requested": count,
                "achieved": question_set.achieved(),
            }),
        );
        Ok(GeneratedQuiz {
            access_code,
            title: request.document.title().to_string(),
            question_set,
            rng,
            code_length: generation.code_length,
        })
    }

    /// Hands `quiz` to `sink`, drawing a fresh access code whenever the sink
    /// reports a duplicate.
    pub async fn publish(
        &self,
        quiz: &mut GeneratedQuiz,
        sink: &dyn QuizSink,
    ) -> Result<QuizRecord, KuizError> {
        let mut record = QuizRecord::new(&quiz.access_code, &quiz.title, &quiz.question_set)?;
        let mut attempt = 1;
        loop {
            match sink.publish(record.clone()).await {
                Ok(()) => {
                    self.log(
                        LogLevel::Info,
                        "mcq.publish.complete",
                        json!({ "access_code": record.access_code, "attempts": attempt }),
                    );
                    return Ok(record);
                }
                Err(HandoffError::DuplicateCode(code)) if attempt < MAX_CODE_ATTEMPTS => {
                    self.log(
                        LogLevel::Warn,
                        "mcq.publish.duplicate_code",
                        json!({ "access_code": code, "attempt": attempt }),
                    );
                    record = record.with_access_code(quiz.redraw_code());
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn log(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(level, message, metadata);
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared_logging::MemoryLogger;
    use tokio::runtime::Runtime;

    use super::*;
    use crate::{
        access_code::is_valid_access_code,
        handoff::MemoryQuizSink,
        lexical::{PartOfSpeech, StaticOntology},
        ranking::FixedRanker,
    };

    const CELL_TEXT: &str = "The mitochondria is the powerhouse of the cell. \
        Cells contain organelles that perform specific functions.";

    fn runtime() -> QuizRuntime {
        QuizRuntime::initialize(&KuizConfig::default()).unwrap()
    }

    #[test]
    fn generates_the_mitochondria_quiz() {
        let request = GenerationRequest::new(SourceDocument::inline(CELL_TEXT))
            .with_count(1)
            .with_seed(7);
        let quiz = runtime().generate(&request).unwrap();
        assert_eq!(quiz.question_set.achieved(), 1);
        assert!(is_valid_access_code(&quiz.access_code, 10));
        assert_eq!(quiz.title, "Generated Quiz");
        let summary = quiz.summary();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.quiz_code, quiz.access_code);
    }

    #[test]
    fn seeded_requests_are_reproducible() {
        let request = GenerationRequest::new(SourceDocument::inline(CELL_TEXT))
            .with_count(2)
            .with_seed(99);
        let runtime = runtime();
        let first = runtime.generate(&request).unwrap();
        let second = runtime.generate(&request).unwrap();
        assert_eq!(first.access_code, second.access_code);
        assert_eq!(first.question_set, second.question_set);
    }

    #[test]
    fn missing_text_is_no_content() {
        let runtime = runtime();
        let absent = GenerationRequest::new(SourceDocument::topic("Atlantis", None));
        assert!(matches!(runtime.generate(&absent), Err(KuizError::NoContent)));
        let blank = GenerationRequest::new(SourceDocument::inline("   "));
        assert!(matches!(runtime.generate(&blank), Err(KuizError::NoContent)));
    }

    #[test]
    fn citation_only_text_is_an_empty_quiz() {
        let request = GenerationRequest::new(SourceDocument::inline("[1][2]")).with_seed(1);
        let quiz = runtime().generate(&request).unwrap();
        assert!(quiz.question_set.is_empty());
        assert_eq!(quiz.question_set.meta.total_questions, 0);
    }

    #[test]
    fn zero_count_is_rejected() {
        let request = GenerationRequest::new(SourceDocument::inline(CELL_TEXT)).with_count(0);
        assert!(matches!(runtime().generate(&request), Err(KuizError::InvalidRequest(_))));
    }

    #[test]
    fn missing_wordnet_fails_initialization() {
        let mut config = KuizConfig::default();
        config.ontology = OntologySettings::Wordnet {
            dir: "/nonexistent/wordnet".into(),
        };
        assert!(matches!(QuizRuntime::initialize(&config), Err(KuizError::Ontology(_))));
    }

    #[test]
    fn unknown_concept_uses_source_nouns() {
        let mut onto = StaticOntology::new();
        let vehicle = onto.add_sense(PartOfSpeech::Noun, &["vehicle"]);
        let car = onto.add_sense(PartOfSpeech::Noun, &["car"]);
        onto.add_hypernym(car, vehicle);
        let runtime = QuizRuntime::with_backends(
            &KuizConfig::default(),
            Arc::new(FixedRanker::new(["zzqorp"])),
            Arc::new(onto),
        );
        let text = "The zzqorp feeds on algae, plankton and krill near the reef.";
        let request = GenerationRequest::new(SourceDocument::inline(text))
            .with_count(1)
            .with_seed(3);
        let quiz = runtime.generate(&request).unwrap();
        let question = &quiz.question_set.questions[0];
        assert_eq!(question.answer(), "zzqorp");
        let source_nouns = ["feeds", "algae", "plankton", "krill", "reef"];
        assert!(question
            .options()
            .iter()
            .all(|o| o == "zzqorp" || source_nouns.contains(&o.as_str())));
    }

    struct TakenOnce {
        taken: Mutex<bool>,
        inner: MemoryQuizSink,
    }

    #[async_trait]
    impl QuizSink for TakenOnce {
        async fn publish(&self, record: QuizRecord) -> Result<(), HandoffError> {
            let first = std::mem::replace(&mut *self.taken.lock(), false);
            if first {
                return Err(HandoffError::DuplicateCode(record.access_code));
            }
            self.inner.publish(record).await
        }
    }

    #[test]
    fn duplicate_codes_are_redrawn() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let memory = Arc::new(MemoryLogger::new());
            let telemetry = McqTelemetry::builder("mcq")
                .sink(memory.clone())
                .build()
                .unwrap();
            let runtime = runtime().with_telemetry(telemetry);
            let request = GenerationRequest::new(SourceDocument::inline(CELL_TEXT)).with_seed(5);
            let mut quiz = runtime.generate(&request).unwrap();
            let original = quiz.access_code.clone();
            let sink = TakenOnce {
                taken: Mutex::new(true),
                inner: MemoryQuizSink::new(),
            };
            let record = runtime.publish(&mut quiz, &sink).await.unwrap();
            assert_ne!(record.access_code, original);
            assert_eq!(record.access_code, quiz.access_code);
            assert_eq!(sink.inner.snapshot().len(), 1);
            assert!(memory
                .messages()
                .contains(&"mcq.publish.duplicate_code".to_string()));
        });
    }

    #[test]
    fn colliding_seed_redraws_code() {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let runtime = runtime();
            let request = GenerationRequest::new(SourceDocument::inline(CELL_TEXT)).with_seed(5);
            let sink = MemoryQuizSink::new();
            let mut first = runtime.generate(&request).unwrap();
            runtime.publish(&mut first, &sink).await.unwrap();
            let mut second = runtime.generate(&request).unwrap();
            // Same seed, same code sequence: the first draw collides, the redraw does not.
            let record = runtime.publish(&mut second, &sink).await.unwrap();
            assert_ne!(record.access_code, first.access_code);
            assert_eq!(sink.snapshot().len(), 2);
        });
    }
}
