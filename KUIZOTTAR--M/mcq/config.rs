use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use shared_logging::LogLevel;
use thiserror::Error;

use crate::{
    access_code::DEFAULT_CODE_LENGTH, assembler::PoolSettings, distractor::DEFAULT_FILLERS,
    ranking::RankingParams, sentence::SentenceBounds,
};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("reading config {path}: {source}")]
    Read {
        /// Config file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("parsing config {path}: {source}")]
    Parse {
        /// Config file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Generator configuration.
#[derive(Debug, Clone)]
pub struct KuizConfig {
    /// Request defaults and pool sizing.
    pub generation: GenerationSettings,
    /// Sentence length bounds.
    pub sentences: SentenceBounds,
    /// Distractor fillers.
    pub distractors: DistractorSettings,
    /// Ranker tunables.
    pub ranking: RankingParams,
    /// Ontology backend.
    pub ontology: OntologySettings,
    /// Structured log output.
    pub logging: LoggingSettings,
    /// Quiz store location.
    pub store: StoreSettings,
    source_dir: PathBuf,
}

impl Default for KuizConfig {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            sentences: SentenceBounds::default(),
            distractors: DistractorSettings::default(),
            ranking: RankingParams::default(),
            ontology: OntologySettings::default(),
            logging: LoggingSettings::default(),
            store: StoreSettings::default(),
            source_dir: PathBuf::from("."),
        }
    }
}

impl KuizConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let source_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let document: KuizConfigSerde = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_document(document, source_dir)
    }

    /// Parses TOML text, resolving relative paths against `source_dir`.
    pub fn from_toml_str(raw: &str, source_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let document: KuizConfigSerde = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::from_document(document, source_dir.into())
    }

    fn from_document(document: KuizConfigSerde, source_dir: PathBuf) -> Result<Self, ConfigError> {
        let mut config = Self {
            generation: document.generation,
            sentences: document.sentences,
            distractors: document.distractors,
            ranking: document.ranking,
            ontology: document.ontology,
            logging: document.logging,
            store: document.store,
            source_dir,
        };
        config.validate()?;
        if config.distractors.fillers.is_empty() {
            config.distractors.fillers = default_fillers();
        }
        if let OntologySettings::Wordnet { dir } = &mut config.ontology {
            *dir = resolve(&config.source_dir, dir);
        }
        if let Some(path) = &mut config.logging.path {
            *path = resolve(&config.source_dir, path);
        }
        config.store.path = resolve(&config.source_dir, &config.store.path);
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;
        if self.sentences.min_words >= self.sentences.max_words {
            return Err(ConfigError::Invalid(format!(
                "sentences.min_words ({}) must be below sentences.max_words ({})",
                self.sentences.min_words, self.sentences.max_words
            )));
        }
        if generation.pool_multiplier == 0 || generation.window_multiplier == 0 {
            return Err(ConfigError::Invalid(
                "generation multipliers must be at least 1".into(),
            ));
        }
        if generation.code_length < 4 {
            return Err(ConfigError::Invalid(
                "generation.code_length must be at least 4".into(),
            ));
        }
        if generation.default_count == 0 {
            return Err(ConfigError::Invalid(
                "generation.default_count must be positive".into(),
            ));
        }
        if !(self.ranking.damping > 0.0 && self.ranking.damping < 1.0) {
            return Err(ConfigError::Invalid(
                "ranking.damping must lie strictly between 0 and 1".into(),
            ));
        }
        if self.ranking.tolerance <= 0.0 || self.ranking.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "ranking.tolerance and ranking.max_iterations must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.ranking.cluster_threshold) {
            return Err(ConfigError::Invalid(
                "ranking.cluster_threshold must lie in [0, 1]".into(),
            ));
        }
        if self.ranking.max_words == 0 {
            return Err(ConfigError::Invalid("ranking.max_words must be positive".into()));
        }
        self.logging.level()?;
        Ok(())
    }

    /// Resolves a path relative to the configuration file.
    #[must_use]
    pub fn resolve_path(&self, candidate: impl AsRef<Path>) -> PathBuf {
        resolve(&self.source_dir, candidate.as_ref())
    }
}

fn resolve(source_dir: &Path, candidate: &Path) -> PathBuf {
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        source_dir.join(candidate)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct KuizConfigSerde {
    #[serde(default)]
    generation: GenerationSettings,
    #[serde(default)]
    sentences: SentenceBounds,
    #[serde(default)]
    distractors: DistractorSettings,
    #[serde(default)]
    ranking: RankingParams,
    #[serde(default)]
    ontology: OntologySettings,
    #[serde(default)]
    logging: LoggingSettings,
    #[serde(default)]
    store: StoreSettings,
}

/// Request defaults and pool sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSettings {
    /// Questions per quiz when the request does not say.
    #[serde(default = "default_count")]
    pub default_count: usize,
    /// Seconds per question.
    #[serde(default = "default_time_per_question")]
    pub time_per_question: u32,
    /// Attempts per player.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed RNG seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Smallest candidate pool.
    #[serde(default = "default_pool_floor")]
    pub pool_floor: usize,
    /// Candidate pool per question.
    #[serde(default = "default_pool_multiplier")]
    pub pool_multiplier: usize,
    /// Difficulty window per question.
    #[serde(default = "default_window_multiplier")]
    pub window_multiplier: usize,
    /// Access code length.
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            default_count: default_count(),
            time_per_question: default_time_per_question(),
            max_attempts: default_max_attempts(),
            seed: None,
            pool_floor: default_pool_floor(),
            pool_multiplier: default_pool_multiplier(),
            window_multiplier: default_window_multiplier(),
            code_length: default_code_length(),
        }
    }
}

impl GenerationSettings {
    /// Pool sizing handed to the assembler.
    #[must_use]
    pub const fn pools(&self) -> PoolSettings {
        PoolSettings {
            pool_floor: self.pool_floor,
            pool_multiplier: self.pool_multiplier,
            window_multiplier: self.window_multiplier,
        }
    }
}

/// Distractor filler strings.
#[derive(Debug, Clone, Deserialize)]
pub struct DistractorSettings {
    /// Ordered fillers; the last one repeats when exhausted.
    #[serde(default = "default_fillers")]
    pub fillers: Vec<String>,
}

impl Default for DistractorSettings {
    fn default() -> Self {
        Self {
            fillers: default_fillers(),
        }
    }
}

/// Ontology backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OntologySettings {
    /// Princeton WordNet database directory.
    Wordnet {
        /// Directory holding `index.noun` and `data.noun`.
        dir: PathBuf,
    },
    /// No ontology; distractors come from source nouns and fillers.
    #[default]
    Disabled,
}

/// Structured log output.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// JSON-lines log file; no file logging when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            path: None,
            level: default_log_level(),
        }
    }
}

impl LoggingSettings {
    /// Minimum level written.
    pub fn level(&self) -> Result<LogLevel, ConfigError> {
        self.level
            .parse()
            .map_err(|err: anyhow::Error| ConfigError::Invalid(format!("logging.level: {err}")))
    }
}

/// Quiz store location.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// JSON-lines file receiving published quizzes.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

const fn default_count() -> usize {
    5
}

const fn default_time_per_question() -> u32 {
    30
}

const fn default_max_attempts() -> u32 {
    1
}

const fn default_pool_floor() -> usize {
    50
}

const fn default_pool_multiplier() -> usize {
    5
}

const fn default_window_multiplier() -> usize {
    2
}

const fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_fillers() -> Vec<String> {
    DEFAULT_FILLERS.iter().map(ToString::to_string).collect()
}

fn default_log_level() -> String {
    "info".into()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("quizzes.jsonl")
}
