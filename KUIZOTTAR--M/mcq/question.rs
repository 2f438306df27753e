use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{difficulty::Difficulty, distractor::OPTION_COUNT};

/// Placeholder substituted for the concept in a question stem.
pub const MASK_TOKEN: &str = "______";

/// Reasons a question cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    /// Option list has the wrong length.
    #[error("expected {expected} options, got {actual}")]
    OptionCount {
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },
    /// The answer is not one of the options.
    #[error("answer `{0}` is not among the options")]
    AnswerMissing(String),
    /// The stem has no blank.
    #[error("question stem does not contain the mask token")]
    Unmasked,
    /// Metadata disagrees with the stored questions.
    #[error("metadata records {declared} questions but {actual} are stored")]
    CountMismatch {
        /// `meta.total_questions`.
        declared: usize,
        /// Questions present.
        actual: usize,
    },
}

#[derive(Deserialize)]
struct RawQuestion {
    question: String,
    options: Vec<String>,
    answer: String,
}

/// Fill-in-the-blank multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuestion")]
pub struct Question {
    #[serde(rename = "question")]
    stem: String,
    options: Vec<String>,
    answer: String,
}

impl TryFrom<RawQuestion> for Question {
    type Error = QuestionError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        Self::new(raw.question, raw.options, raw.answer)
    }
}

impl Question {
    /// Validates and builds a question.
    pub fn new(
        stem: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let stem = stem.into();
        let answer = answer.into();
        if options.len() != OPTION_COUNT {
            return Err(QuestionError::OptionCount {
                expected: OPTION_COUNT,
                actual: options.len(),
            });
        }
        if !options.contains(&answer) {
            return Err(QuestionError::AnswerMissing(answer));
        }
        if !stem.contains(MASK_TOKEN) {
            return Err(QuestionError::Unmasked);
        }
        Ok(Self {
            stem,
            options,
            answer,
        })
    }

    /// Sentence with the concept blanked out.
    #[must_use]
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Answer options in presentation order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Correct option.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// Settings recorded alongside the questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizMeta {
    /// Tier used to pick concepts.
    pub difficulty: Difficulty,
    /// Seconds allowed per question.
    pub time_per_question: u32,
    /// Questions actually produced.
    pub total_questions: usize,
    /// Questions asked for.
    pub requested_questions: usize,
    /// Attempts a player is allowed.
    pub max_attempts: u32,
}

#[derive(Deserialize)]
struct RawQuestionSet {
    meta: QuizMeta,
    questions: Vec<Question>,
}

impl TryFrom<RawQuestionSet> for QuestionSet {
    type Error = QuestionError;

    fn try_from(raw: RawQuestionSet) -> Result<Self, Self::Error> {
        if raw.meta.total_questions != raw.questions.len() {
            return Err(QuestionError::CountMismatch {
                declared: raw.meta.total_questions,
                actual: raw.questions.len(),
            });
        }
        Ok(Self {
            meta: raw.meta,
            questions: raw.questions,
        })
    }
}

/// Ordered questions of one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuestionSet")]
pub struct QuestionSet {
    /// Settings and counts.
    pub meta: QuizMeta,
    /// Questions in assembly order.
    pub questions: Vec<Question>,
}

impl QuestionSet {
    /// Wraps `questions`, filling the achieved count.
    #[must_use]
    pub fn new(
        questions: Vec<Question>,
        difficulty: Difficulty,
        requested: usize,
        time_per_question: u32,
        max_attempts: u32,
    ) -> Self {
        Self {
            meta: QuizMeta {
                difficulty,
                time_per_question,
                total_questions: questions.len(),
                requested_questions: requested,
                max_attempts,
            },
            questions,
        }
    }

    /// Questions produced.
    #[must_use]
    pub fn achieved(&self) -> usize {
        self.questions.len()
    }

    /// True when fewer questions than requested were produced.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.achieved() < self.meta.requested_questions
    }

    /// True when no question was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Opaque JSON text handed to persistence.
    pub fn to_blob(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parses a stored blob.
    pub fn from_blob(blob: &str) -> serde_json::Result<Self> {
        serde_json::from_str(blob)
    }
}
