use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use uuid::Uuid;

use crate::question::QuestionSet;

/// Errors raised at the persistence boundary.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// Another quiz already uses the access code.
    #[error("access code {0} is already taken")]
    DuplicateCode(String),
    /// Store I/O failed.
    #[error("quiz store {path}: {source}")]
    Io {
        /// Store file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A store line is not a quiz record.
    #[error("quiz store {path}:{line}: {source}")]
    Corrupt {
        /// Store file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// Encoding the record failed.
    #[error("encoding quiz record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Quiz as handed to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Code players use to open the quiz.
    pub access_code: String,
    /// Display title.
    pub title: String,
    /// Serialized question set.
    pub quiz_data: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl QuizRecord {
    /// Record wrapping the serialized `set`.
    pub fn new(
        access_code: impl Into<String>,
        title: impl Into<String>,
        set: &QuestionSet,
    ) -> Result<Self, HandoffError> {
        Ok(Self {
            id: Uuid::new_v4(),
            access_code: access_code.into(),
            title: title.into(),
            quiz_data: set.to_blob()?,
            created_at: Utc::now(),
        })
    }

    /// Same record under a different access code.
    #[must_use]
    pub fn with_access_code(mut self, access_code: impl Into<String>) -> Self {
        self.access_code = access_code.into();
        self
    }

    /// Decodes the stored question set.
    pub fn question_set(&self) -> Result<QuestionSet, HandoffError> {
        Ok(QuestionSet::from_blob(&self.quiz_data)?)
    }
}

/// Destination for generated quizzes.
#[async_trait]
pub trait QuizSink: Send + Sync {
    /// Stores the record; fails with `DuplicateCode` when the code is taken.
    async fn publish(&self, record: QuizRecord) -> Result<(), HandoffError>;
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuizSink {
    records: Arc<Mutex<Vec<QuizRecord>>>,
}

impl MemoryQuizSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of stored records.
    #[must_use]
    pub fn snapshot(&self) -> Vec<QuizRecord> {
        self.records.lock().clone()
    }

    /// Record with the given access code.
    #[must_use]
    pub fn find(&self, access_code: &str) -> Option<QuizRecord> {
        self.records
            .lock()
            .iter()
            .find(|record| record.access_code == access_code)
            .cloned()
    }
}

#[async_trait]
impl QuizSink for MemoryQuizSink {
    async fn publish(&self, record: QuizRecord) -> Result<(), HandoffError> {
        let mut records = self.records.lock();
        if records.iter().any(|r| r.access_code == record.access_code) {
            return Err(HandoffError::DuplicateCode(record.access_code));
        }
        records.push(record);
        Ok(())
    }
}

/// Append-only JSON-lines quiz store.
#[derive(Debug, Clone)]
pub struct JsonlQuizSink {
    path: PathBuf,
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl JsonlQuizSink {
    /// Sink appending to `path`, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, HandoffError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| HandoffError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(Self {
            path,
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// Store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl QuizSink for JsonlQuizSink {
    async fn publish(&self, record: QuizRecord) -> Result<(), HandoffError> {
        let _guard = self.write_lock.lock().await;
        let existing = read_store(&self.path).await?;
        if existing.iter().any(|r| r.access_code == record.access_code) {
            return Err(HandoffError::DuplicateCode(record.access_code));
        }
        let io_err = |source| HandoffError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;
        let mut data = serde_json::to_vec(&record)?;
        data.push(b'\n');
        file.write_all(&data).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }
}

/// Every record in a JSON-lines store; a missing file is an empty store.
pub async fn read_store(path: impl AsRef<Path>) -> Result<Vec<QuizRecord>, HandoffError> {
    let path = path.as_ref();
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(HandoffError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| HandoffError::Corrupt {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })
        })
        .collect()
}

/// Record with `access_code`, if stored.
pub async fn find_record(
    path: impl AsRef<Path>,
    access_code: &str,
) -> Result<Option<QuizRecord>, HandoffError> {
    Ok(read_store(path)
        .await?
        .into_iter()
        .find(|record| record.access_code == access_code))
}
