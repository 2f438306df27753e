use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::SourceText;

/// Title used when the provider gives none.
pub const DEFAULT_TITLE: &str = "Generated Quiz";

const PLAINTEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "text"];

/// Errors raised while reading a source document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading the file failed.
    #[error("reading {path}: {source}")]
    Io {
        /// Source file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not UTF-8.
    #[error("{0} is not valid UTF-8 text")]
    Encoding(PathBuf),
    /// The extension is not a plaintext format.
    #[error("unsupported document format `{0}`")]
    UnsupportedFormat(String),
}

/// Where a document came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceOrigin {
    /// Text supplied directly.
    Inline,
    /// Plaintext upload.
    File {
        /// File name without directories.
        name: String,
    },
    /// Pre-fetched encyclopedic summary.
    Topic {
        /// Topic name.
        name: String,
    },
}

/// Raw text plus the quiz title derived from its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    origin: SourceOrigin,
    title: String,
    raw: Option<String>,
}

impl SourceDocument {
    /// Document from inline text.
    #[must_use]
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            origin: SourceOrigin::Inline,
            title: DEFAULT_TITLE.to_string(),
            raw: Some(text.into()),
        }
    }

    /// Document from a topic summary; `None` when the topic was not found.
    #[must_use]
    pub fn topic(name: impl Into<String>, summary: Option<String>) -> Self {
        let name = name.into();
        Self {
            title: format!("Quiz: {name}"),
            origin: SourceOrigin::Topic { name },
            raw: summary,
        }
    }

    /// Reads a UTF-8 plaintext file (`.txt`, `.md`, `.text`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !PLAINTEXT_EXTENSIONS.contains(&extension.as_str()) {
            return Err(SourceError::UnsupportedFormat(extension));
        }
        let bytes = fs::read(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| SourceError::Encoding(path.to_path_buf()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            title: format!("Quiz: {name}"),
            origin: SourceOrigin::File { name },
            raw: Some(text),
        })
    }

    /// Replaces the derived title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Quiz title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Origin of the text.
    #[must_use]
    pub const fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    /// Raw provider text.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// True when the provider returned nothing or only whitespace.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.raw.as_deref().is_some_and(|raw| !raw.trim().is_empty())
    }

    /// Normalized text, or `None` when there is no content.
    #[must_use]
    pub fn source_text(&self) -> Option<SourceText> {
        if self.has_content() {
            self.raw.as_deref().map(SourceText::new)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn titles_follow_the_origin() {
        assert_eq!(SourceDocument::inline("x").title(), "Generated Quiz");
        assert_eq!(SourceDocument::topic("Photosynthesis", None).title(), "Quiz: Photosynthesis");
        let renamed = SourceDocument::inline("x").with_title("Biology 101");
        assert_eq!(renamed.title(), "Biology 101");
    }

    #[test]
    fn missing_topic_has_no_content() {
        let doc = SourceDocument::topic("Atlantis", None);
        assert!(!doc.has_content());
        assert!(doc.source_text().is_none());
        assert!(SourceDocument::inline(" \n\t").source_text().is_none());
    }

    #[test]
    fn reads_plaintext_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cells.md");
        fs::write(&path, "Cells divide.\nTissues form organs. [4]").unwrap();
        let doc = SourceDocument::from_file(&path).unwrap();
        assert_eq!(doc.title(), "Quiz: cells.md");
        assert_eq!(
            doc.origin(),
            &SourceOrigin::File {
                name: "cells.md".into()
            }
        );
        assert_eq!(
            doc.source_text().unwrap().as_str(),
            "Cells divide. Tissues form organs."
        );
    }

    #[test]
    fn rejects_binary_and_unknown_formats() {
        let dir = tempdir().unwrap();
        let pdf = dir.path().join("notes.pdf");
        fs::write(&pdf, b"%PDF").unwrap();
        assert!(matches!(
            SourceDocument::from_file(&pdf),
            Err(SourceError::UnsupportedFormat(ext)) if ext == "pdf"
        ));
        let bad = dir.path().join("notes.txt");
        fs::write(&bad, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(SourceDocument::from_file(&bad), Err(SourceError::Encoding(_))));
        let missing = dir.path().join("absent.txt");
        assert!(matches!(SourceDocument::from_file(&missing), Err(SourceError::Io { .. })));
    }
}
