use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static CITATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d+(?:\s*[,\x{2013}-]\s*\d+)*\]").expect("citation pattern"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Strips control characters and bracketed citation markers, collapses
/// newlines and whitespace runs to single spaces.
///
/// Applying it to its own output returns the same string.
#[must_use]
pub fn normalize_source(raw: &str) -> String {
    let mut text: String = raw
        .chars()
        .filter_map(|ch| {
            if ch.is_whitespace() {
                Some(' ')
            } else if ch.is_control() {
                None
            } else {
                Some(ch)
            }
        })
        .collect();
    // Removing `[1]` out of `[[1]2]` exposes `[2]`.
    while CITATION_RE.is_match(&text) {
        text = CITATION_RE.replace_all(&text, "").into_owned();
    }
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Normalized prose handed to the generation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceText(String);

impl SourceText {
    /// Normalizes raw provider text.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(normalize_source(raw))
    }

    /// Borrowed view of the normalized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when nothing survived normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl AsRef<str> for SourceText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
