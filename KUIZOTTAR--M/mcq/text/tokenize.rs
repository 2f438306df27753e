use once_cell::sync::Lazy;
use regex::Regex;

use super::lexicon::is_abbreviation;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:[-'\x{2019}.][\p{L}\p{N}]+)*|\S").expect("token pattern")
});

/// Token with its byte span inside the tokenized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface form.
    pub text: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token {
    /// True when the token starts with a letter or digit.
    #[must_use]
    pub fn is_word(&self) -> bool {
        self.text
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric)
    }
}

/// Splits text into words, numbers and single punctuation marks.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| Token {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Number of whitespace-separated words, the measure used for sentence bounds.
#[must_use]
pub fn word_count(sentence: &str) -> usize {
    sentence.split_whitespace().count()
}

const TERMINATORS: [char; 3] = ['.', '!', '?'];
const CLOSERS: [char; 8] = ['"', '\'', ')', ']', '\u{201d}', '\u{2019}', '\u{bb}', '}'];
const OPENERS: [char; 7] = ['"', '\'', '(', '[', '\u{201c}', '\u{2018}', '\u{ab}'];

/// Splits text into sentences using punctuation heuristics.
///
/// A boundary is a run of `.`, `!` or `?` (plus closing quotes or brackets)
/// followed by whitespace and an uppercase letter, digit or opening quote.
/// Periods after known abbreviations and single-letter initials are not
/// boundaries. A trailing fragment without terminal punctuation is kept.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        let (idx, ch) = chars[i];
        if !TERMINATORS.contains(&ch) {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < chars.len()
            && (TERMINATORS.contains(&chars[j].1) || CLOSERS.contains(&chars[j].1))
        {
            j += 1;
        }
        let end = chars.get(j).map_or(text.len(), |&(pos, _)| pos);
        let followed_by_space = chars.get(j).map_or(true, |&(_, next)| next.is_whitespace());
        let abbreviation = ch == '.' && j == i + 1 && is_abbreviation(&text[start..idx]);
        if followed_by_space && !abbreviation && opens_sentence(&chars[j..]) {
            push_trimmed(&mut sentences, &text[start..end]);
            start = end;
        }
        i = j;
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn opens_sentence(rest: &[(usize, char)]) -> bool {
    match rest.iter().map(|&(_, ch)| ch).find(|ch| !ch.is_whitespace()) {
        None => true,
        Some(ch) => ch.is_uppercase() || ch.is_numeric() || OPENERS.contains(&ch),
    }
}

fn push_trimmed(sentences: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_sentences_detects_boundaries() {
        let sentences = split_sentences("One. Two! Three?");
        assert_eq!(sentences, vec!["One.", "Two!", "Three?"]);
    }

    #[test]
    fn abbreviations_and_initials_do_not_split() {
        let sentences = split_sentences(
            "Dr. Smith met J. R. Tolkien in the U.K. on Monday. They talked, e.g. about maps.",
        );
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].starts_with("Dr. Smith"));
        assert_eq!(sentences[1], "They talked, e.g. about maps.");
    }

    #[test]
    fn lowercase_continuation_is_not_a_boundary() {
        let sentences = split_sentences("It costs approx. three dollars. Cheap!");
        assert_eq!(sentences, vec!["It costs approx. three dollars.", "Cheap!"]);
    }

    #[test]
    fn closing_quotes_stay_with_their_sentence() {
        let sentences = split_sentences("He said \"stop.\" Then he left");
        assert_eq!(sentences, vec!["He said \"stop.\"", "Then he left"]);
    }

    #[test]
    fn decimals_are_not_boundaries() {
        let sentences = split_sentences("Pi is roughly 3.14 in value. Euler is 2.71.");
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn tokenize_separates_punctuation() {
        let tokens = tokenize("Cells, e.g. neurons, aren't simple.");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Cells", ",", "e.g", ".", "neurons", ",", "aren't", "simple", "."]
        );
        assert!(tokens[0].is_word());
        assert!(!tokens[1].is_word());
        assert_eq!(&"Cells, e.g."[tokens[2].start..tokens[2].end], "e.g");
    }

    #[test]
    fn word_count_uses_whitespace() {
        assert_eq!(word_count("The mitochondria is the powerhouse of the cell."), 8);
    }
}
