use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::{
    lexicon::{
        verb_base, ADJECTIVES, ADJECTIVE_SUFFIXES, ADVERBS, AUXILIARIES, CONJUNCTIONS,
        DETERMINERS, ING_NOUNS, LY_NOUNS, NOUN_VERBS, PREPOSITIONS, PRONOUNS, SUFFIX_NOUNS,
    },
    tokenize::{split_sentences, tokenize, Token},
};

/// Coarse part-of-speech classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    /// Common noun.
    Noun,
    /// Capitalized name inside a sentence.
    ProperNoun,
    /// Verb, auxiliary or modal.
    Verb,
    /// Adjective.
    Adjective,
    /// Adverb.
    Adverb,
    /// Article, demonstrative or quantifier.
    Determiner,
    /// Pronoun.
    Pronoun,
    /// Preposition.
    Preposition,
    /// Conjunction.
    Conjunction,
    /// Infinitive marker `to`.
    Particle,
    /// Number.
    Numeral,
    /// Punctuation mark or symbol.
    Punctuation,
}

impl PosTag {
    /// Common or proper noun.
    #[must_use]
    pub const fn is_noun(self) -> bool {
        matches!(self, Self::Noun | Self::ProperNoun)
    }

    /// Tags allowed inside a keyphrase candidate.
    #[must_use]
    pub const fn is_phrase_part(self) -> bool {
        matches!(self, Self::Noun | Self::ProperNoun | Self::Adjective)
    }
}

/// Token paired with its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    /// Underlying token.
    pub token: Token,
    /// Assigned tag.
    pub tag: PosTag,
}

const POSSESSIVES: [&str; 7] = ["my", "your", "his", "her", "its", "our", "their"];

/// Rule-based tagger: closed-class tables, a verb table with inflection
/// recognition, suffix rules, capitalization, and a noun default.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTagger;

impl HeuristicTagger {
    /// Creates the tagger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Tokenizes and tags a single sentence.
    #[must_use]
    pub fn tag_sentence(&self, sentence: &str) -> Vec<TaggedToken> {
        self.tag_tokens(tokenize(sentence))
    }

    /// Tags tokens that form one sentence.
    #[must_use]
    pub fn tag_tokens(&self, tokens: Vec<Token>) -> Vec<TaggedToken> {
        let mut tagged: Vec<TaggedToken> = Vec::with_capacity(tokens.len());
        for (index, token) in tokens.into_iter().enumerate() {
            let prev = tagged.last().map(|t| (t.tag, t.token.text.to_lowercase()));
            let tag = classify(
                &token,
                index,
                prev.as_ref().map(|(tag, word)| (*tag, word.as_str())),
            );
            tagged.push(TaggedToken { token, tag });
        }
        tagged
    }

    /// Unique noun tokens of a text in first-appearance order.
    #[must_use]
    pub fn nouns(&self, text: &str) -> IndexSet<String> {
        split_sentences(text)
            .iter()
            .flat_map(|sentence| self.tag_sentence(sentence))
            .filter(|tagged| tagged.tag.is_noun())
            .map(|tagged| tagged.token.text)
            .collect()
    }
}

fn classify(token: &Token, index: usize, prev: Option<(PosTag, &str)>) -> PosTag {
    if !token.is_word() {
        return PosTag::Punctuation;
    }
    let word = token.text.as_str();
    if word
        .chars()
        .all(|ch| ch.is_ascii_digit() || ch == '.' || ch == ',')
    {
        return PosTag::Numeral;
    }
    let lower = word.to_lowercase();
    let lower = lower.as_str();
    if lower == "to" {
        return PosTag::Particle;
    }
    if AUXILIARIES.contains(lower) {
        return PosTag::Verb;
    }
    if DETERMINERS.contains(lower) {
        return PosTag::Determiner;
    }
    if PRONOUNS.contains(lower) {
        return PosTag::Pronoun;
    }
    if PREPOSITIONS.contains(lower) {
        return PosTag::Preposition;
    }
    if CONJUNCTIONS.contains(lower) {
        return PosTag::Conjunction;
    }
    if ADVERBS.contains(lower) {
        return PosTag::Adverb;
    }
    if index > 0 && word.chars().next().is_some_and(char::is_uppercase) {
        return PosTag::ProperNoun;
    }
    if ADJECTIVES.contains(lower) {
        return PosTag::Adjective;
    }
    if ING_NOUNS.contains(lower) {
        return PosTag::Noun;
    }

    let prev_tag = prev.map(|(tag, _)| tag);
    let after_modifier = matches!(prev_tag, Some(PosTag::Determiner | PosTag::Adjective))
        || prev.is_some_and(|(_, word)| POSSESSIVES.contains(&word));

    if let Some(base) = verb_base(lower) {
        if NOUN_VERBS.contains(base) {
            let nominal = after_modifier
                || matches!(
                    prev_tag,
                    None | Some(PosTag::Preposition | PosTag::Numeral | PosTag::Punctuation)
                );
            return if nominal { PosTag::Noun } else { PosTag::Verb };
        }
        if after_modifier && lower.ends_with("ing") {
            return PosTag::Noun;
        }
        return PosTag::Verb;
    }

    let len = lower.chars().count();
    if len > 4 {
        if lower.ends_with("ly") && !LY_NOUNS.contains(lower) {
            return PosTag::Adverb;
        }
        if lower.ends_with("ing") {
            return if after_modifier { PosTag::Noun } else { PosTag::Verb };
        }
        if lower.ends_with("ed") {
            return if after_modifier { PosTag::Adjective } else { PosTag::Verb };
        }
        if !SUFFIX_NOUNS.contains(lower) && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            return PosTag::Adjective;
        }
    }
    PosTag::Noun
}
