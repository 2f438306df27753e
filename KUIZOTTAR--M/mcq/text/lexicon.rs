//! English word tables backing the heuristic tagger and candidate filtering.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

fn table(words: &'static [&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

/// English stopwords; a keyphrase containing any of them is discarded.
pub static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "a", "about", "above", "after", "again", "against", "all", "almost", "also", "although",
        "always", "am", "among", "an", "and", "another", "any", "are", "as", "at", "be",
        "became", "because", "become", "been", "before", "being", "below", "between", "both",
        "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "done", "down",
        "during", "each", "either", "else", "enough", "etc", "even", "ever", "every", "few",
        "first", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
        "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into",
        "is", "it", "its", "itself", "just", "last", "least", "less", "like", "many", "may",
        "me", "might", "more", "most", "much", "must", "my", "myself", "neither", "never",
        "next", "no", "nor", "not", "now", "of", "off", "often", "on", "once", "one", "only",
        "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
        "per", "perhaps", "quite", "rather", "same", "second", "several", "shall", "she",
        "should", "since", "so", "some", "such", "than", "that", "the", "their", "theirs",
        "them", "themselves", "then", "there", "these", "they", "third", "this", "those",
        "though", "through", "thus", "to", "too", "toward", "towards", "two", "under", "until",
        "up", "upon", "us", "usually", "various", "very", "via", "was", "we", "well", "were",
        "what", "when", "where", "whether", "which", "while", "who", "whom", "whose", "why",
        "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
        "yourself", "yourselves",
    ])
});

/// Articles, demonstratives and quantifiers.
pub static DETERMINERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any",
        "no", "all", "both", "either", "neither", "another", "such", "many", "much", "few",
        "several", "most", "more", "less", "least", "other", "whatever", "whichever",
    ])
});

/// Personal, possessive, reflexive and relative pronouns.
pub static PRONOUNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "yourselves",
        "he", "him", "his", "himself", "she", "her", "hers", "herself", "it", "its", "itself",
        "we", "us", "our", "ours", "ourselves", "they", "them", "their", "theirs",
        "themselves", "who", "whom", "whose", "which", "what", "one", "someone", "something",
        "anyone", "anything", "everyone", "everything", "nobody", "nothing", "somebody",
        "everybody", "anybody",
    ])
});

/// Prepositions and subordinating particles.
pub static PREPOSITIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "about", "above", "across", "after", "against", "along", "amid", "among", "around",
        "as", "at", "before", "behind", "below", "beneath", "beside", "besides", "between",
        "beyond", "by", "despite", "down", "during", "except", "for", "from", "in", "inside",
        "into", "like", "near", "of", "off", "on", "onto", "out", "outside", "over", "past",
        "per", "since", "than", "through", "throughout", "toward", "towards", "under",
        "underneath", "unlike", "until", "up", "upon", "via", "with", "within", "without",
    ])
});

/// Coordinating and subordinating conjunctions.
pub static CONJUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "and", "or", "but", "nor", "yet", "so", "because", "although", "though", "while",
        "whereas", "if", "unless", "whether", "when", "whenever", "where", "wherever", "once",
        "that",
    ])
});

/// Forms of `be`, `have`, `do` and the modal verbs.
pub static AUXILIARIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "am", "is", "are", "was", "were", "be", "been", "being", "has", "have", "had",
        "having", "do", "does", "did", "doing", "done", "can", "could", "will", "would",
        "shall", "should", "may", "might", "must", "isn't", "aren't", "wasn't", "weren't",
        "hasn't", "haven't", "hadn't", "doesn't", "don't", "didn't", "can't", "couldn't",
        "won't", "wouldn't", "shouldn't", "mustn't",
    ])
});

/// Adverbs that do not end in `-ly`.
pub static ADVERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "also", "always", "almost", "already", "again", "ever", "never", "not", "now", "often",
        "only", "quite", "rather", "then", "there", "here", "thus", "too", "very", "well",
        "still", "soon", "just", "even", "instead", "however", "therefore", "hence", "perhaps",
        "sometimes", "together", "yet", "later", "ago", "away", "back", "forth", "how", "why",
        "n't",
    ])
});

/// Frequent adjectives the suffix rules miss.
pub static ADJECTIVES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "big", "small", "large", "little", "long", "short", "high", "low", "new", "old",
        "young", "good", "bad", "great", "important", "main", "major", "minor", "same",
        "different", "early", "late", "common", "whole", "full", "free", "true", "false",
        "hot", "cold", "warm", "dark", "light", "strong", "weak", "hard", "soft", "simple",
        "complex", "certain", "clear", "close", "deep", "easy", "entire", "huge", "known",
        "own", "possible", "real", "recent", "similar", "single", "various", "wide", "best",
        "better", "larger", "largest", "smaller", "smallest", "higher", "highest", "lower",
        "lowest", "greater", "greatest", "modern", "ancient", "primary", "secondary", "key",
        "able", "first", "second", "third", "last", "next", "human", "specific", "holy",
        "ugly", "friendly", "lonely", "likely", "daily", "weekly", "monthly", "yearly",
        "elderly", "lovely", "costly", "deadly", "silly", "only",
    ])
});

/// Base forms of common verbs.
pub static VERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "accept", "achieve", "act", "add", "affect", "allow", "appear", "apply", "argue",
        "arrive", "ask", "become", "begin", "believe", "belong", "break", "bring", "build",
        "buy", "call", "carry", "cause", "change", "choose", "claim", "come", "compare",
        "consider", "consist", "contain", "continue", "control", "convert", "create", "cut",
        "decide", "define", "deliver", "depend", "describe", "design", "destroy", "determine",
        "develop", "die", "discover", "divide", "drive", "eat", "enable", "encourage", "end",
        "enjoy", "ensure", "enter", "establish", "exist", "expect", "explain", "express",
        "fall", "feel", "find", "follow", "form", "found", "generate", "get", "give", "go",
        "grow", "happen", "hear", "help", "hold", "identify", "improve", "include",
        "increase", "indicate", "influence", "introduce", "involve", "join", "keep", "kill",
        "know", "lead", "learn", "leave", "let", "lie", "live", "look", "lose", "love",
        "maintain", "make", "mean", "meet", "move", "need", "obtain", "occur", "offer", "open",
        "operate", "own", "pass", "pay", "perform", "place", "play", "produce", "protect",
        "provide", "publish", "pull", "push", "put", "reach", "read", "receive", "reduce",
        "refer", "regard", "release", "remain", "remember", "remove", "replace", "represent",
        "require", "result", "return", "reveal", "rise", "run", "say", "see", "seem", "sell",
        "send", "serve", "set", "show", "sit", "speak", "spend", "stand", "start", "stay",
        "stop", "store", "study", "suggest", "supply", "support", "take", "talk", "teach",
        "tell", "tend", "think", "transfer", "transform", "transport", "try", "turn",
        "understand", "use", "vary", "walk", "want", "watch", "win", "work", "write",
    ])
});

/// Verbs that are at least as often nouns; resolved from context.
pub static NOUN_VERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "act", "call", "cause", "change", "control", "design", "end", "fall", "form", "found",
        "help", "increase", "influence", "lead", "lie", "look", "love", "need", "offer",
        "place", "play", "release", "result", "return", "rise", "run", "set", "show", "start",
        "stay", "stop", "store", "study", "supply", "support", "talk", "transfer", "transport",
        "turn", "use", "walk", "watch", "work",
    ])
});

/// Irregular inflections mapped to their base verb.
pub static IRREGULAR_VERBS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("became", "become"), ("began", "begin"), ("begun", "begin"), ("broke", "break"),
        ("broken", "break"), ("brought", "bring"), ("built", "build"), ("bought", "buy"),
        ("came", "come"), ("chose", "choose"), ("chosen", "choose"), ("died", "die"),
        ("drove", "drive"), ("driven", "drive"), ("ate", "eat"), ("eaten", "eat"),
        ("fell", "fall"), ("fallen", "fall"), ("felt", "feel"), ("found", "find"),
        ("got", "get"), ("gotten", "get"), ("gave", "give"), ("given", "give"),
        ("went", "go"), ("gone", "go"), ("grew", "grow"), ("grown", "grow"),
        ("heard", "hear"), ("held", "hold"), ("kept", "keep"), ("knew", "know"),
        ("known", "know"), ("led", "lead"), ("left", "leave"), ("lay", "lie"),
        ("lain", "lie"), ("lost", "lose"), ("made", "make"), ("meant", "mean"),
        ("met", "meet"), ("paid", "pay"), ("rose", "rise"), ("risen", "rise"),
        ("ran", "run"), ("said", "say"), ("saw", "see"), ("seen", "see"), ("sold", "sell"),
        ("sent", "send"), ("sat", "sit"), ("spoke", "speak"), ("spoken", "speak"),
        ("spent", "spend"), ("stood", "stand"), ("took", "take"), ("taken", "take"),
        ("taught", "teach"), ("told", "tell"), ("thought", "think"),
        ("understood", "understand"), ("won", "win"), ("wrote", "write"),
        ("written", "write"),
    ]
    .into_iter()
    .collect()
});

/// `-ly` words that are not adverbs.
pub static LY_NOUNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "family", "supply", "july", "fly", "butterfly", "assembly",
        "anomaly", "monopoly", "ally", "rally", "belly", "jelly", "bully", "lily", "reply",
        "italy", "emily", "sicily",
    ])
});

/// `-ing` words that are nouns regardless of context.
pub static ING_NOUNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "thing", "king", "ring", "string", "spring", "wing", "sing", "ceiling", "building",
        "meeting", "morning", "evening", "painting", "clothing", "feeling", "meaning",
        "beginning", "ending", "offspring", "pudding", "viking", "beijing", "nothing",
        "something", "anything", "everything", "during",
    ])
});

/// Adjective-looking suffix words that are nouns.
pub static SUFFIX_NOUNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "animal", "signal", "capital", "festival", "material", "hospital", "journal", "total",
        "metal", "crystal", "canal", "rival", "arrival", "approval", "proposal", "survival",
        "removal", "renewal", "individual", "principal", "criminal", "terminal", "interval",
        "chemical", "mineral", "general", "official", "potential", "professional", "original",
        "music", "logic", "topic", "republic", "clinic", "panic", "traffic", "graphic",
        "mechanic", "arithmetic", "rhetoric", "fabric", "public", "basic", "epic", "relic",
        "comic", "tonic", "critic", "magic", "objective", "detective", "executive",
        "representative", "relative", "native", "alternative", "motive", "initiative",
        "archive", "olive", "incentive", "adhesive", "explosive", "table", "cable", "variable",
        "bible", "vegetable", "constable", "fable", "stable", "label", "library", "dictionary",
        "summary", "boundary", "anniversary", "vocabulary", "glossary", "commentary",
        "documentary", "secretary", "missionary", "sanctuary", "estuary", "salary", "diary",
        "january", "february", "radish", "parish", "relish", "finish", "polish", "handful",
    ])
});

/// Suffixes that mark adjectives.
pub const ADJECTIVE_SUFFIXES: [&str; 11] = [
    "ous", "ful", "ive", "able", "ible", "less", "ical", "ish", "ary", "al", "ic",
];

/// Words that end a period-terminated abbreviation rather than a sentence.
static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    table(&[
        "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "vs", "e.g", "i.e", "cf",
        "al", "inc", "ltd", "co", "corp", "no", "fig", "figs", "approx", "ca", "gen", "col",
        "lt", "sgt", "capt", "rev", "hon", "est", "dept", "univ", "vol", "pp", "ed", "eds",
        "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
    ])
});

/// True when the last word of `prefix` is an abbreviation or an initial.
#[must_use]
pub fn is_abbreviation(prefix: &str) -> bool {
    let Some(last) = prefix.split_whitespace().last() else {
        return false;
    };
    let word = last.trim_start_matches(|ch: char| !ch.is_alphanumeric());
    if word.is_empty() {
        return false;
    }
    let lower = word.to_lowercase();
    if ABBREVIATIONS.contains(lower.as_str()) {
        return true;
    }
    let mut chars = word.chars();
    let single_initial =
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic());
    // Dotted forms such as `U.S` or `Ph.D`.
    let dotted = word.contains('.')
        && word.split('.').all(|part| {
            !part.is_empty() && part.len() <= 2 && part.chars().all(char::is_alphabetic)
        });
    single_initial || dotted
}

/// True for stopwords, matched case-insensitively.
#[must_use]
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word.to_lowercase().as_str())
}

/// Strips common English plural endings from a lowercase word.
#[must_use]
pub fn light_stem(word: &str) -> String {
    let len = word.chars().count();
    if len <= 3 {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if len > 4 {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("es") {
        if ["s", "x", "z", "ch", "sh"].iter().any(|end| stem.ends_with(end)) {
            return stem.to_string();
        }
    }
    word.strip_suffix('s')
        .map_or_else(|| word.to_string(), ToString::to_string)
}

/// Returns the base verb for an inflected form found in the verb tables.
#[must_use]
pub fn verb_base(lower: &str) -> Option<&'static str> {
    if let Some(base) = VERBS.get(lower) {
        return Some(*base);
    }
    if let Some(base) = IRREGULAR_VERBS.get(lower) {
        return Some(*base);
    }
    let mut candidates: Vec<String> = Vec::new();
    for (suffix, replacements) in [
        ("ies", &["y"][..]),
        ("ied", &["y"][..]),
        ("es", &["", "e"][..]),
        ("s", &[""][..]),
        ("ed", &["", "e"][..]),
        ("d", &[""][..]),
        ("ing", &["", "e"][..]),
    ] {
        if let Some(stem) = lower.strip_suffix(suffix) {
            if stem.len() < 2 {
                continue;
            }
            for replacement in replacements {
                candidates.push(format!("{stem}{replacement}"));
            }
            // Doubled final consonant: `stopped`, `running`.
            let bytes = stem.as_bytes();
            if (suffix == "ed" || suffix == "ing")
                && bytes.len() >= 3
                && bytes[bytes.len() - 1] == bytes[bytes.len() - 2]
            {
                candidates.push(stem[..stem.len() - 1].to_string());
            }
        }
    }
    candidates
        .iter()
        .find_map(|candidate| VERBS.get(candidate.as_str()).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviations_are_recognised() {
        assert!(is_abbreviation("Ask Dr"));
        assert!(is_abbreviation("met J"));
        assert!(is_abbreviation("in the U.S"));
        assert!(is_abbreviation("(e.g"));
        assert!(!is_abbreviation("the cell"));
        assert!(!is_abbreviation(""));
    }

    #[test]
    fn light_stem_merges_plurals() {
        assert_eq!(light_stem("cells"), "cell");
        assert_eq!(light_stem("cell"), "cell");
        assert_eq!(light_stem("bodies"), "body");
        assert_eq!(light_stem("boxes"), "box");
        assert_eq!(light_stem("processes"), "process");
        assert_eq!(light_stem("virus"), "virus");
        assert_eq!(light_stem("analysis"), "analysis");
        assert_eq!(light_stem("gas"), "gas");
    }

    #[test]
    fn verb_base_handles_inflections() {
        assert_eq!(verb_base("contains"), Some("contain"));
        assert_eq!(verb_base("performed"), Some("perform"));
        assert_eq!(verb_base("stopped"), Some("stop"));
        assert_eq!(verb_base("running"), Some("run"));
        assert_eq!(verb_base("studies"), Some("study"));
        assert_eq!(verb_base("produced"), Some("produce"));
        assert_eq!(verb_base("made"), Some("make"));
        assert_eq!(verb_base("organelles"), None);
    }
}
