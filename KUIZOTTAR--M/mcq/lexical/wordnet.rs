use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use super::{
    morphy::noun_candidates,
    ontology::{lookup_key, LexicalOntology, OntologyError, PartOfSpeech, Sense, SenseId},
};

const INDEX_FILE: &str = "index.noun";
const DATA_FILE: &str = "data.noun";
const EXCEPTION_FILE: &str = "noun.exc";

#[derive(Debug, Clone, Default)]
struct Synset {
    lemmas: Vec<String>,
    hypernyms: Vec<SenseId>,
    hyponyms: Vec<SenseId>,
}

/// Noun half of a Princeton WordNet 3.x database directory.
///
/// Reads `index.noun` and `data.noun`, plus `noun.exc` when present. Synsets
/// are keyed by the offset field of each data line; sense order follows the
/// index file.
#[derive(Debug, Clone, Default)]
pub struct WordNetOntology {
    root: PathBuf,
    index: HashMap<String, Vec<SenseId>>,
    synsets: HashMap<SenseId, Synset>,
    exceptions: HashMap<String, Vec<String>>,
}

impl WordNetOntology {
    /// Loads the noun database from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, OntologyError> {
        let root = dir.as_ref().to_path_buf();
        let index_path = root.join(INDEX_FILE);
        let data_path = root.join(DATA_FILE);
        let index = parse_index(&index_path, &read_required(&index_path)?)?;
        let synsets = parse_data(&data_path, &read_required(&data_path)?)?;
        let exc_path = root.join(EXCEPTION_FILE);
        let exceptions = match fs::read_to_string(&exc_path) {
            Ok(contents) => parse_exceptions(&contents),
            Err(err) if err.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(source) => {
                return Err(OntologyError::Io {
                    path: exc_path,
                    source,
                })
            }
        };
        Ok(Self {
            root,
            index,
            synsets,
            exceptions,
        })
    }

    /// Database directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of noun synsets loaded.
    #[must_use]
    pub fn synset_count(&self) -> usize {
        self.synsets.len()
    }
}

impl LexicalOntology for WordNetOntology {
    fn name(&self) -> &'static str {
        "wordnet"
    }

    fn senses(&self, word: &str) -> Vec<Sense> {
        let key = lookup_key(word);
        if key.is_empty() {
            return Vec::new();
        }
        let mut senses: Vec<Sense> = Vec::new();
        for form in noun_candidates(&key, &self.exceptions) {
            let Some(ids) = self.index.get(&form) else {
                continue;
            };
            for &id in ids {
                if !senses.iter().any(|sense| sense.id == id) {
                    senses.push(Sense {
                        id,
                        pos: PartOfSpeech::Noun,
                    });
                }
            }
        }
        senses
    }

    fn hypernyms(&self, sense: SenseId) -> &[SenseId] {
        self.synsets
            .get(&sense)
            .map_or(&[], |synset| synset.hypernyms.as_slice())
    }

    fn hyponyms(&self, sense: SenseId) -> &[SenseId] {
        self.synsets
            .get(&sense)
            .map_or(&[], |synset| synset.hyponyms.as_slice())
    }

    fn lemma_names(&self, sense: SenseId) -> &[String] {
        self.synsets
            .get(&sense)
            .map_or(&[], |synset| synset.lemmas.as_slice())
    }
}

fn read_required(path: &Path) -> Result<String, OntologyError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            OntologyError::MissingFile(path.to_path_buf())
        } else {
            OntologyError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// License header lines start with a space.
fn content_lines(contents: &str) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.starts_with(' ') && !line.trim().is_empty())
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> OntologyError {
    OntologyError::Malformed {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

fn parse_offset(path: &Path, line: usize, raw: &str) -> Result<SenseId, OntologyError> {
    raw.parse::<u64>()
        .map(SenseId)
        .map_err(|_| malformed(path, line, format!("bad synset offset `{raw}`")))
}

// lemma pos synset_cnt p_cnt [ptr_symbol...] sense_cnt tagsense_cnt offset...
fn parse_index(
    path: &Path,
    contents: &str,
) -> Result<HashMap<String, Vec<SenseId>>, OntologyError> {
    let mut index = HashMap::new();
    for (line_no, line) in content_lines(contents) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            return Err(malformed(path, line_no, "too few index fields"));
        }
        let synset_cnt: usize = fields[2]
            .parse()
            .map_err(|_| malformed(path, line_no, "bad synset count"))?;
        if synset_cnt == 0 || fields.len() < synset_cnt + 4 {
            return Err(malformed(path, line_no, "synset count exceeds fields"));
        }
        let offsets = fields[fields.len() - synset_cnt..]
            .iter()
            .map(|raw| parse_offset(path, line_no, raw))
            .collect::<Result<Vec<_>, _>>()?;
        index.insert(fields[0].to_lowercase(), offsets);
    }
    Ok(index)
}

// offset lex_filenum ss_type w_cnt (word lex_id)... p_cnt (symbol offset pos src_tgt)... | gloss
fn parse_data(path: &Path, contents: &str) -> Result<HashMap<SenseId, Synset>, OntologyError> {
    let mut synsets = HashMap::new();
    for (line_no, line) in content_lines(contents) {
        let body = line.split(" | ").next().unwrap_or(line);
        let fields: Vec<&str> = body.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(malformed(path, line_no, "too few data fields"));
        }
        let id = parse_offset(path, line_no, fields[0])?;
        let word_count = usize::from_str_radix(fields[3], 16)
            .map_err(|_| malformed(path, line_no, "bad word count"))?;
        let words_end = 4 + word_count * 2;
        if fields.len() <= words_end {
            return Err(malformed(path, line_no, "word list truncated"));
        }
        let lemmas = fields[4..words_end]
            .chunks(2)
            .map(|pair| pair[0].to_string())
            .collect();
        let pointer_count: usize = fields[words_end]
            .parse()
            .map_err(|_| malformed(path, line_no, "bad pointer count"))?;
        let pointers_start = words_end + 1;
        let pointers_end = pointers_start + pointer_count * 4;
        if fields.len() < pointers_end {
            return Err(malformed(path, line_no, "pointer list truncated"));
        }
        let mut synset = Synset {
            lemmas,
            ..Synset::default()
        };
        for pointer in fields[pointers_start..pointers_end].chunks(4) {
            if pointer[2] != "n" {
                continue;
            }
            match pointer[0] {
                "@" => synset.hypernyms.push(parse_offset(path, line_no, pointer[1])?),
                "~" => synset.hyponyms.push(parse_offset(path, line_no, pointer[1])?),
                _ => {}
            }
        }
        synsets.insert(id, synset);
    }
    Ok(synsets)
}

// inflected base [base...]
fn parse_exceptions(contents: &str) -> HashMap<String, Vec<String>> {
    contents
        .lines()
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            let inflected = words.next()?;
            let bases: Vec<String> = words.map(ToString::to_string).collect();
            (!bases.is_empty()).then(|| (inflected.to_lowercase(), bases))
        })
        .collect()
}
