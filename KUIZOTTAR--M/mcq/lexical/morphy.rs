use std::collections::HashMap;

/// Suffix detachment rules for nouns, applied in order.
const NOUN_SUBSTITUTIONS: [(&str, &str); 9] = [
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

/// Base-form candidates for a lowercase noun lookup key.
///
/// An exception-list hit yields the form itself followed by its listed
/// bases. Otherwise the form is followed by every suffix detachment. The
/// caller keeps the candidates present in its index.
#[must_use]
pub fn noun_candidates(form: &str, exceptions: &HashMap<String, Vec<String>>) -> Vec<String> {
    let mut forms = vec![form.to_string()];
    if let Some(bases) = exceptions.get(form) {
        forms.extend(bases.iter().cloned());
    } else {
        for (suffix, replacement) in NOUN_SUBSTITUTIONS {
            if let Some(stem) = form.strip_suffix(suffix) {
                forms.push(format!("{stem}{replacement}"));
            }
        }
    }
    let mut unique = Vec::with_capacity(forms.len());
    for candidate in forms {
        if !candidate.is_empty() && !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detaches_regular_plurals() {
        let none = HashMap::new();
        assert_eq!(noun_candidates("cars", &none), vec!["cars", "car"]);
        assert!(noun_candidates("boxes", &none).contains(&"box".to_string()));
        assert!(noun_candidates("berries", &none).contains(&"berry".to_string()));
        assert!(noun_candidates("women", &none).contains(&"woman".to_string()));
    }

    #[test]
    fn exceptions_take_priority() {
        let mut exceptions = HashMap::new();
        exceptions.insert("mice".to_string(), vec!["mouse".to_string()]);
        assert_eq!(noun_candidates("mice", &exceptions), vec!["mice", "mouse"]);
    }
}
