//! Text folding shared by every lexical match in the workspace.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold `s` for matching: NFKD, drop accents, lowercase, replace anything
/// that is not alphanumeric, `-` or `_` with a space, collapse whitespace.
///
/// `"¿Cuántos alumnos en el Ámbito Académico?"` becomes
/// `"cuantos alumnos en el ambito academico"`.
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Identifier form of a name: normalized, with spaces, `-` and `_` unified to `_`.
pub fn slug(s: &str) -> String {
    normalize(s)
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Whether `phrase` (already normalized) occurs in `haystack` (already
/// normalized) on word boundaries.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    format!(" {haystack} ").contains(&format!(" {phrase} "))
}
