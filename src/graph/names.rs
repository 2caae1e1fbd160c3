// Author-name canonicalization for the name-matching fallback.
//
// Reduces "Last, First", "First M. Last Jr." and particle surnames like
// "Ludwig van Beethoven" to one comparable key: "<first initial> <last>".

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::records::normalize::normalize_text;

const SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv"];

const PARTICLES: &[&str] = &[
    "van", "von", "de", "del", "della", "der", "den", "da", "di", "du", "la", "le", "dos", "das",
    "st",
];

/// Canonical "first-initial last-name" key for an author name.
///
/// Returns `None` when nothing usable is left after normalization.
pub fn name_key(raw: &str) -> Option<String> {
    let folded: String = raw
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !matches!(c, '\'' | '’' | '-'))
        .collect::<String>()
        .to_lowercase();

    let reordered = match folded.split_once(',') {
        Some((last, first)) if !first.trim().is_empty() => format!("{first} {last}"),
        _ => folded,
    };

    let normalized = normalize_text(&reordered);
    let tokens: Vec<&str> = normalized
        .split_whitespace()
        .filter(|t| !SUFFIXES.contains(t))
        .collect();

    match tokens.as_slice() {
        [] => None,
        [only] => Some((*only).to_string()),
        [first, rest @ ..] => {
            let initial = first.chars().next()?;
            // A particle before the final token starts the surname.
            let last = match rest[..rest.len() - 1]
                .iter()
                .position(|t| PARTICLES.contains(t))
            {
                Some(start) => rest[start..].concat(),
                None => rest[rest.len() - 1].to_string(),
            };
            Some(format!("{initial} {last}"))
        }
    }
}

/// Split a semicolon-delimited author string into trimmed names.
pub fn split_author_list(text: &str) -> Vec<&str> {
    text.split(';')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect()
}
