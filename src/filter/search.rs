// Topic query matching: normalized, lightly stemmed, exact-token AND search.
//
// Both the query and the searchable text go through the same pipeline:
// diacritics stripped, lowercased, punctuation collapsed, then a light
// plural/suffix stemmer on tokens longer than three characters. A query
// token matches only a document token that is exactly equal after stemming.

use std::collections::HashSet;

use crate::records::models::Publication;
use crate::records::normalize::normalize_text;

/// Tokens at or below this length are never stemmed.
const MIN_STEM_LEN: usize = 3;

/// Split text into normalized, stemmed tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_text(text)
        .split_whitespace()
        .map(stem)
        .collect()
}

/// Light suffix stemmer.
///
/// Plurals first (`-sses` → `-ss`, `-ies` → `-y`, trailing `-s`), then
/// `-ing` / `-ed` with doubled-consonant repair (`running` → `run`).
pub fn stem(token: &str) -> String {
    if token.chars().count() <= MIN_STEM_LEN {
        return token.to_string();
    }

    let mut t = token.to_string();
    if t.ends_with("sses") {
        t.truncate(t.len() - 2);
    } else if t.ends_with("ies") {
        t.truncate(t.len() - 3);
        t.push('y');
    } else if t.ends_with('s') && !t.ends_with("ss") {
        t.pop();
    }

    if t.ends_with("ing") && t.len() >= 6 {
        t.truncate(t.len() - 3);
        repair_double_consonant(&mut t);
    } else if t.ends_with("ed") && t.len() >= 5 {
        t.truncate(t.len() - 2);
        repair_double_consonant(&mut t);
    }
    t
}

fn repair_double_consonant(t: &mut String) {
    let mut tail = t.chars().rev();
    if let (Some(last), Some(prev)) = (tail.next(), tail.next()) {
        if last == prev && last.is_ascii_alphabetic() && !"aeiouylsz".contains(last) {
            t.pop();
        }
    }
}

/// A parsed free-text topic query.
#[derive(Debug, Clone, Default)]
pub struct TopicQuery {
    tokens: Vec<String>,
}

impl TopicQuery {
    pub fn parse(query: &str) -> Self {
        let mut tokens: Vec<String> = Vec::new();
        for token in tokenize(query) {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Every query token must appear among the document tokens.
    pub fn matches(&self, document: &HashSet<String>) -> bool {
        self.tokens.iter().all(|t| document.contains(t))
    }
}

/// Build the searchable token set of a publication.
///
/// Covers the title, topic names, concepts, and the names of cohort authors
/// that appear on the work (passed in by the caller, who owns the roster).
pub fn searchable_tokens(publication: &Publication, cohort_names: &[&str]) -> HashSet<String> {
    let mut parts: Vec<&str> = vec![
        publication.title.as_str(),
        publication.primary_topic.as_str(),
        publication.topic_subfield.as_str(),
        publication.topic_field.as_str(),
    ];
    parts.extend(publication.concepts.iter().map(|c| c.as_str()));
    parts.extend(cohort_names.iter().copied());

    parts.into_iter().flat_map(tokenize).collect()
}
