// Collaboration aggregates: foreign countries and partner institutions.
//
// Both aggregators start the same way: infer the cohort's "home" value by
// majority vote over cohort authorships, then credit what lies outside it
// once per publication.

pub mod countries;
pub mod institutions;

use std::collections::{HashMap, HashSet};

use crate::records::models::{Authorship, Publication};

/// Majority vote with ties broken by first-seen order.
///
/// Returns the winning value and its tally, or `None` when nothing was seen.
pub fn majority<I>(values: I) -> Option<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let mut best: Option<(String, usize)> = None;
    for value in order {
        let count = counts.get(&value).copied().unwrap_or(0);
        // Strictly greater keeps the earliest value on ties.
        let better = match &best {
            None => true,
            Some((_, c)) => count > *c,
        };
        if better {
            best = Some((value, count));
        }
    }
    best
}

/// Authorships on a publication that belong to the contributing roster.
pub fn cohort_authorships<'a>(
    publication: &'a Publication,
    roster_ids: &HashSet<&str>,
) -> Vec<&'a Authorship> {
    publication
        .authorships
        .iter()
        .filter(|a| is_cohort(a, roster_ids))
        .collect()
}

pub fn is_cohort(authorship: &Authorship, roster_ids: &HashSet<&str>) -> bool {
    !authorship.author_id.is_empty() && roster_ids.contains(authorship.author_id.as_str())
}
