// Filter pipeline: reduces the roster and publications to a consistent
// (contributing roster, selected publications) pair.
//
// Two modes:
// - focused on one author: that author's works (projection rows preferred),
//   deduplicated by work key, with the single roster row as the cohort
// - unfocused: categorical roster filters, publications kept when their
//   representative author survives, and the cohort recomputed as the
//   filtered members that still own at least one selected work
//
// Year bounds and the topic query apply in both modes.

pub mod search;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::records::models::{Publication, Researcher, YearBounds};
use crate::records::Dataset;
use search::{searchable_tokens, TopicQuery};

/// Immutable filter state for one recompute cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSnapshot {
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    /// Free-text topic query (AND across tokens)
    pub query: String,
    pub levels: Vec<String>,
    pub categories: Vec<String>,
    pub appointments: Vec<String>,
    pub groups: Vec<String>,
    /// Single-author focus (canonical author id)
    pub focus: Option<String>,
}

impl FilterSnapshot {
    /// Requested year range clamped into the supported bounds, swapped if inverted.
    pub fn year_range(&self, bounds: &YearBounds) -> (i32, i32) {
        let from = bounds.clamp(self.year_from.unwrap_or(bounds.min));
        let to = bounds.clamp(self.year_to.unwrap_or(bounds.max));
        if from > to {
            (to, from)
        } else {
            (from, to)
        }
    }

    /// The focus id, if one is set and non-blank.
    pub fn focus_id(&self) -> Option<&str> {
        self.focus
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Categorical roster filter: AND across dimensions, OR within one.
    pub fn roster_matches(&self, researcher: &Researcher) -> bool {
        selected(&self.levels, &researcher.level)
            && selected(&self.categories, &researcher.category)
            && selected(&self.appointments, &researcher.appointment)
            && (self.groups.is_empty()
                || researcher.groups.iter().any(|g| selected(&self.groups, g)))
    }
}

/// Empty selection means no constraint on the dimension.
fn selected(choices: &[String], value: &str) -> bool {
    choices.is_empty()
        || choices
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(value.trim()))
}

/// The output of the filter pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    /// Cohort members that contribute at least one selected publication
    pub roster: Vec<Researcher>,
    pub publications: Vec<Publication>,
    /// Effective inclusive year range
    pub year_range: (i32, i32),
    pub focus: Option<String>,
}

impl Selection {
    pub fn roster_ids(&self) -> HashSet<&str> {
        self.roster.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.roster
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.name.as_str())
            .unwrap_or(id)
    }
}

/// Cohort members (from `ids`) that appear on a publication by any signal:
/// authorship id, union id, or representative id. First-appearance order.
pub fn cohort_on<'a>(publication: &'a Publication, ids: &HashSet<&str>) -> Vec<&'a str> {
    let mut found: Vec<&'a str> = Vec::new();
    let candidates = publication
        .authorships
        .iter()
        .map(|a| a.author_id.as_str())
        .chain(publication.cohort_union_ids.iter().map(|s| s.as_str()))
        .chain(std::iter::once(publication.representative_author_id.as_str()));
    for id in candidates {
        if !id.is_empty() && ids.contains(id) && !found.contains(&id) {
            found.push(id);
        }
    }
    found
}

/// Run the filter pipeline over a dataset snapshot.
pub fn apply(dataset: &Dataset, snapshot: &FilterSnapshot) -> Selection {
    let year_range = snapshot.year_range(&dataset.bounds);
    let query = TopicQuery::parse(&snapshot.query);
    let names = dataset.names();

    let passes = |publication: &Publication| -> bool {
        let in_years = publication
            .year
            .is_some_and(|y| y >= year_range.0 && y <= year_range.1);
        in_years && (query.is_empty() || query.matches(&document_tokens(publication, &names)))
    };

    let selection = match snapshot.focus_id() {
        Some(focus) => {
            let from_projection: Vec<&Publication> = dataset
                .projection
                .iter()
                .flatten()
                .filter(|row| row.author_id == focus)
                .map(|row| &row.work)
                .collect();

            let candidates: Vec<&Publication> = if from_projection.is_empty() {
                debug!(focus, "No projection rows for focus, scanning dedup works");
                dataset
                    .works
                    .iter()
                    .filter(|w| w.mentions_author(focus))
                    .collect()
            } else {
                from_projection
            };

            let publications = dedup_by_work(candidates.into_iter().filter(|p| passes(p)));
            let roster = dataset.researcher(focus).cloned().into_iter().collect();

            Selection {
                roster,
                publications,
                year_range,
                focus: Some(focus.to_string()),
            }
        }
        None => {
            let filtered: Vec<&Researcher> = dataset
                .roster
                .iter()
                .filter(|r| snapshot.roster_matches(r))
                .collect();
            let filtered_ids: HashSet<&str> = filtered.iter().map(|r| r.id.as_str()).collect();

            let publications = dedup_by_work(dataset.works.iter().filter(|p| {
                filtered_ids.contains(p.representative_author_id.as_str()) && passes(p)
            }));

            let mut owners: HashSet<&str> = HashSet::new();
            for p in &publications {
                owners.insert(p.representative_author_id.as_str());
                owners.extend(p.cohort_union_ids.iter().map(|s| s.as_str()));
            }

            let roster = filtered
                .into_iter()
                .filter(|r| owners.contains(r.id.as_str()))
                .cloned()
                .collect();

            Selection {
                roster,
                publications,
                year_range,
                focus: None,
            }
        }
    };

    debug!(
        cohort = selection.roster.len(),
        publications = selection.publications.len(),
        from = year_range.0,
        to = year_range.1,
        "Filter pipeline complete"
    );
    selection
}

fn document_tokens(publication: &Publication, names: &HashMap<&str, &str>) -> HashSet<String> {
    let mut cohort_names: Vec<&str> = Vec::new();
    let ids = publication
        .authorships
        .iter()
        .map(|a| a.author_id.as_str())
        .chain(publication.cohort_union_ids.iter().map(|s| s.as_str()))
        .chain(std::iter::once(publication.representative_author_id.as_str()));
    for id in ids {
        if let Some(&name) = names.get(id) {
            if !cohort_names.contains(&name) {
                cohort_names.push(name);
            }
        }
    }
    searchable_tokens(publication, &cohort_names)
}

/// Keep the first publication per work key.
fn dedup_by_work<'a>(publications: impl Iterator<Item = &'a Publication>) -> Vec<Publication> {
    let mut seen = HashSet::new();
    publications
        .filter(|p| seen.insert(p.work_key()))
        .cloned()
        .collect()
}
