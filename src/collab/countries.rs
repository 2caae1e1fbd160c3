// International collaboration classifier.
//
// A publication credits a foreign country when a cohort author's position
// makes the collaboration theirs:
// - first/last cohort author + any international authorship → every
//   international country on the work
// - middle cohort author + an international first/last authorship → the
//   countries of those first/last authorships
//
// Each country is credited at most once per publication.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use super::{cohort_authorships, is_cohort, majority};
use crate::filter::Selection;
use crate::records::models::{AuthorPosition, Publication};

/// Which crediting rule fired for a triggering author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CreditRule {
    /// Cohort author is first or last
    FirstOrLast,
    /// Cohort author is in the middle, foreign author is first or last
    Middle,
}

impl CreditRule {
    pub fn label(&self) -> &'static str {
        match self {
            CreditRule::FirstOrLast => "first/last",
            CreditRule::Middle => "middle",
        }
    }
}

/// Per-country publication counts over one selection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CountryLinkSeries {
    pub home_country: String,
    /// True when the home country came from the cohort, false for the fallback
    pub home_inferred: bool,
    /// Credited country codes, sorted
    pub countries: Vec<String>,
    /// Aligned with `countries`
    pub counts: Vec<usize>,
    pub total: usize,
}

impl CountryLinkSeries {
    pub fn count_for(&self, code: &str) -> usize {
        let code = code.trim().to_uppercase();
        self.countries
            .iter()
            .position(|c| *c == code)
            .map(|i| self.counts[i])
            .unwrap_or(0)
    }

    /// (code, count) ordered by count desc, then code asc.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut rows: Vec<(&str, usize)> = self
            .countries
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }
}

/// A cohort author whose position satisfied a crediting rule.
#[derive(Debug, Clone, Serialize)]
pub struct TriggeringAuthor {
    pub id: String,
    pub name: String,
    pub position: AuthorPosition,
    pub rule: CreditRule,
}

/// One publication in a country drill-down.
#[derive(Debug, Clone, Serialize)]
pub struct CreditedPublication {
    pub publication: Publication,
    pub authors: Vec<TriggeringAuthor>,
}

/// Infer the cohort's home country by majority over cohort authorships.
///
/// Returns the country and whether it was inferred (false means `fallback`).
pub fn infer_home_country(selection: &Selection, fallback: &str) -> (String, bool) {
    let roster_ids = selection.roster_ids();
    let tally = selection
        .publications
        .iter()
        .flat_map(|p| cohort_authorships(p, &roster_ids))
        .filter_map(|a| a.affiliation_country());

    match majority(tally) {
        Some((country, votes)) => {
            debug!(country = %country, votes, "Inferred home country");
            (country, true)
        }
        None => (fallback.trim().to_uppercase(), false),
    }
}

/// International authorships on a publication: (country, position).
fn international<'a>(
    publication: &'a Publication,
    home: &'a str,
) -> impl Iterator<Item = (String, AuthorPosition)> + 'a {
    publication.authorships.iter().filter_map(move |a| {
        a.affiliation_country()
            .filter(|c| c != home)
            .map(|c| (c, a.position))
    })
}

/// Countries credited by one publication.
pub fn credited_countries(
    publication: &Publication,
    roster_ids: &HashSet<&str>,
    home: &str,
) -> BTreeSet<String> {
    let cohort = cohort_authorships(publication, roster_ids);
    let cohort_fl = cohort.iter().any(|a| a.position.is_first_or_last());
    let cohort_mid = cohort.iter().any(|a| a.position.is_middle());

    let mut credited = BTreeSet::new();
    for (country, position) in international(publication, home) {
        if cohort_fl || (cohort_mid && position.is_first_or_last()) {
            credited.insert(country);
        }
    }
    credited
}

/// Classify every selected publication and aggregate the country series.
pub fn classify(selection: &Selection, fallback: &str) -> CountryLinkSeries {
    let (home_country, home_inferred) = infer_home_country(selection, fallback);
    let roster_ids = selection.roster_ids();

    let mut tally: BTreeMap<String, usize> = BTreeMap::new();
    for publication in &selection.publications {
        for country in credited_countries(publication, &roster_ids, &home_country) {
            *tally.entry(country).or_insert(0) += 1;
        }
    }

    let total = tally.values().sum();
    let (countries, counts): (Vec<String>, Vec<usize>) = tally.into_iter().unzip();

    info!(
        home = %home_country,
        countries = countries.len(),
        total,
        "Classified international collaborations"
    );

    CountryLinkSeries {
        home_country,
        home_inferred,
        countries,
        counts,
        total,
    }
}

/// Publications crediting `code`, with the cohort authors that triggered it.
pub fn drill_down(selection: &Selection, home: &str, code: &str) -> Vec<CreditedPublication> {
    let code = code.trim().to_uppercase();
    if code.is_empty() || code == home {
        return Vec::new();
    }
    let roster_ids = selection.roster_ids();

    let mut out = Vec::new();
    for publication in &selection.publications {
        let mut any = false;
        let mut fl_match = false;
        for (country, position) in international(publication, home) {
            if country == code {
                any = true;
                fl_match |= position.is_first_or_last();
            }
        }
        if !any {
            continue;
        }

        let mut authors: Vec<TriggeringAuthor> = Vec::new();
        for a in publication
            .authorships
            .iter()
            .filter(|a| is_cohort(a, &roster_ids))
        {
            let rule = if a.position.is_first_or_last() {
                CreditRule::FirstOrLast
            } else if a.position.is_middle() && fl_match {
                CreditRule::Middle
            } else {
                continue;
            };
            if authors.iter().any(|t| t.id == a.author_id) {
                continue;
            }
            authors.push(TriggeringAuthor {
                id: a.author_id.clone(),
                name: selection.name_of(&a.author_id).to_string(),
                position: a.position,
                rule,
            });
        }

        if !authors.is_empty() {
            out.push(CreditedPublication {
                publication: publication.clone(),
                authors,
            });
        }
    }
    out
}
