// Partner-institution aggregator.
//
// Position-independent: every cohort authorship credits the first-listed
// institution of every other authorship on the work, minus its own
// institution and the cohort's home institution. Credits are unioned per
// publication so one work counts a partner once.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use super::{cohort_authorships, majority};
use crate::filter::Selection;
use crate::records::models::{Institution, Publication};

#[derive(Debug, Clone, Serialize)]
pub struct PartnerInstitution {
    pub id: String,
    pub name: String,
    pub country: String,
    /// Publications crediting this partner
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PartnerInstitutionRanking {
    pub home_institution: Option<String>,
    /// Count desc, then id asc
    pub partners: Vec<PartnerInstitution>,
}

impl PartnerInstitutionRanking {
    pub fn partner(&self, id: &str) -> Option<&PartnerInstitution> {
        let id = id.trim();
        self.partners.iter().find(|p| p.id == id)
    }

    pub fn top(&self, n: usize) -> &[PartnerInstitution] {
        &self.partners[..n.min(self.partners.len())]
    }
}

/// Majority vote over cohort authorships' first-listed institution id.
pub fn infer_home_institution(selection: &Selection) -> Option<String> {
    let roster_ids = selection.roster_ids();
    let votes = selection
        .publications
        .iter()
        .flat_map(|p| cohort_authorships(p, &roster_ids))
        .map(|a| a.institution.id.trim().to_string())
        .filter(|id| !id.is_empty());

    majority(votes).map(|(id, count)| {
        debug!(institution = %id, votes = count, "Inferred home institution");
        id
    })
}

/// Partner institutions credited by one publication, with their metadata.
pub fn partners_on<'a>(
    publication: &'a Publication,
    roster_ids: &HashSet<&str>,
    home: Option<&str>,
) -> Vec<&'a Institution> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut out: Vec<&'a Institution> = Vec::new();

    for cohort in cohort_authorships(publication, roster_ids) {
        let own = cohort.institution.id.trim();
        for other in &publication.authorships {
            if std::ptr::eq(other, cohort) {
                continue;
            }
            let id = other.institution.id.trim();
            if id.is_empty() || id == own || Some(id) == home {
                continue;
            }
            if seen.insert(id) {
                out.push(&other.institution);
            }
        }
    }
    out
}

/// Rank partner institutions across the selection.
pub fn rank(selection: &Selection) -> PartnerInstitutionRanking {
    let home_institution = infer_home_institution(selection);
    let home = home_institution.as_deref();
    let roster_ids = selection.roster_ids();

    let mut order: Vec<String> = Vec::new();
    let mut partners: HashMap<String, PartnerInstitution> = HashMap::new();

    for publication in &selection.publications {
        for institution in partners_on(publication, &roster_ids, home) {
            let id = institution.id.trim();
            let entry = partners.entry(id.to_string()).or_insert_with(|| {
                order.push(id.to_string());
                PartnerInstitution {
                    id: id.to_string(),
                    name: String::new(),
                    country: String::new(),
                    count: 0,
                }
            });
            entry.count += 1;
            if entry.name.is_empty() {
                entry.name = institution.name.trim().to_string();
            }
            if entry.country.is_empty() {
                entry.country = institution.country.trim().to_uppercase();
            }
        }
    }

    let mut ranked: Vec<PartnerInstitution> = order
        .into_iter()
        .filter_map(|id| partners.remove(&id))
        .filter(|p| Some(p.id.as_str()) != home)
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));

    info!(
        home = home.unwrap_or("-"),
        partners = ranked.len(),
        "Ranked partner institutions"
    );

    PartnerInstitutionRanking {
        home_institution,
        partners: ranked,
    }
}

/// Publications that credited the partner `id`.
pub fn drill_down(
    selection: &Selection,
    ranking: &PartnerInstitutionRanking,
    id: &str,
) -> Vec<Publication> {
    let id = id.trim();
    let home = ranking.home_institution.as_deref();
    if id.is_empty() || Some(id) == home {
        return Vec::new();
    }
    let roster_ids = selection.roster_ids();

    selection
        .publications
        .iter()
        .filter(|p| {
            partners_on(p, &roster_ids, home)
                .iter()
                .any(|inst| inst.id.trim() == id)
        })
        .cloned()
        .collect()
}
