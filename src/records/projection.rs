// Per-author projection: one row per (work, cohort author) pair.
//
// Derived from the dedup-by-work rows when no projection file is shipped
// with the dataset. Ownership comes from the union-of-cohort-ids field,
// falling back to the representative author, then to roster members found
// in the raw authorship id list.

use std::collections::{HashMap, HashSet};

use super::models::{ProjectedWork, Publication, Researcher};

/// Expand dedup rows into per-author rows.
pub fn project(works: &[Publication], roster: &[Researcher]) -> Vec<ProjectedWork> {
    let names: HashMap<&str, &str> = roster
        .iter()
        .map(|r| (r.id.as_str(), r.name.as_str()))
        .collect();

    let mut rows = Vec::new();
    for work in works {
        let mut owners: Vec<&str> = work.owner_ids();
        if owners.is_empty() {
            owners = work
                .authorships
                .iter()
                .map(|a| a.author_id.as_str())
                .filter(|id| names.contains_key(id))
                .collect();
        }

        let mut seen = HashSet::new();
        for author_id in owners {
            if author_id.is_empty() || !seen.insert(author_id) {
                continue;
            }
            let author_name = names
                .get(author_id)
                .map(|n| n.to_string())
                .unwrap_or_else(|| work.representative_author_name.clone());
            rows.push(ProjectedWork {
                author_id: author_id.to_string(),
                author_name,
                representative_owner: author_id == work.representative_author_id,
                work: work.clone(),
            });
        }
    }
    rows
}
