// Merge-aware deduplication of compiled per-author rows into dedup-by-work form.
//
// The compiled input has one row per (author, work) fetch, so a work shared
// by several cohort members shows up several times with differently complete
// authorship payloads. We keep the richest row per work key, fill each
// authorship column from whichever sibling row carries it best, and carry
// the union of the representative ids that owned it.

use std::collections::HashMap;

use tracing::debug;

use super::models::{AuthorPosition, Authorship, Publication};

/// One aligned authorship array, merged independently of the others.
#[derive(Debug, Clone, Copy)]
enum Column {
    AuthorId,
    AuthorName,
    Position,
    Country,
    InstitutionId,
    InstitutionName,
    InstitutionCountry,
    Corresponding,
}

impl Column {
    const ALL: [Column; 8] = [
        Column::AuthorId,
        Column::AuthorName,
        Column::Position,
        Column::Country,
        Column::InstitutionId,
        Column::InstitutionName,
        Column::InstitutionCountry,
        Column::Corresponding,
    ];

    /// Text length of the value, 0 when absent.
    fn len(self, a: &Authorship) -> usize {
        match self {
            Column::AuthorId => a.author_id.trim().len(),
            Column::AuthorName => a.author_name.trim().len(),
            Column::Position => match a.position {
                AuthorPosition::Unknown => 0,
                p => p.as_str().len(),
            },
            Column::Country => a.country.trim().len(),
            Column::InstitutionId => a.institution.id.trim().len(),
            Column::InstitutionName => a.institution.name.trim().len(),
            Column::InstitutionCountry => a.institution.country.trim().len(),
            Column::Corresponding => usize::from(a.is_corresponding),
        }
    }

    fn copy(self, from: &Authorship, to: &mut Authorship) {
        match self {
            Column::AuthorId => to.author_id = from.author_id.clone(),
            Column::AuthorName => to.author_name = from.author_name.clone(),
            Column::Position => to.position = from.position,
            Column::Country => to.country = from.country.clone(),
            Column::InstitutionId => to.institution.id = from.institution.id.clone(),
            Column::InstitutionName => to.institution.name = from.institution.name.clone(),
            Column::InstitutionCountry => {
                to.institution.country = from.institution.country.clone()
            }
            Column::Corresponding => to.is_corresponding = from.is_corresponding,
        }
    }

    /// (non-empty entries, total text length) of this column on a row.
    fn weight(self, row: &Publication) -> (usize, usize) {
        row.authorships
            .iter()
            .map(|a| self.len(a))
            .filter(|len| *len > 0)
            .fold((0, 0), |(n, total), len| (n + 1, total + len))
    }
}

/// Overwrite every column of `base` with the best-populated sibling's.
///
/// Most non-empty entries wins, then the longest text, then the earlier row.
/// A column empty on every row is left untouched.
fn fill_columns(base: &mut Publication, group: &[Publication]) {
    for column in Column::ALL {
        let mut best: Option<(&Publication, (usize, usize))> = None;
        for row in group {
            let weight = column.weight(row);
            if weight.0 == 0 {
                continue;
            }
            if best.map_or(true, |(_, w)| weight > w) {
                best = Some((row, weight));
            }
        }
        let Some((source, _)) = best else {
            continue;
        };

        if base.authorships.len() < source.authorships.len() {
            base.authorships
                .resize_with(source.authorships.len(), Authorship::default);
        }
        for (to, from) in base.authorships.iter_mut().zip(&source.authorships) {
            column.copy(from, to);
        }
    }
}

/// Count the non-empty per-authorship values on a row.
///
/// Rows fetched for different authors can disagree on how complete the
/// authorship arrays are; the richest one is the best representative.
pub fn richness(publication: &Publication) -> usize {
    publication
        .authorships
        .iter()
        .map(|a| {
            [
                !a.author_id.is_empty(),
                !a.author_name.is_empty(),
                !a.country.is_empty(),
                a.position != AuthorPosition::Unknown,
                !a.institution.id.is_empty(),
                !a.institution.name.is_empty(),
                !a.institution.country.is_empty(),
            ]
            .iter()
            .filter(|present| **present)
            .count()
        })
        .sum()
}

/// Collapse rows sharing a work key into one row per work.
///
/// Output order follows the first appearance of each work key. Ties on
/// richness keep the earlier row.
pub fn merge_by_work(rows: Vec<Publication>) -> Vec<Publication> {
    let before = rows.len();
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Publication>> = HashMap::new();

    for row in rows {
        let key = row.work_key();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(row);
    }

    let mut merged = Vec::with_capacity(order.len());
    for key in order {
        let Some(group) = groups.remove(&key) else {
            continue;
        };

        let mut union_ids: Vec<String> = group
            .iter()
            .flat_map(|p| {
                p.cohort_union_ids
                    .iter()
                    .cloned()
                    .chain(std::iter::once(p.representative_author_id.clone()))
            })
            .filter(|id| !id.is_empty())
            .collect();
        union_ids.sort();
        union_ids.dedup();

        let mut best_idx = 0;
        let mut best_score = 0;
        for (i, row) in group.iter().enumerate() {
            let score = richness(row);
            if i == 0 || score > best_score {
                best_idx = i;
                best_score = score;
            }
        }

        let Some(mut best) = group.get(best_idx).cloned() else {
            continue;
        };
        fill_columns(&mut best, &group);
        best.cohort_union_ids = union_ids;
        merged.push(best);
    }

    debug!(before, after = merged.len(), "Merged compiled rows by work key");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, rep: &str, authors: usize) -> Publication {
        Publication {
            id: id.to_string(),
            representative_author_id: rep.to_string(),
            authorships: (0..authors)
                .map(|i| Authorship {
                    author_id: format!("X{i}"),
                    position: AuthorPosition::Middle,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_keeps_richest_and_unions_owners() {
        let merged = merge_by_work(vec![
            row("W1", "A2", 1),
            row("W2", "A1", 2),
            row("W1", "A1", 3),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "W1");
        assert_eq!(merged[0].authorships.len(), 3);
        assert_eq!(merged[0].cohort_union_ids, vec!["A1", "A2"]);
        assert_eq!(merged[1].cohort_union_ids, vec!["A1"]);
    }

    #[test]
    fn test_merge_fills_columns_from_sibling_rows() {
        let mut countries = row("W1", "A1", 2);
        for (a, c) in countries.authorships.iter_mut().zip(["CA", "FR"]) {
            a.country = c.to_string();
            a.position = AuthorPosition::Unknown;
        }
        let mut positions = row("W1", "A2", 2);
        positions.authorships[0].position = AuthorPosition::First;
        positions.authorships[1].position = AuthorPosition::Last;
        positions.authorships[1].institution.name = "Paris Lab".to_string();

        let merged = merge_by_work(vec![countries, positions]);
        assert_eq!(merged.len(), 1);
        let got: Vec<(&str, AuthorPosition)> = merged[0]
            .authorships
            .iter()
            .map(|a| (a.country.as_str(), a.position))
            .collect();
        assert_eq!(
            got,
            vec![("CA", AuthorPosition::First), ("FR", AuthorPosition::Last)]
        );
        assert_eq!(merged[0].authorships[1].institution.name, "Paris Lab");
        assert_eq!(merged[0].cohort_union_ids, vec!["A1", "A2"]);
    }

    #[test]
    fn test_longer_column_wins_over_shorter() {
        let mut short = row("W1", "A1", 1);
        short.authorships[0].country = "CA".to_string();
        let mut long = row("W1", "A2", 3);
        long.authorships[2].country = "FR".to_string();
        long.authorships[1].country = "US".to_string();

        let merged = merge_by_work(vec![short, long]);
        let countries: Vec<&str> = merged[0]
            .authorships
            .iter()
            .map(|a| a.country.as_str())
            .collect();
        assert_eq!(countries, vec!["", "US", "FR"]);
    }

    #[test]
    fn test_merge_falls_back_to_doi_key() {
        let mut a = row("", "A1", 1);
        a.doi = "10.1/x".to_string();
        let mut b = row("", "A2", 1);
        b.doi = "10.1/X".to_string();
        let merged = merge_by_work(vec![a, b]);
        assert_eq!(merged.len(), 1);
    }
}
