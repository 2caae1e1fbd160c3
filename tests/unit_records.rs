// Unit tests for the record layer: normalization, merge-aware dedup,
// projection derivation, and dataset loading from disk.

use std::path::PathBuf;

use serde_json::json;

use cohortlens::config::Config;
use cohortlens::records::dedup::merge_by_work;
use cohortlens::records::models::{AuthorPosition, Publication, Researcher, YearBounds};
use cohortlens::records::normalize::{normalize_publication, RawPublication};
use cohortlens::records::projection::project;
use cohortlens::records::Dataset;

fn bounds() -> YearBounds {
    YearBounds::new(2020, 2024)
}

fn raw(value: serde_json::Value) -> RawPublication {
    serde_json::from_value(value).unwrap()
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cohortlens-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config_for(roster: PathBuf, works: PathBuf, projection: Option<PathBuf>) -> Config {
    Config {
        roster_path: roster,
        works_path: works,
        projection_path: projection,
        year_min: 2020,
        year_max: 2024,
        home_country_fallback: "CA".to_string(),
        mds_iterations: 150,
        mds_seed: 42,
    }
}

// ============================================================
// Normalizer
// ============================================================

#[test]
fn authorship_arrays_share_one_length() {
    let rows = [
        (json!({ "authorships__countries": "CA|US", "authorships__author__id": "A1" }), 2),
        (
            json!({ "authorships__author__id": ["A1", "A2", "A3"], "authorships__countries": "CA" }),
            3,
        ),
        (
            json!({ "authorships__institutions__ror": "https://ror.org/x1|https://ror.org/x2" }),
            2,
        ),
        (json!({}), 0),
    ];
    for (row, expected) in rows {
        let p = normalize_publication(&raw(row), &bounds());
        assert_eq!(p.authorships.len(), expected);
    }
}

#[test]
fn padded_authorships_are_blank() {
    let p = normalize_publication(
        &raw(json!({
            "authorships__countries": "CA|US|FR",
            "authorships__author__id": "A1",
        })),
        &bounds(),
    );
    assert_eq!(p.authorships[0].author_id, "A1");
    assert_eq!(p.authorships[2].author_id, "");
    assert_eq!(p.authorships[2].country, "FR");
    assert_eq!(p.authorships[2].position, AuthorPosition::Unknown);
    assert!(!p.authorships[2].is_corresponding);
}

#[test]
fn authorship_fields_are_canonicalized() {
    let p = normalize_publication(
        &raw(json!({
            "id": "https://openalex.org/W42",
            "doi": "https://doi.org/10.1000/XYZ",
            "authorships__countries": "ca|",
            "authorships__author__id": "https://openalex.org/A1|https://openalex.org/A2",
            "authorships__author_position": "first|last",
            "authorships__institutions__ror": "https://ror.org/03yjb2x39|",
            "authorships__institutions__country_code": "|fr",
        })),
        &bounds(),
    );
    assert_eq!(p.id, "W42");
    assert_eq!(p.doi, "10.1000/xyz");
    assert_eq!(p.authorships.len(), 2);
    assert_eq!(p.authorships[0].author_id, "A1");
    assert_eq!(p.authorships[0].institution.id, "03yjb2x39");
    assert_eq!(p.authorships[1].position, AuthorPosition::Last);
    assert_eq!(p.authorships[1].affiliation_country().as_deref(), Some("FR"));
}

#[test]
fn unparseable_year_is_none() {
    let p = normalize_publication(&raw(json!({ "publication_year": "unknown" })), &bounds());
    assert_eq!(p.year, None);
}

// ============================================================
// Merge-aware dedup
// ============================================================

#[test]
fn merge_keeps_richest_row_and_unions_owners() {
    let sparse = normalize_publication(
        &raw(json!({
            "id": "W1",
            "author_openalex_id": "A2",
            "authorships__author__id": "A1|A2",
        })),
        &bounds(),
    );
    let rich = normalize_publication(
        &raw(json!({
            "id": "https://openalex.org/W1",
            "author_openalex_id": "A1",
            "authorships__author__id": "A1|A2",
            "authorships__countries": "CA|US",
            "authorships__author_position": "first|last",
        })),
        &bounds(),
    );
    let other = Publication {
        id: "W2".to_string(),
        representative_author_id: "A3".to_string(),
        ..Default::default()
    };

    let merged = merge_by_work(vec![sparse, other, rich]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].id, "W1");
    assert_eq!(merged[0].cohort_union_ids, vec!["A1", "A2"]);
    assert_eq!(merged[0].authorships[1].country, "US");
    assert_eq!(merged[1].id, "W2");
}

#[test]
fn works_without_id_merge_on_doi() {
    let a = Publication {
        doi: "10.1/ABC".to_string(),
        representative_author_id: "A1".to_string(),
        ..Default::default()
    };
    let b = Publication {
        doi: "10.1/abc".to_string(),
        representative_author_id: "A2".to_string(),
        ..Default::default()
    };
    let merged = merge_by_work(vec![a, b]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].cohort_union_ids, vec!["A1", "A2"]);
}

// ============================================================
// Projection derivation
// ============================================================

#[test]
fn projection_emits_one_row_per_owner() {
    let roster = vec![
        Researcher {
            id: "A1".to_string(),
            name: "Ann Lee".to_string(),
            ..Default::default()
        },
        Researcher {
            id: "A2".to_string(),
            name: "Bo Chan".to_string(),
            ..Default::default()
        },
    ];
    let works = vec![Publication {
        id: "W1".to_string(),
        representative_author_id: "A1".to_string(),
        cohort_union_ids: vec!["A1".to_string(), "A2".to_string()],
        ..Default::default()
    }];
    let rows = project(&works, &roster);
    assert_eq!(rows.len(), 2);
    assert!(rows[0].representative_owner);
    assert!(!rows[1].representative_owner);
    assert_eq!(rows[1].author_name, "Bo Chan");
}

// ============================================================
// Dataset loading
// ============================================================

#[test]
fn load_reads_and_merges_rows() {
    let dir = temp_dir("load");
    let roster = dir.join("roster.json");
    let works = dir.join("works.json");
    std::fs::write(
        &roster,
        json!([
            { "OpenAlexID": "https://openalex.org/A1", "Name": "Ann Lee", "Level": "Professor" },
            { "OpenAlexID": "https://openalex.org/A2", "Name": "Bo Chan", "Level": "Assistant" },
            { "Name": "No Id" }
        ])
        .to_string(),
    )
    .unwrap();
    std::fs::write(
        &works,
        json!([
            { "id": "W1", "publication_year": 2022, "author_openalex_id": "A1" },
            { "id": "W1", "publication_year": 2022, "author_openalex_id": "A2" },
            { "id": "W2", "publication_year": "2023", "author_openalex_id": "A1" }
        ])
        .to_string(),
    )
    .unwrap();

    let mut dataset = Dataset::load(&config_for(roster, works, None)).unwrap();
    assert_eq!(dataset.roster.len(), 2);
    assert_eq!(dataset.works.len(), 2);
    assert_eq!(dataset.works[0].cohort_union_ids, vec!["A1", "A2"]);
    assert!(dataset.projection.is_none());

    dataset.ensure_projection();
    assert_eq!(dataset.projection.as_ref().map(Vec::len), Some(3));
}

#[test]
fn missing_roster_is_fatal() {
    let dir = temp_dir("missing");
    let works = dir.join("works.json");
    std::fs::write(&works, "[]").unwrap();
    let err = Dataset::load(&config_for(dir.join("nope.json"), works, None)).unwrap_err();
    assert!(err.to_string().contains("Roster not found"));
}

#[test]
fn broken_projection_degrades_to_none() {
    let dir = temp_dir("projection");
    let roster = dir.join("roster.json");
    let works = dir.join("works.json");
    let projection = dir.join("projection.json");
    std::fs::write(&roster, "[]").unwrap();
    std::fs::write(&works, "[]").unwrap();
    std::fs::write(&projection, "{ not json").unwrap();

    let dataset = Dataset::load(&config_for(roster, works, Some(projection))).unwrap();
    assert!(dataset.projection.is_none());
}

#[test]
fn malformed_works_file_is_an_error() {
    let dir = temp_dir("malformed");
    let roster = dir.join("roster.json");
    let works = dir.join("works.json");
    std::fs::write(&roster, "[]").unwrap();
    std::fs::write(&works, "not json").unwrap();
    let err = Dataset::load(&config_for(roster, works, None)).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse"));
}
