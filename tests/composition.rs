// Composition tests: one full recompute cycle from normalized rows to every
// derived structure.
//
// These tests exercise the data flow between modules:
//   raw rows -> normalize -> merge -> filter -> graph / countries /
//   institutions / embedding -> drill-downs -> JSON
// without touching the filesystem (except the JSON export, which writes to
// the temp dir).

use serde_json::json;

use cohortlens::filter::FilterSnapshot;
use cohortlens::graph::MembershipSource;
use cohortlens::output::json::{to_json, write_analysis};
use cohortlens::output::truncate_chars;
use cohortlens::pipeline::{Analysis, Settings};
use cohortlens::records::dedup::merge_by_work;
use cohortlens::records::models::YearBounds;
use cohortlens::records::normalize::{
    normalize_publication, normalize_researcher, RawPublication, RawResearcher,
};
use cohortlens::records::Dataset;
use cohortlens::topics::TopicEmbedding;

fn bounds() -> YearBounds {
    YearBounds::new(2020, 2024)
}

fn roster_rows() -> Vec<serde_json::Value> {
    vec![
        json!({
            "OpenAlexID": "https://openalex.org/A1",
            "Name": "Ann Lee",
            "Level": "Professor",
            "Category": "Research",
            "Group1": "Infectious Disease",
        }),
        json!({
            "OpenAlexID": "https://openalex.org/A2",
            "Name": "Bo Chan",
            "Level": "Assistant",
            "Category": "Clinical",
            "Group1": "Production Animal Health",
        }),
    ]
}

/// Compiled rows as the ETL emits them: one per (cohort author, work).
fn work_rows() -> Vec<serde_json::Value> {
    vec![
        json!({
            "id": "https://openalex.org/W1",
            "title": "Bovine respiratory disease surveillance",
            "publication_year": 2022,
            "type": "journal-article",
            "fwci": "1.5",
            "primary_topic__display_name": "Bovine Respiratory Disease",
            "primary_topic__subfield__display_name": "Veterinary Epidemiology",
            "authors": "Ann Lee; Bo Chan; Marie Curie",
            "author_openalex_id": "https://openalex.org/A1",
            "author_name": "Ann Lee",
            "authorships__author__id":
                "https://openalex.org/A1|https://openalex.org/A2|https://openalex.org/X1",
            "authorships__author__display_name": "Ann Lee|Bo Chan|Marie Curie",
            "authorships__author_position": "first|middle|last",
            "authorships__countries": "CA|CA|FR",
            "authorships__institutions__ror":
                "https://ror.org/home1|https://ror.org/home1|https://ror.org/paris1",
            "authorships__institutions__display_name": "Home U|Home U|Paris Lab",
            "authorships__institutions__country_code": "CA|CA|FR",
        }),
        // Same work fetched for A2 with a thinner authorship payload.
        json!({
            "id": "https://openalex.org/W1",
            "title": "Bovine respiratory disease surveillance",
            "publication_year": 2022,
            "author_openalex_id": "https://openalex.org/A2",
            "author_name": "Bo Chan",
            "authorships__author__id":
                "https://openalex.org/A1|https://openalex.org/A2|https://openalex.org/X1",
        }),
        json!({
            "id": "https://openalex.org/W2",
            "title": "Antimicrobial resistance in swine",
            "publication_year": 2023,
            "fwci": "n/a",
            "primary_topic__display_name": "Antimicrobial Resistance",
            "primary_topic__subfield__display_name": "Microbiology",
            "authors": "Ann Lee",
            "author_openalex_id": "https://openalex.org/A1",
            "author_name": "Ann Lee",
            "authorships__author__id": "https://openalex.org/A1",
            "authorships__author_position": "first",
            "authorships__countries": "CA",
            "authorships__institutions__ror": "https://ror.org/home1",
        }),
        json!({
            "id": "https://openalex.org/W3",
            "title": "Old work outside the window",
            "publication_year": "unknown",
            "author_openalex_id": "https://openalex.org/A2",
        }),
    ]
}

fn dataset() -> Dataset {
    let roster = roster_rows()
        .into_iter()
        .map(|v| serde_json::from_value::<RawResearcher>(v).unwrap())
        .filter_map(|raw| normalize_researcher(&raw))
        .collect();
    let works = work_rows()
        .into_iter()
        .map(|v| serde_json::from_value::<RawPublication>(v).unwrap())
        .map(|raw| normalize_publication(&raw, &bounds()))
        .collect();
    Dataset::new(roster, merge_by_work(works), None, bounds())
}

fn compute(dataset: &Dataset, snapshot: &FilterSnapshot) -> Analysis {
    Analysis::compute(dataset, snapshot, &Settings::default()).unwrap()
}

// ============================================================
// Full cycle
// ============================================================

#[test]
fn two_member_scenario_graph() {
    let analysis = compute(&dataset(), &FilterSnapshot::default());

    assert_eq!(analysis.selection.publications.len(), 2);
    assert_eq!(analysis.selection.roster.len(), 2);

    let graph = &analysis.graph;
    assert_eq!(graph.source, MembershipSource::NameMatching);
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].weight, 1);
    assert!(graph.nodes.iter().all(|n| n.degree == 1));
    assert_eq!(analysis.pair("A2", "A1").len(), 1);
    assert_eq!(analysis.pair("A2", "A1")[0].id, "W1");
}

#[test]
fn derived_projection_gives_same_graph() {
    let mut data = dataset();
    data.ensure_projection();
    let analysis = compute(&data, &FilterSnapshot::default());
    assert_eq!(analysis.graph.source, MembershipSource::Projection);
    assert_eq!(analysis.graph.edges.len(), 1);
    assert_eq!(analysis.graph.edges[0].source, "A1");
    assert_eq!(analysis.graph.edges[0].target, "A2");
}

#[test]
fn merged_work_keeps_richest_payload() {
    let data = dataset();
    let w1 = data.works.iter().find(|w| w.id == "W1").unwrap();
    assert_eq!(w1.cohort_union_ids, vec!["A1", "A2"]);
    assert_eq!(w1.authorships[2].country, "FR");
    assert_eq!(w1.work_type, "article");
}

#[test]
fn first_author_credits_french_middle_coauthor_scenario() {
    let analysis = compute(&dataset(), &FilterSnapshot::default());
    assert_eq!(analysis.countries.home_country, "CA");
    assert!(analysis.countries.home_inferred);
    assert_eq!(analysis.countries.countries, vec!["FR"]);
    assert_eq!(analysis.countries.total, 1);

    let rows = analysis.country("fr");
    assert_eq!(rows.len(), 1);
    let ids: Vec<&str> = rows[0].authors.iter().map(|a| a.id.as_str()).collect();
    // X1 is last, so the middle cohort author qualifies too.
    assert_eq!(ids, vec!["A1", "A2"]);
}

#[test]
fn partner_institutions_exclude_home() {
    let analysis = compute(&dataset(), &FilterSnapshot::default());
    let ranking = &analysis.institutions;
    assert_eq!(ranking.home_institution.as_deref(), Some("home1"));
    assert_eq!(ranking.partners.len(), 1);
    assert_eq!(ranking.partners[0].id, "paris1");
    assert_eq!(ranking.partners[0].name, "Paris Lab");
    assert_eq!(analysis.institution("paris1").len(), 1);
    assert!(analysis.institution("home1").is_empty());
}

#[test]
fn topic_embedding_places_both_members() {
    let analysis = compute(&dataset(), &FilterSnapshot::default());
    match &analysis.embedding {
        TopicEmbedding::Embedded(e) => {
            assert_eq!(e.points.len(), 2);
            assert!(e.eigenvalues[0] > 0.0);
            assert_eq!(e.eigenvalues[1], 0.0);
        }
        other => panic!("expected an embedding, got {other:?}"),
    }
}

#[test]
fn focus_narrows_every_stage() {
    let snapshot = FilterSnapshot {
        focus: Some("A2".to_string()),
        ..Default::default()
    };
    let analysis = compute(&dataset(), &snapshot);
    assert_eq!(analysis.selection.publications.len(), 1);
    assert_eq!(analysis.selection.roster.len(), 1);
    assert!(analysis.graph.edges.is_empty());
    assert!(matches!(
        analysis.embedding,
        TopicEmbedding::InsufficientData { authors: 1 }
    ));
    // A2 is a middle author and the French coauthor is last.
    assert_eq!(analysis.countries.countries, vec!["FR"]);
}

#[test]
fn category_filter_drops_shared_work_owner() {
    let snapshot = FilterSnapshot {
        categories: vec!["Clinical".to_string()],
        ..Default::default()
    };
    let analysis = compute(&dataset(), &snapshot);
    // W1's representative is A1 (Research), so nothing survives.
    assert!(analysis.selection.publications.is_empty());
    assert!(analysis.selection.roster.is_empty());
    assert_eq!(analysis.countries.home_country, "CA");
    assert!(!analysis.countries.home_inferred);
}

#[test]
fn recompute_is_deterministic() {
    let data = dataset();
    let snapshot = FilterSnapshot::default();
    let a = to_json(&compute(&data, &snapshot)).unwrap();
    let b = to_json(&compute(&data, &snapshot)).unwrap();
    assert_eq!(a, b);
}

// ============================================================
// Export
// ============================================================

#[test]
fn json_export_round_trips_as_value() {
    let analysis = compute(&dataset(), &FilterSnapshot::default());
    let dir = std::env::temp_dir().join(format!("cohortlens-export-{}", std::process::id()));
    let path = dir.join("analysis.json");
    let written = write_analysis(&analysis, path.to_str().unwrap()).unwrap();

    let text = std::fs::read_to_string(&written).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["countries"]["home_country"], "CA");
    assert_eq!(value["graph"]["edges"][0]["weight"], 1);
    // NaN impact scores are written as null.
    let w2 = value["selection"]["publications"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == "W2")
        .unwrap();
    assert!(w2["fwci"].is_null());
}

#[test]
fn long_titles_truncate_on_char_boundaries() {
    let title = "Épidémiologie des maladies respiratoires bovines au Québec";
    let short = truncate_chars(title, 12);
    assert_eq!(short, "Épidémiologi...");
}
