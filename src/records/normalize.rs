// Record normalizer: coerces loosely-shaped input rows into typed records.
//
// Rows arrive as JSON objects whose field names follow the flattened ETL
// output (`authorships__countries`, `primary_topic__display_name`, ...).
// Values may be strings where numbers are expected, and the per-authorship
// arrays may be JSON arrays or `|`-joined strings. Nothing in here fails:
// unparseable counts become 0, unparseable impact scores become NaN, and
// short authorship arrays are padded.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Deserialize;
use serde_json::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::models::{
    AuthorPosition, Authorship, Institution, ProjectedWork, Publication, Researcher, YearBounds,
};

static AUTHOR_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(www\.)?openalex\.org/(authors/|works/)?")
        .expect("author prefix regex is valid")
});

static ROR_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(www\.)?ror\.org/").expect("ror prefix regex is valid")
});

static DOI_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://(dx\.)?doi\.org/|doi:)").expect("doi prefix regex is valid")
});

/// Maximum number of research-group tags kept per researcher.
pub const MAX_GROUPS: usize = 4;

/// A roster row as it comes off disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawResearcher {
    #[serde(alias = "OpenAlexID", alias = "openalex_id", alias = "author_openalex_id")]
    pub id: Value,
    #[serde(alias = "Name", alias = "author_name", alias = "FullName")]
    pub name: Value,
    #[serde(alias = "Level")]
    pub level: Value,
    #[serde(alias = "Category")]
    pub category: Value,
    #[serde(alias = "Appointment")]
    pub appointment: Value,
    #[serde(alias = "Group1", alias = "research_group_1")]
    pub group_1: Value,
    #[serde(alias = "Group2", alias = "research_group_2")]
    pub group_2: Value,
    #[serde(alias = "Group3", alias = "research_group_3")]
    pub group_3: Value,
    #[serde(alias = "Group4", alias = "research_group_4")]
    pub group_4: Value,
    #[serde(alias = "H-index", alias = "h-index")]
    pub h_index: Value,
    #[serde(alias = "i10-index", alias = "I10-index")]
    pub i10_index: Value,
    #[serde(alias = "Works_count", alias = "works")]
    pub works_count: Value,
    #[serde(alias = "Total_citations", alias = "cited_by_count")]
    pub total_citations: Value,
    #[serde(alias = "ORCID", alias = "orcid")]
    pub external_id: Value,
}

/// A publication row (dedup form or per-author projection) as it comes off disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawPublication {
    pub id: Value,
    pub doi: Value,
    #[serde(alias = "display_name")]
    pub title: Value,
    #[serde(alias = "publication_year")]
    pub year: Value,
    #[serde(rename = "type")]
    pub work_type: Value,
    pub cited_by_count: Value,
    pub fwci: Value,
    #[serde(rename = "primary_topic__display_name")]
    pub primary_topic: Value,
    #[serde(rename = "primary_topic__subfield__display_name")]
    pub topic_subfield: Value,
    #[serde(rename = "primary_topic__field__display_name")]
    pub topic_field: Value,
    #[serde(rename = "concepts_list")]
    pub concepts: Value,
    #[serde(rename = "authors")]
    pub authors_text: Value,
    #[serde(rename = "author_openalex_id")]
    pub representative_author_id: Value,
    #[serde(rename = "author_name")]
    pub representative_author_name: Value,
    #[serde(rename = "cohort_union_author_ids")]
    pub cohort_union_ids: Value,
    pub is_representative_owner: Value,
    #[serde(rename = "authorships__countries")]
    pub countries: Value,
    #[serde(rename = "authorships__author__id")]
    pub author_ids: Value,
    #[serde(rename = "authorships__author__display_name")]
    pub author_names: Value,
    #[serde(rename = "authorships__is_corresponding")]
    pub corresponding: Value,
    #[serde(rename = "authorships__author_position")]
    pub positions: Value,
    #[serde(rename = "authorships__institutions__ror")]
    pub institution_ids: Value,
    #[serde(rename = "authorships__institutions__display_name")]
    pub institution_names: Value,
    #[serde(rename = "authorships__institutions__country_code")]
    pub institution_countries: Value,
}

/// Lowercase, strip diacritics, and collapse every non-alphanumeric run to
/// a single space.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip an OpenAlex URL prefix from an author or work id.
pub fn canonical_id(raw: &str) -> String {
    AUTHOR_PREFIX.replace(raw.trim(), "").trim().to_string()
}

/// Strip the `https://ror.org/` prefix from an institution id.
pub fn canonical_ror(raw: &str) -> String {
    ROR_PREFIX.replace(raw.trim(), "").trim().to_string()
}

/// Strip DOI resolver prefixes and lowercase.
pub fn canonical_doi(raw: &str) -> String {
    DOI_PREFIX.replace(raw.trim(), "").trim().to_lowercase()
}

/// Map source publication types onto the names used downstream.
pub fn canonical_work_type(raw: &str) -> String {
    let t = raw.trim().to_lowercase();
    match t.as_str() {
        "journal-article" => "article".to_string(),
        "proceedings-article" => "proceedings".to_string(),
        "posted-content" => "preprint".to_string(),
        "book-chapter" => "book-chapter".to_string(),
        _ => t,
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn non_empty(value: &Value) -> Option<String> {
    let s = text(value);
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Parse a count; anything unparseable or negative is 0.
pub fn coerce_count(value: &Value) -> u64 {
    match as_number(value) {
        Some(v) if v >= 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

/// Like `coerce_count`, saturating at `u32::MAX`.
pub fn coerce_index(value: &Value) -> u32 {
    u32::try_from(coerce_count(value)).unwrap_or(u32::MAX)
}

/// Parse an impact score; anything unparseable is NaN.
pub fn coerce_score(value: &Value) -> f64 {
    as_number(value).unwrap_or(f64::NAN)
}

fn coerce_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

/// Split a list-valued field. Arrays are taken as-is; strings are split on
/// `sep`. Empty entries are kept so aligned arrays stay aligned.
fn aligned_list(value: &Value, sep: char) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(text).collect(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::String(s) => s.split(sep).map(|p| p.trim().to_string()).collect(),
        Value::Null => Vec::new(),
        other => vec![text(other)],
    }
}

/// Split a free list (concepts, union ids). Empty entries are dropped.
fn free_list(value: &Value, seps: &[char]) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(text)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(|c| seps.contains(&c))
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn pad(values: &mut Vec<String>, len: usize) {
    if values.len() < len {
        values.resize(len, String::new());
    }
}

/// Normalize one roster row. Returns `None` when the row has no id.
pub fn normalize_researcher(raw: &RawResearcher) -> Option<Researcher> {
    let id = canonical_id(&text(&raw.id));
    if id.is_empty() {
        return None;
    }

    let groups: Vec<String> = [&raw.group_1, &raw.group_2, &raw.group_3, &raw.group_4]
        .into_iter()
        .filter_map(non_empty)
        .take(MAX_GROUPS)
        .collect();

    let name = non_empty(&raw.name).unwrap_or_else(|| id.clone());

    Some(Researcher {
        id,
        name,
        level: text(&raw.level),
        category: text(&raw.category),
        appointment: text(&raw.appointment),
        groups,
        h_index: coerce_index(&raw.h_index),
        i10_index: coerce_index(&raw.i10_index),
        works_count: coerce_index(&raw.works_count),
        total_citations: coerce_count(&raw.total_citations),
        external_id: non_empty(&raw.external_id),
    })
}

/// Normalize one publication row.
///
/// The aligned authorship arrays are zipped into `Authorship` rows. Every
/// array is right-padded to the longest one (the country array is normally
/// the longest); nothing is ever truncated.
pub fn normalize_publication(raw: &RawPublication, bounds: &YearBounds) -> Publication {
    let mut countries = aligned_list(&raw.countries, '|');
    let mut author_ids = aligned_list(&raw.author_ids, '|');
    let mut author_names = aligned_list(&raw.author_names, '|');
    let mut corresponding = aligned_list(&raw.corresponding, '|');
    let mut positions = aligned_list(&raw.positions, '|');
    let mut institution_ids = aligned_list(&raw.institution_ids, '|');
    let mut institution_names = aligned_list(&raw.institution_names, '|');
    let mut institution_countries = aligned_list(&raw.institution_countries, '|');

    let len = [
        countries.len(),
        author_ids.len(),
        author_names.len(),
        corresponding.len(),
        positions.len(),
        institution_ids.len(),
        institution_names.len(),
        institution_countries.len(),
    ]
    .into_iter()
    .max()
    .unwrap_or(0);

    for list in [
        &mut countries,
        &mut author_ids,
        &mut author_names,
        &mut corresponding,
        &mut positions,
        &mut institution_ids,
        &mut institution_names,
        &mut institution_countries,
    ] {
        pad(list, len);
    }

    let authorships = (0..len)
        .map(|i| Authorship {
            country: countries[i].to_uppercase(),
            author_id: canonical_id(&author_ids[i]),
            author_name: author_names[i].clone(),
            is_corresponding: coerce_flag(&corresponding[i]),
            position: AuthorPosition::parse(&positions[i]),
            institution: Institution {
                id: canonical_ror(&institution_ids[i]),
                name: institution_names[i].clone(),
                country: institution_countries[i].to_uppercase(),
            },
        })
        .collect();

    let mut union_ids: Vec<String> = Vec::new();
    for id in free_list(&raw.cohort_union_ids, &['|', ';']) {
        let id = canonical_id(&id);
        if !id.is_empty() && !union_ids.contains(&id) {
            union_ids.push(id);
        }
    }

    Publication {
        id: canonical_id(&text(&raw.id)),
        doi: canonical_doi(&text(&raw.doi)),
        title: text(&raw.title),
        year: as_number(&raw.year).map(|y| bounds.clamp(y.round() as i32)),
        work_type: canonical_work_type(&text(&raw.work_type)),
        cited_by_count: coerce_count(&raw.cited_by_count),
        fwci: coerce_score(&raw.fwci),
        primary_topic: text(&raw.primary_topic),
        topic_subfield: text(&raw.topic_subfield),
        topic_field: text(&raw.topic_field),
        concepts: free_list(&raw.concepts, &[';', '|']),
        authors_text: text(&raw.authors_text),
        representative_author_id: canonical_id(&text(&raw.representative_author_id)),
        representative_author_name: text(&raw.representative_author_name),
        cohort_union_ids: union_ids,
        authorships,
    }
}

/// Normalize one per-author projection row. The projected author is the
/// row's representative author; rows without one are dropped.
pub fn normalize_projected(raw: &RawPublication, bounds: &YearBounds) -> Option<ProjectedWork> {
    let work = normalize_publication(raw, bounds);
    if work.representative_author_id.is_empty() {
        return None;
    }
    let representative_owner = match &raw.is_representative_owner {
        Value::Bool(b) => *b,
        Value::Null => true,
        other => coerce_flag(&text(other)),
    };
    Some(ProjectedWork {
        author_id: work.representative_author_id.clone(),
        author_name: work.representative_author_name.clone(),
        representative_owner,
        work,
    })
}
