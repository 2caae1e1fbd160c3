// Typed records: the contract the normalizer produces and the analytics consume.
//
// Everything here is immutable once loaded. The analytics stages only ever
// borrow these; derived structures live in their own modules.

use serde::{Deserialize, Serialize};

use super::normalize::normalize_text;

/// A cohort member from the roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Researcher {
    /// Canonical author id (URL prefix stripped, e.g. `A5023888391`)
    pub id: String,
    pub name: String,
    pub level: String,
    pub category: String,
    pub appointment: String,
    /// Research-group tags, at most four, blanks removed
    pub groups: Vec<String>,
    pub h_index: u32,
    pub i10_index: u32,
    pub works_count: u32,
    pub total_citations: u64,
    /// Optional external identifier (ORCID)
    pub external_id: Option<String>,
}

/// Position of an authorship in the author list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorPosition {
    First,
    Middle,
    Last,
    #[default]
    Unknown,
}

impl AuthorPosition {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "first" => AuthorPosition::First,
            "middle" => AuthorPosition::Middle,
            "last" => AuthorPosition::Last,
            _ => AuthorPosition::Unknown,
        }
    }

    /// First or last author.
    pub fn is_first_or_last(self) -> bool {
        matches!(self, AuthorPosition::First | AuthorPosition::Last)
    }

    pub fn is_middle(self) -> bool {
        self == AuthorPosition::Middle
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorPosition::First => "first",
            AuthorPosition::Middle => "middle",
            AuthorPosition::Last => "last",
            AuthorPosition::Unknown => "",
        }
    }
}

/// First-listed institution of one authorship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    /// ROR-style identifier with the `https://ror.org/` prefix removed
    pub id: String,
    pub name: String,
    pub country: String,
}

/// One row of the index-aligned authorship arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authorship {
    pub country: String,
    pub author_id: String,
    pub author_name: String,
    pub is_corresponding: bool,
    pub position: AuthorPosition,
    pub institution: Institution,
}

impl Authorship {
    /// Affiliation country: the authorship country, else the institution's.
    pub fn affiliation_country(&self) -> Option<String> {
        let raw = if self.country.trim().is_empty() {
            self.institution.country.trim()
        } else {
            self.country.trim()
        };
        if raw.is_empty() {
            None
        } else {
            Some(raw.to_uppercase())
        }
    }
}

/// A publication in dedup-by-work form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Publication {
    pub id: String,
    pub doi: String,
    pub title: String,
    /// Publication year, clamped into the configured bounds; `None` if unparseable
    pub year: Option<i32>,
    pub work_type: String,
    pub cited_by_count: u64,
    /// Field-weighted citation impact; NaN when unknown
    pub fwci: f64,
    pub primary_topic: String,
    pub topic_subfield: String,
    pub topic_field: String,
    pub concepts: Vec<String>,
    /// Semicolon-delimited author names
    pub authors_text: String,
    pub representative_author_id: String,
    pub representative_author_name: String,
    /// Union of cohort author ids that own this work (may be empty)
    pub cohort_union_ids: Vec<String>,
    pub authorships: Vec<Authorship>,
}

impl Publication {
    /// Stable key for deduplication: work id, else DOI, else normalized title.
    pub fn work_key(&self) -> String {
        if !self.id.trim().is_empty() {
            self.id.trim().to_string()
        } else if !self.doi.trim().is_empty() {
            format!("doi:{}", self.doi.trim().to_lowercase())
        } else {
            format!("title:{}", normalize_text(&self.title))
        }
    }

    /// Whether `author_id` appears on this work by any signal we carry:
    /// representative id, union ids, or the raw authorship id list.
    pub fn mentions_author(&self, author_id: &str) -> bool {
        self.representative_author_id == author_id
            || self.cohort_union_ids.iter().any(|id| id == author_id)
            || self.authorships.iter().any(|a| a.author_id == author_id)
    }

    /// The union ids when present, else the representative id.
    pub fn owner_ids(&self) -> Vec<&str> {
        if self.cohort_union_ids.is_empty() {
            if self.representative_author_id.is_empty() {
                Vec::new()
            } else {
                vec![self.representative_author_id.as_str()]
            }
        } else {
            self.cohort_union_ids.iter().map(|s| s.as_str()).collect()
        }
    }
}

/// One (work, cohort author) row of the per-author projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedWork {
    pub author_id: String,
    pub author_name: String,
    /// True when this author is the work's representative owner
    pub representative_owner: bool,
    pub work: Publication,
}

/// Inclusive year window supported by the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearBounds {
    pub min: i32,
    pub max: i32,
}

impl YearBounds {
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn clamp(&self, year: i32) -> i32 {
        year.max(self.min).min(self.max)
    }
}
