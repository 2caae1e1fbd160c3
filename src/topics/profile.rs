// Per-author topic sets built from the selected publications.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::filter::{cohort_on, Selection};
use crate::records::models::Publication;

/// The set of topic tokens one cohort member published on.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorTopicProfile {
    pub id: String,
    pub name: String,
    pub topics: BTreeSet<String>,
}

/// Topic tokens of one publication.
///
/// The (primary topic, subfield) pair when either is present, else the
/// concept list. Lowercased and trimmed; single-character tokens dropped.
pub fn publication_topics(publication: &Publication) -> BTreeSet<String> {
    let primary = [
        publication.primary_topic.as_str(),
        publication.topic_subfield.as_str(),
    ];
    let raw: Vec<&str> = if primary.iter().any(|t| !t.trim().is_empty()) {
        primary.to_vec()
    } else {
        publication.concepts.iter().map(String::as_str).collect()
    };

    raw.into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| t.chars().count() > 1)
        .collect()
}

/// Profiles for the contributing roster, in roster order, empty ones dropped.
pub fn build_profiles(selection: &Selection) -> Vec<AuthorTopicProfile> {
    let roster_ids = selection.roster_ids();
    let mut profiles: Vec<AuthorTopicProfile> = selection
        .roster
        .iter()
        .map(|r| AuthorTopicProfile {
            id: r.id.clone(),
            name: r.name.clone(),
            topics: BTreeSet::new(),
        })
        .collect();

    for publication in &selection.publications {
        let authors = cohort_on(publication, &roster_ids);
        if authors.is_empty() {
            continue;
        }
        let topics = publication_topics(publication);
        for profile in profiles.iter_mut().filter(|p| authors.contains(&p.id.as_str())) {
            profile.topics.extend(topics.iter().cloned());
        }
    }

    profiles.retain(|p| !p.topics.is_empty());
    profiles
}
