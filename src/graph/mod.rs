// Co-authorship graph: undirected, weighted, over contributing cohort members.
//
// Cohort membership per work comes from the per-author projection when one
// is available, otherwise from matching canonicalized author names against
// the roster. Every pair of cohort members on a work adds one to that
// pair's weight and records the work for drill-down.

pub mod names;

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use serde::Serialize;
use tracing::{debug, info};

use crate::filter::Selection;
use crate::records::models::{ProjectedWork, Publication};
use names::{name_key, split_author_list};

/// Where per-work cohort membership came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MembershipSource {
    #[default]
    Projection,
    NameMatching,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    /// Sum of incident edge weights
    pub degree: u32,
    /// Layout angle on the unit circle, radians
    pub angle: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    /// Lexicographically smaller endpoint
    pub source: String,
    pub target: String,
    /// Number of co-authored works
    pub weight: u32,
    /// Supporting works, one per work key
    pub publications: Vec<Publication>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CoauthorGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub source: MembershipSource,
}

impl CoauthorGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, a: &str, b: &str) -> Option<&GraphEdge> {
        let (source, target) = ordered(a, b);
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    /// Works co-authored by the two members; empty if they never co-authored.
    pub fn pair_publications(&self, a: &str, b: &str) -> &[Publication] {
        self.edge(a, b)
            .map(|e| e.publications.as_slice())
            .unwrap_or(&[])
    }

    /// Edges sorted by weight, heaviest first (ties by endpoint ids).
    pub fn ranked_edges(&self) -> Vec<&GraphEdge> {
        let mut edges: Vec<&GraphEdge> = self.edges.iter().collect();
        edges.sort_by(|a, b| {
            b.weight
                .cmp(&a.weight)
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.target.cmp(&b.target))
        });
        edges
    }
}

fn ordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Build the co-authorship graph for a selection.
pub fn build(selection: &Selection, projection: Option<&[ProjectedWork]>) -> CoauthorGraph {
    let (source, memberships) = match projection {
        Some(rows) if covers_selection(selection, rows) => (
            MembershipSource::Projection,
            memberships_from_projection(selection, rows),
        ),
        Some(rows) => {
            debug!(
                rows = rows.len(),
                "Projection has no rows for the selected works, matching author names"
            );
            (
                MembershipSource::NameMatching,
                memberships_from_names(selection),
            )
        }
        None => {
            debug!("No per-author projection, matching author names against the roster");
            (
                MembershipSource::NameMatching,
                memberships_from_names(selection),
            )
        }
    };

    let mut node_order: Vec<&str> = Vec::new();
    let mut edge_index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut edges: Vec<GraphEdge> = Vec::new();
    let mut edge_works: Vec<HashSet<String>> = Vec::new();

    for (pub_idx, ids) in &memberships {
        let publication = &selection.publications[*pub_idx];
        let work_key = publication.work_key();

        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                for id in [*a, *b] {
                    if !node_order.contains(&id) {
                        node_order.push(id);
                    }
                }

                let (source, target) = ordered(a, b);
                let idx = *edge_index.entry((source, target)).or_insert_with(|| {
                    edges.push(GraphEdge {
                        source: source.to_string(),
                        target: target.to_string(),
                        weight: 0,
                        publications: Vec::new(),
                    });
                    edge_works.push(HashSet::new());
                    edges.len() - 1
                });

                edges[idx].weight += 1;
                if edge_works[idx].insert(work_key.clone()) {
                    edges[idx].publications.push(publication.clone());
                }
            }
        }
    }

    let mut degree: HashMap<&str, u32> = HashMap::new();
    for edge in &edges {
        *degree.entry(edge.source.as_str()).or_insert(0) += edge.weight;
        *degree.entry(edge.target.as_str()).or_insert(0) += edge.weight;
    }

    let n = node_order.len();
    let nodes: Vec<GraphNode> = node_order
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let angle = TAU * i as f64 / n as f64;
            GraphNode {
                id: id.to_string(),
                name: selection.name_of(id).to_string(),
                degree: degree.get(id).copied().unwrap_or(0),
                angle,
                x: angle.cos(),
                y: angle.sin(),
            }
        })
        .collect();

    info!(
        nodes = nodes.len(),
        edges = edges.len(),
        source = ?source,
        "Built co-authorship graph"
    );

    CoauthorGraph {
        nodes,
        edges,
        source,
    }
}

/// Whether any projection row belongs to a selected work.
fn covers_selection(selection: &Selection, rows: &[ProjectedWork]) -> bool {
    if rows.is_empty() {
        return false;
    }
    let keys: HashSet<String> = selection.publications.iter().map(|p| p.work_key()).collect();
    rows.iter().any(|row| keys.contains(&row.work.work_key()))
}

/// Cohort ids per selected work, from projection rows.
///
/// Rows are restricted to works in the selection and authors in the
/// contributing roster. Only works with at least two members are returned.
fn memberships_from_projection<'a>(
    selection: &'a Selection,
    rows: &'a [ProjectedWork],
) -> Vec<(usize, Vec<&'a str>)> {
    let roster_ids = selection.roster_ids();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    for (i, p) in selection.publications.iter().enumerate() {
        by_key.entry(p.work_key()).or_insert(i);
    }

    let mut members: HashMap<usize, Vec<&'a str>> = HashMap::new();
    for row in rows {
        let Some(&idx) = by_key.get(&row.work.work_key()) else {
            continue;
        };
        let Some(&id) = roster_ids.get(row.author_id.as_str()) else {
            continue;
        };
        let entry = members.entry(idx).or_default();
        if !entry.contains(&id) {
            entry.push(id);
        }
    }

    let mut out: Vec<(usize, Vec<&'a str>)> = members
        .into_iter()
        .filter(|(_, ids)| ids.len() >= 2)
        .collect();
    out.sort_by_key(|(idx, _)| *idx);
    out
}

/// Cohort ids per selected work, from canonicalized author names.
///
/// A name key shared by two contributing members is ambiguous and ignored.
fn memberships_from_names(selection: &Selection) -> Vec<(usize, Vec<&str>)> {
    let mut keys: HashMap<String, Option<&str>> = HashMap::new();
    for r in &selection.roster {
        let Some(key) = name_key(&r.name) else {
            continue;
        };
        keys.entry(key)
            .and_modify(|slot| {
                if *slot != Some(r.id.as_str()) {
                    *slot = None;
                }
            })
            .or_insert(Some(r.id.as_str()));
    }
    let ambiguous = keys.values().filter(|v| v.is_none()).count();
    if ambiguous > 0 {
        debug!(ambiguous, "Ignoring roster name keys shared by several members");
    }

    let mut out = Vec::new();
    for (idx, publication) in selection.publications.iter().enumerate() {
        let names: Vec<&str> = if publication.authors_text.trim().is_empty() {
            publication
                .authorships
                .iter()
                .map(|a| a.author_name.as_str())
                .filter(|n| !n.trim().is_empty())
                .collect()
        } else {
            split_author_list(&publication.authors_text)
        };

        let mut ids: Vec<&str> = Vec::new();
        for name in names {
            if let Some(Some(id)) = name_key(name).and_then(|k| keys.get(&k).copied()) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        if ids.len() >= 2 {
            out.push((idx, ids));
        }
    }
    out
}
