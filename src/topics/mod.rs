// Topic similarity: per-author topic sets, Jaccard distances, and a 2-D
// embedding of the cohort.

pub mod jaccard;
pub mod mds;
pub mod profile;
pub mod traits;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::filter::Selection;
use jaccard::distance_matrix;
use profile::build_profiles;
use traits::DimensionReducer;

/// One cohort member placed in topic space.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddedAuthor {
    pub id: String,
    pub name: String,
    pub topic_count: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embedding {
    pub points: Vec<EmbeddedAuthor>,
    /// Eigenvalues behind the two axes; zeros mean a collapsed layout
    pub eigenvalues: [f64; 2],
}

/// Result of the topic stage. Too few authors is a normal outcome.
#[derive(Debug, Clone, Serialize)]
pub enum TopicEmbedding {
    Embedded(Embedding),
    InsufficientData { authors: usize },
}

impl TopicEmbedding {
    pub fn embedding(&self) -> Option<&Embedding> {
        match self {
            TopicEmbedding::Embedded(e) => Some(e),
            TopicEmbedding::InsufficientData { .. } => None,
        }
    }
}

/// Embed the selection's contributing roster by topic similarity.
pub fn embed(selection: &Selection, reducer: &dyn DimensionReducer) -> Result<TopicEmbedding> {
    let profiles = build_profiles(selection);
    if profiles.len() < 2 {
        info!(authors = profiles.len(), "Too few topic-bearing authors to embed");
        return Ok(TopicEmbedding::InsufficientData {
            authors: profiles.len(),
        });
    }

    let distances = distance_matrix(&profiles);
    let reduction = reducer.reduce(&distances)?;

    let points = profiles
        .into_iter()
        .zip(reduction.coords)
        .map(|(p, [x, y])| EmbeddedAuthor {
            topic_count: p.topics.len(),
            id: p.id,
            name: p.name,
            x,
            y,
        })
        .collect::<Vec<_>>();

    info!(
        authors = points.len(),
        lambda1 = reduction.eigenvalues[0],
        lambda2 = reduction.eigenvalues[1],
        "Embedded topic profiles"
    );

    Ok(TopicEmbedding::Embedded(Embedding {
        points,
        eigenvalues: reduction.eigenvalues,
    }))
}
