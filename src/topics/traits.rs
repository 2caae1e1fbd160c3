// Dimension reducer trait: the swap point for the embedding method.
//
// The embedder only needs "distance matrix in, 2-D coordinates out", so
// classical MDS can be replaced without touching profiles or the pipeline.

use anyhow::Result;

/// Two-dimensional coordinates plus the eigenvalue behind each axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub coords: Vec<[f64; 2]>,
    pub eigenvalues: [f64; 2],
}

pub trait DimensionReducer {
    /// Reduce a square, symmetric distance matrix to one point per row.
    fn reduce(&self, distances: &[Vec<f64>]) -> Result<Reduction>;
}
