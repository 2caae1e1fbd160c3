// Classical multidimensional scaling by power iteration.
//
// Square the distances, double-center them into B = -1/2 * J * D^2 * J with
// J = I - (1/N) * 11^T, then pull the two dominant eigenpairs out of B by
// power iteration with deflation in between. Axis k of point i is
// sqrt(max(lambda_k, 0)) * v_k[i].
//
// The start vector is drawn from a seeded RNG so identical inputs always
// produce identical coordinates.

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::traits::{DimensionReducer, Reduction};

pub const DEFAULT_ITERATIONS: usize = 150;
pub const DEFAULT_SEED: u64 = 42;

/// Eigenvalues below this are treated as zero.
const EIGEN_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct ClassicalMds {
    pub iterations: usize,
    pub seed: u64,
}

impl Default for ClassicalMds {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}

impl ClassicalMds {
    pub fn new(iterations: usize, seed: u64) -> Self {
        Self { iterations, seed }
    }
}

impl DimensionReducer for ClassicalMds {
    fn reduce(&self, distances: &[Vec<f64>]) -> Result<Reduction> {
        let n = distances.len();
        if let Some(row) = distances.iter().find(|row| row.len() != n) {
            bail!(
                "Distance matrix must be square: {} rows but a row of length {}",
                n,
                row.len()
            );
        }
        if n == 0 {
            return Ok(Reduction {
                coords: Vec::new(),
                eigenvalues: [0.0, 0.0],
            });
        }

        let mut b = double_center(distances);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let (l1, v1) = power_iteration(&b, self.iterations, &mut rng);
        deflate(&mut b, l1, &v1);
        let (l2, v2) = power_iteration(&b, self.iterations, &mut rng);

        let eigenvalues = [clamp_eigen(l1), clamp_eigen(l2)];
        let scale = [eigenvalues[0].sqrt(), eigenvalues[1].sqrt()];
        let coords = (0..n)
            .map(|i| [scale[0] * v1[i], scale[1] * v2[i]])
            .collect();

        debug!(
            points = n,
            lambda1 = eigenvalues[0],
            lambda2 = eigenvalues[1],
            "Classical MDS complete"
        );

        Ok(Reduction {
            coords,
            eigenvalues,
        })
    }
}

fn clamp_eigen(lambda: f64) -> f64 {
    if lambda.is_finite() && lambda >= EIGEN_EPSILON {
        lambda
    } else {
        0.0
    }
}

/// B = -1/2 * J * D^2 * J
pub fn double_center(distances: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = distances.len();
    let sq: Vec<Vec<f64>> = distances
        .iter()
        .map(|row| row.iter().map(|d| d * d).collect())
        .collect();

    let row_means: Vec<f64> = sq.iter().map(|row| row.iter().sum::<f64>() / n as f64).collect();
    let col_means: Vec<f64> = (0..n)
        .map(|j| sq.iter().map(|row| row[j]).sum::<f64>() / n as f64)
        .collect();
    let grand_mean = row_means.iter().sum::<f64>() / n as f64;

    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| -0.5 * (sq[i][j] - row_means[i] - col_means[j] + grand_mean))
                .collect()
        })
        .collect()
}

fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter()
        .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
        .collect()
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Dominant eigenpair of a symmetric matrix: (Rayleigh quotient, unit vector).
pub fn power_iteration(m: &[Vec<f64>], iterations: usize, rng: &mut StdRng) -> (f64, Vec<f64>) {
    let n = m.len();
    let mut v: Vec<f64> = (0..n).map(|_| rng.random_range(-1.0..1.0)).collect();
    let start_norm = norm(&v);
    if start_norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= start_norm);
    } else {
        v = vec![0.0; n];
        v[0] = 1.0;
    }

    for _ in 0..iterations {
        let w = mat_vec(m, &v);
        let w_norm = norm(&w);
        // Null direction: v stays a unit vector and the eigenvalue is zero.
        if w_norm < f64::EPSILON {
            break;
        }
        v = w.into_iter().map(|x| x / w_norm).collect();
    }

    let mv = mat_vec(m, &v);
    let lambda: f64 = v.iter().zip(&mv).map(|(a, b)| a * b).sum();
    (lambda, v)
}

/// B <- B - lambda * v * v^T
fn deflate(m: &mut [Vec<f64>], lambda: f64, v: &[f64]) {
    for (i, row) in m.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell -= lambda * v[i] * v[j];
        }
    }
}
