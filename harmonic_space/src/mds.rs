// Classical (Torgerson) multidimensional scaling.
//
// Projects n points, known only through their pairwise distances, into a
// target dimension t:
//
//   1. square every distance;
//   2. double-center: B[i][j] = -0.5 * (D²[i][j] - rowMean[i] - colMean[j] + grandMean);
//   3. eigendecompose the symmetric B and sort eigenpairs by eigenvalue, descending;
//   4. coordinate of point i on axis a = eigvec_a[i] * sqrt(max(0, eigval_a)).
//
// A distance matrix that is exactly Euclidean-embeddable in t dimensions is
// reproduced exactly (up to rotation, reflection, and translation). Anything
// else produces negative eigenvalues; by default those are clipped to zero
// and logged, and the projection only approximates the input distances.
// `MdsOptions::strict` turns a significant negative eigenvalue into
// `DegenerateDistanceMatrix` instead.
//
// Pure functions, no retained state. Cost is dominated by the O(n³)
// eigendecomposition (nalgebra `SymmetricEigen`).

use crate::error::{HarmonicError, Result};
use nalgebra::{DMatrix, SymmetricEigen};
use serde::Serialize;

/// Symmetric, non-negative n×n distances with a zero diagonal.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    /// Row-major, `n * n` entries.
    data: Vec<f64>,
}

/// Absolute slack allowed for asymmetry and a nonzero diagonal.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

impl DistanceMatrix {
    /// Validate a square table of distances.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(HarmonicError::invalid(
                    "distance matrix row length",
                    format!("row {i} has {} entries, expected {n}", row.len()),
                ));
            }
            data.extend(row);
        }
        let matrix = DistanceMatrix { n, data };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Build from a distance function evaluated on every ordered pair.
    pub fn from_fn(n: usize, mut dist: impl FnMut(usize, usize) -> f64) -> Result<Self> {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                data[i * n + j] = if i == j { 0.0 } else { dist(i, j) };
            }
        }
        let matrix = DistanceMatrix { n, data };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Euclidean distances between points of equal dimension.
    pub fn from_points(points: &[Vec<f64>]) -> Result<Self> {
        if let Some(first) = points.first() {
            if let Some(bad) = points.iter().find(|p| p.len() != first.len()) {
                return Err(HarmonicError::invalid(
                    "point dimension",
                    format!("{} vs {}", bad.len(), first.len()),
                ));
            }
        }
        Self::from_fn(points.len(), |i, j| euclidean(&points[i], &points[j]))
    }

    fn validate(&self) -> Result<()> {
        let n = self.n;
        for i in 0..n {
            if self.get(i, i).abs() > SYMMETRY_TOLERANCE {
                return Err(HarmonicError::invalid(
                    "distance matrix diagonal",
                    format!("d[{i}][{i}] = {}", self.get(i, i)),
                ));
            }
            for j in 0..n {
                let d = self.get(i, j);
                if !d.is_finite() || d < 0.0 {
                    return Err(HarmonicError::invalid(
                        "distance",
                        format!("d[{i}][{j}] = {d}"),
                    ));
                }
                if (d - self.get(j, i)).abs() > SYMMETRY_TOLERANCE {
                    return Err(HarmonicError::invalid(
                        "distance matrix symmetry",
                        format!("d[{i}][{j}] = {d}, d[{j}][{i}] = {}", self.get(j, i)),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }
}

/// Knobs for degenerate-input handling.
#[derive(Clone, Copy, Debug)]
pub struct MdsOptions {
    /// Fail on significant negative eigenvalues instead of clipping them.
    pub strict: bool,
    /// Negative eigenvalues smaller than `tolerance * max|λ|` in magnitude
    /// count as numerical noise.
    pub tolerance: f64,
}

impl Default for MdsOptions {
    fn default() -> Self {
        MdsOptions {
            strict: false,
            tolerance: 1e-9,
        }
    }
}

/// n points in `dimension`-space produced by MDS.
#[derive(Clone, Debug, Serialize)]
pub struct ProjectedCoordinates {
    pub dimension: usize,
    pub points: Vec<Vec<f64>>,
    /// The eigenvalue behind each output axis, before clipping.
    pub eigenvalues: Vec<f64>,
}

impl ProjectedCoordinates {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn distance(&self, i: usize, j: usize) -> f64 {
        euclidean(&self.points[i], &self.points[j])
    }

    /// Kruskal stress-1 of the projection against the original distances.
    /// 0 is a perfect fit.
    pub fn stress(&self, original: &DistanceMatrix) -> f64 {
        let mut residual = 0.0;
        let mut total = 0.0;
        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                let d = original.get(i, j);
                residual += (d - self.distance(i, j)).powi(2);
                total += d * d;
            }
        }
        if total == 0.0 {
            0.0
        } else {
            (residual / total).sqrt()
        }
    }
}

/// Classical MDS with default (clipping) options.
pub fn classical_mds(
    distances: &DistanceMatrix,
    target_dim: usize,
) -> Result<ProjectedCoordinates> {
    classical_mds_with(distances, target_dim, &MdsOptions::default())
}

pub fn classical_mds_with(
    distances: &DistanceMatrix,
    target_dim: usize,
    options: &MdsOptions,
) -> Result<ProjectedCoordinates> {
    let n = distances.len();
    if target_dim == 0 || target_dim >= n.max(1) {
        return Err(HarmonicError::invalid(
            "MDS target dimension",
            format!("{target_dim} for {n} points"),
        ));
    }

    let squared = DMatrix::from_fn(n, n, |i, j| distances.get(i, j).powi(2));
    let row_means: Vec<f64> = (0..n).map(|i| squared.row(i).sum() / n as f64).collect();
    let col_means: Vec<f64> = (0..n).map(|j| squared.column(j).sum() / n as f64).collect();
    let grand_mean = squared.sum() / (n * n) as f64;

    let centered = DMatrix::from_fn(n, n, |i, j| {
        -0.5 * (squared[(i, j)] - row_means[i] - col_means[j] + grand_mean)
    });

    let eigen = SymmetricEigen::new(centered);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let max_abs = eigen
        .eigenvalues
        .iter()
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    let floor = options.tolerance * max_abs;
    let most_negative = eigen.eigenvalues.iter().copied().fold(0.0f64, f64::min);
    if most_negative < -floor {
        if options.strict {
            return Err(HarmonicError::DegenerateDistanceMatrix {
                eigenvalue: most_negative,
                tolerance: floor,
            });
        }
        tracing::warn!(
            eigenvalue = most_negative,
            "distance matrix is not Euclidean; clipping negative eigenvalues"
        );
    }

    let axes = &order[..target_dim];
    let scales: Vec<f64> = axes
        .iter()
        .map(|&a| eigen.eigenvalues[a].max(0.0).sqrt())
        .collect();
    let points = (0..n)
        .map(|i| {
            axes.iter()
                .zip(&scales)
                .map(|(&a, &s)| eigen.eigenvectors[(i, a)] * s)
                .collect()
        })
        .collect();

    tracing::debug!(points = n, target_dim, "projected distance matrix");
    Ok(ProjectedCoordinates {
        dimension: target_dim,
        points,
        eigenvalues: axes.iter().map(|&a| eigen.eigenvalues[a]).collect(),
    })
}

pub(crate) fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Graph distances of a 4-cycle: not embeddable in any Euclidean space.
    fn four_cycle() -> DistanceMatrix {
        DistanceMatrix::new(vec![
            vec![0.0, 1.0, 2.0, 1.0],
            vec![1.0, 0.0, 1.0, 2.0],
            vec![2.0, 1.0, 0.0, 1.0],
            vec![1.0, 2.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn planar_points_reproduced() {
        let points = vec![
            vec![0.0, 0.0],
            vec![3.0, 0.0],
            vec![0.0, 4.0],
            vec![-1.5, 2.5],
            vec![2.0, -1.0],
        ];
        let d = DistanceMatrix::from_points(&points).unwrap();
        let proj = classical_mds(&d, 2).unwrap();
        for i in 0..points.len() {
            for j in 0..points.len() {
                assert!(
                    (proj.distance(i, j) - d.get(i, j)).abs() < 1e-6,
                    "pair ({i}, {j})"
                );
            }
        }
        assert!(proj.stress(&d) < 1e-9);
        assert!(proj.eigenvalues[0] >= proj.eigenvalues[1]);
    }

    #[test]
    fn collinear_points_need_one_axis() {
        let points = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![3.0, 3.0]];
        let d = DistanceMatrix::from_points(&points).unwrap();
        let proj = classical_mds(&d, 1).unwrap();
        assert!((proj.distance(0, 2) - d.get(0, 2)).abs() < 1e-9);
    }

    #[test]
    fn non_euclidean_input_is_clipped_by_default() {
        let d = four_cycle();
        let proj = classical_mds(&d, 3).unwrap();
        assert_eq!(proj.dimension, 3);
        assert!(proj.points.iter().flatten().all(|v| v.is_finite()));
        // Approximation only: the cycle's diagonals cannot both be 2.
        assert!(proj.stress(&d) > 0.0);
    }

    #[test]
    fn strict_mode_rejects_non_euclidean_input() {
        let options = MdsOptions {
            strict: true,
            ..MdsOptions::default()
        };
        let err = classical_mds_with(&four_cycle(), 2, &options).unwrap_err();
        match err {
            HarmonicError::DegenerateDistanceMatrix { eigenvalue, .. } => {
                assert!((eigenvalue + 1.0).abs() < 1e-9, "{eigenvalue}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn target_dimension_bounds() {
        let d = four_cycle();
        assert!(classical_mds(&d, 0).is_err());
        assert!(classical_mds(&d, 4).is_err());
        assert!(classical_mds(&d, 3).is_ok());
    }

    #[test]
    fn malformed_matrices_rejected() {
        assert!(DistanceMatrix::new(vec![vec![0.0, 1.0], vec![2.0, 0.0]]).is_err());
        assert!(DistanceMatrix::new(vec![vec![1.0, 1.0], vec![1.0, 0.0]]).is_err());
        assert!(DistanceMatrix::new(vec![vec![0.0, -1.0], vec![-1.0, 0.0]]).is_err());
        assert!(DistanceMatrix::new(vec![vec![0.0, 1.0]]).is_err());
        assert!(DistanceMatrix::from_points(&[vec![0.0], vec![1.0, 2.0]]).is_err());
    }
}
