// Bounded prime-exponent lattices.
//
// A lattice of resolution r over a basis with d non-octave primes holds one
// node for every integer vector in [-r, r]^d, so (2r+1)^d nodes in total.
// The octave axis is factored out: each node's ratio is the product of its
// coordinates' prime powers, octave-normalized into [1, 2).
//
// Nodes are stored in an arena (`Vec<LatticeNode>`) addressed by `NodeId`
// and enumerated in lexicographic coordinate order (first axis most
// significant, each axis running -r..=r). Construction is a single iterative
// odometer over a coordinate vector sized to the basis, so any dimension is
// handled by the same code. `AdjacencyIndex` (see `adjacency.rs`) provides
// O(1) coordinate lookup and neighbor queries.
//
// A built `Lattice` is immutable; every query takes `&self`, so one lattice
// can back any number of walkers or embedders concurrently.
//
// See also: `walk.rs` (random walks), `embed.rs` (scale embedding), and
// `mds.rs`, which `project` uses to flatten lattices of more than three axes.

use crate::adjacency::{AdjacencyIndex, Neighbors};
use crate::basis::{Monzo, PrimeBasis};
use crate::error::{HarmonicError, Result};
use crate::mds::{DistanceMatrix, ProjectedCoordinates, classical_mds};
use crate::octave::normalize_ratio;
use crate::ratio::Ratio;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Arena index of a node within one lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One point of the lattice.
///
/// `ratio` and `cents` are computed once from `coords` when the lattice is
/// built; they are never set independently.
#[derive(Clone, Debug, Serialize)]
pub struct LatticeNode {
    pub id: NodeId,
    /// Exponents over the non-octave primes of the basis.
    pub coords: Monzo,
    /// Octave-normalized ratio in [1, 2), derived from `coords`.
    pub ratio: Ratio,
    /// `1200 * log2(ratio)`.
    pub cents: f64,
}

/// Basis and resolution for building a lattice.
///
/// `primes` takes precedence over `limit`; with neither set the lattice is
/// 5-limit. A prime 2 in the basis is accepted and ignored as an axis.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    pub limit: Option<u64>,
    pub primes: Option<Vec<u64>>,
    pub resolution: u32,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        LatticeConfig {
            limit: Some(5),
            primes: None,
            resolution: 2,
        }
    }
}

impl LatticeConfig {
    pub fn basis(&self) -> Result<PrimeBasis> {
        match (&self.primes, self.limit) {
            (Some(primes), _) => PrimeBasis::new(primes.clone()),
            (None, Some(limit)) => PrimeBasis::limit(limit),
            (None, None) => PrimeBasis::limit(5),
        }
    }

    pub fn build(&self) -> Result<Lattice> {
        LatticeBuilder::new(&self.basis()?, self.resolution).build()
    }
}

/// How to measure distance between lattice coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatticeMetric {
    /// Straight-line distance in exponent space.
    #[default]
    Euclidean,
    /// Number of unit steps: the shortest walk length between nodes.
    Taxicab,
    /// Taxicab with each axis weighted by log2 of its prime.
    Tenney,
}

impl LatticeMetric {
    pub fn distance(self, a: &Monzo, b: &Monzo, weights: &[f64]) -> f64 {
        let diffs = a.0.iter().zip(b.0.iter()).map(|(x, y)| (x - y) as f64);
        match self {
            LatticeMetric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            LatticeMetric::Taxicab => diffs.map(f64::abs).sum::<f64>(),
            LatticeMetric::Tenney => diffs.zip(weights).map(|(d, w)| d.abs() * w).sum::<f64>(),
        }
    }
}

/// Generates the node arena for one basis/resolution pair.
#[derive(Clone, Debug)]
pub struct LatticeBuilder {
    basis: PrimeBasis,
    resolution: u32,
}

impl LatticeBuilder {
    pub fn new(basis: &PrimeBasis, resolution: u32) -> Self {
        LatticeBuilder {
            basis: basis.clone(),
            resolution,
        }
    }

    /// Number of nodes the lattice will have, `(2r+1)^d`, if it fits `u32`.
    pub fn node_count(&self) -> Option<u32> {
        let dim = self.basis.without_octave().len() as u32;
        let side = self.resolution.checked_mul(2)?.checked_add(1)?;
        side.checked_pow(dim)
    }

    pub fn build(&self) -> Result<Lattice> {
        let axes = self.basis.without_octave();
        let count = self.node_count().ok_or(HarmonicError::Overflow {
            what: "lattice node count",
        })?;
        let r = i32::try_from(self.resolution).map_err(|_| HarmonicError::Overflow {
            what: "lattice resolution",
        })?;

        let mut nodes = Vec::with_capacity(count as usize);
        let mut coords = Monzo(SmallVec::from_elem(-r, axes.len()));
        for id in 0..count {
            let ratio = normalize_ratio(&axes.vector_to_ratio(&coords)?)?;
            nodes.push(LatticeNode {
                id: NodeId(id),
                coords: coords.clone(),
                ratio,
                cents: ratio.cents(),
            });
            advance(&mut coords, r);
        }

        let index = AdjacencyIndex::build(&nodes);
        tracing::debug!(
            basis = %self.basis,
            resolution = self.resolution,
            nodes = nodes.len(),
            "built lattice"
        );
        Ok(Lattice {
            basis: self.basis.with_octave(),
            axes,
            resolution: self.resolution,
            nodes,
            index,
        })
    }
}

/// Odometer step: increment the last axis, carrying into earlier ones.
fn advance(coords: &mut Monzo, r: i32) {
    for axis in (0..coords.len()).rev() {
        if coords.0[axis] < r {
            coords.0[axis] += 1;
            return;
        }
        coords.0[axis] = -r;
    }
}

/// An immutable, finite harmonic lattice.
#[derive(Clone, Debug)]
pub struct Lattice {
    /// Full basis including the octave axis.
    basis: PrimeBasis,
    /// Lattice axes: the basis without prime 2.
    axes: PrimeBasis,
    resolution: u32,
    nodes: Vec<LatticeNode>,
    index: AdjacencyIndex,
}

impl Lattice {
    pub fn basis(&self) -> &PrimeBasis {
        &self.basis
    }

    pub fn axes(&self) -> &PrimeBasis {
        &self.axes
    }

    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in enumeration order.
    pub fn nodes(&self) -> &[LatticeNode] {
        &self.nodes
    }

    /// Panics if `id` came from a different lattice that is larger.
    pub fn node(&self, id: NodeId) -> &LatticeNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&LatticeNode> {
        self.nodes.get(id.index())
    }

    pub fn find(&self, coords: &Monzo) -> Option<NodeId> {
        self.index.get(coords)
    }

    /// Like `find`, but a miss is a `CoordinateOutOfLattice` error.
    pub fn require(&self, coords: &Monzo) -> Result<NodeId> {
        self.find(coords)
            .ok_or_else(|| HarmonicError::CoordinateOutOfLattice {
                coords: coords.to_string(),
                resolution: self.resolution,
            })
    }

    /// The node at the all-zero coordinate (ratio 1/1).
    pub fn origin(&self) -> NodeId {
        // The center of an odometer over [-r, r]^d is always index count/2.
        NodeId((self.nodes.len() / 2) as u32)
    }

    /// Lattice coordinates of a ratio, dropping its prime-2 exponent.
    pub fn coords_of(&self, ratio: &Ratio) -> Result<Monzo> {
        self.axes.monzo_of(&ratio.odd_part())
    }

    /// The node a ratio lands on, if it is within resolution.
    pub fn node_for_ratio(&self, ratio: &Ratio) -> Result<Option<NodeId>> {
        Ok(self.find(&self.coords_of(ratio)?))
    }

    pub fn neighbors(&self, id: NodeId) -> Neighbors {
        self.index.neighbors(&self.node(id).coords)
    }

    pub fn neighbors_of(&self, coords: &Monzo) -> Neighbors {
        self.index.neighbors(coords)
    }

    pub fn are_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.node(a).coords.is_adjacent(&self.node(b).coords)
    }

    /// Per-axis log2(prime), the Tenney metric weights.
    pub fn axis_weights(&self) -> Vec<f64> {
        self.axes.primes().iter().map(|&p| (p as f64).log2()).collect()
    }

    /// Pairwise distances between every node, in enumeration order.
    pub fn distance_matrix(&self, metric: LatticeMetric) -> Result<DistanceMatrix> {
        let weights = self.axis_weights();
        DistanceMatrix::from_fn(self.len(), |i, j| {
            metric.distance(&self.nodes[i].coords, &self.nodes[j].coords, &weights)
        })
    }

    /// Lay the lattice out in `target_dim` dimensions for display.
    ///
    /// Lattices with no more axes than `target_dim` use their own coordinates
    /// (Tenney-weighted under that metric), padded with zeros. Larger ones go
    /// through classical MDS over `metric` distances. A resolution-0 lattice
    /// is its origin alone and always projects to the zero point.
    pub fn project(
        &self,
        target_dim: usize,
        metric: LatticeMetric,
    ) -> Result<ProjectedCoordinates> {
        if target_dim == 0 {
            return Err(HarmonicError::invalid("projection dimension", target_dim));
        }
        // MDS needs more points than output axes; only r = 0 falls short.
        if self.len() <= target_dim {
            return Ok(ProjectedCoordinates {
                dimension: target_dim,
                points: vec![vec![0.0; target_dim]; self.len()],
                eigenvalues: Vec::new(),
            });
        }
        if self.dimension() <= target_dim {
            let weights = match metric {
                LatticeMetric::Tenney => self.axis_weights(),
                _ => vec![1.0; self.dimension()],
            };
            let points = self
                .nodes
                .iter()
                .map(|node| {
                    let mut p: Vec<f64> = node
                        .coords
                        .0
                        .iter()
                        .zip(&weights)
                        .map(|(&c, w)| c as f64 * w)
                        .collect();
                    p.resize(target_dim, 0.0);
                    p
                })
                .collect();
            return Ok(ProjectedCoordinates {
                dimension: target_dim,
                points,
                eigenvalues: Vec::new(),
            });
        }
        classical_mds(&self.distance_matrix(metric)?, target_dim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice(limit: u64, r: u32) -> Lattice {
        LatticeBuilder::new(&PrimeBasis::limit(limit).unwrap(), r)
            .build()
            .unwrap()
    }

    #[test]
    fn node_count_is_side_to_the_dimension() {
        assert_eq!(lattice(5, 2).len(), 25);
        assert_eq!(lattice(7, 1).len(), 27);
        assert_eq!(lattice(5, 0).len(), 1);
        assert_eq!(lattice(2, 3).len(), 1);
    }

    #[test]
    fn enumeration_is_lexicographic() {
        let l = lattice(5, 1);
        let coords: Vec<&[i32]> = l.nodes().iter().map(|n| n.coords.as_slice()).collect();
        assert_eq!(coords[0], &[-1, -1]);
        assert_eq!(coords[1], &[-1, 0]);
        assert_eq!(coords[2], &[-1, 1]);
        assert_eq!(coords[3], &[0, -1]);
        assert_eq!(coords[8], &[1, 1]);
    }

    #[test]
    fn origin_is_unison() {
        for (limit, r) in [(5, 1), (5, 3), (7, 2), (11, 1)] {
            let l = lattice(limit, r);
            let origin = l.node(l.origin());
            assert_eq!(origin.coords.max_abs(), 0);
            assert_eq!(origin.ratio, Ratio::UNISON);
        }
    }

    #[test]
    fn node_ratios_are_octave_reduced() {
        let l = lattice(5, 1);
        let fifth = l.find(&Monzo::from_slice(&[1, 0])).unwrap();
        assert_eq!(l.node(fifth).ratio, Ratio::new(3, 2).unwrap());
        let minor_sixth = l.find(&Monzo::from_slice(&[0, -1])).unwrap();
        assert_eq!(l.node(minor_sixth).ratio, Ratio::new(8, 5).unwrap());
        for node in l.nodes() {
            assert!((0.0..1200.0).contains(&node.cents));
        }
    }

    #[test]
    fn interior_and_boundary_neighbors() {
        let l = lattice(7, 1);
        assert_eq!(l.neighbors(l.origin()).len(), 6);
        let corner = l.find(&Monzo::from_slice(&[1, 1, 1])).unwrap();
        assert_eq!(l.neighbors(corner).len(), 3);
        let edge = l.find(&Monzo::from_slice(&[1, 0, 0])).unwrap();
        assert_eq!(l.neighbors(edge).len(), 5);
        for n in l.neighbors(edge) {
            assert!(l.are_adjacent(edge, n));
        }
    }

    #[test]
    fn strict_lookup_reports_out_of_lattice() {
        let l = lattice(5, 1);
        let err = l.require(&Monzo::from_slice(&[2, 0])).unwrap_err();
        assert!(matches!(
            err,
            HarmonicError::CoordinateOutOfLattice { resolution: 1, .. }
        ));
    }

    #[test]
    fn ratio_lookup_ignores_octaves() {
        let l = lattice(5, 2);
        let a = l.node_for_ratio(&Ratio::new(3, 2).unwrap()).unwrap();
        let b = l.node_for_ratio(&Ratio::new(3, 1).unwrap()).unwrap();
        assert_eq!(a, b);
        assert!(a.is_some());
        assert!(l.node_for_ratio(&Ratio::new(7, 4).unwrap()).is_err());
    }

    #[test]
    fn config_defaults_to_five_limit() {
        let l = LatticeConfig::default().build().unwrap();
        assert_eq!(l.axes().primes(), &[3, 5]);
        assert_eq!(l.len(), 25);

        let cfg: LatticeConfig =
            serde_json::from_str(r#"{"primes": [3, 7], "resolution": 1}"#).unwrap();
        assert_eq!(cfg.build().unwrap().basis().primes(), &[2, 3, 7]);
    }

    #[test]
    fn metrics_agree_on_unit_steps() {
        let a = Monzo::from_slice(&[0, 0]);
        let b = Monzo::from_slice(&[1, -1]);
        let w = [3f64.log2(), 5f64.log2()];
        assert!((LatticeMetric::Euclidean.distance(&a, &b, &w) - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(LatticeMetric::Taxicab.distance(&a, &b, &w), 2.0);
        assert!((LatticeMetric::Tenney.distance(&a, &b, &w) - 15f64.log2()).abs() < 1e-12);
    }

    #[test]
    fn low_dimensional_projection_keeps_coordinates() {
        let l = lattice(5, 1);
        let p = l.project(3, LatticeMetric::Euclidean).unwrap();
        assert_eq!(p.points[0], vec![-1.0, -1.0, 0.0]);
        assert!(p.eigenvalues.is_empty());
    }

    #[test]
    fn resolution_zero_projects_to_origin() {
        let l = lattice(11, 0);
        assert_eq!(l.len(), 1);
        let p = l.project(2, LatticeMetric::Euclidean).unwrap();
        assert_eq!(p.points, vec![vec![0.0, 0.0]]);
        let p = l.project(3, LatticeMetric::Tenney).unwrap();
        assert_eq!(p.points, vec![vec![0.0, 0.0, 0.0]]);
    }

    #[test]
    fn neighbors_by_coords_match_neighbors_by_id() {
        let l = lattice(7, 2);
        for node in l.nodes().iter().step_by(7) {
            assert_eq!(l.neighbors_of(&node.coords), l.neighbors(node.id));
        }
        // Coordinates just outside the lattice still see their inside neighbor.
        let outside = Monzo::from_slice(&[3, 0, 0]);
        let inside = l.find(&Monzo::from_slice(&[2, 0, 0])).unwrap();
        assert_eq!(l.neighbors_of(&outside).as_slice(), &[inside]);
    }

    #[test]
    fn high_dimensional_projection_uses_mds() {
        let l = lattice(11, 1);
        assert_eq!(l.dimension(), 4);
        let p = l.project(2, LatticeMetric::Euclidean).unwrap();
        assert_eq!(p.len(), 81);
        assert_eq!(p.dimension, 2);
        assert_eq!(p.eigenvalues.len(), 2);
    }
}
