// Coordinate-keyed neighbor index over lattice nodes.
//
// Nodes live in an arena (`Vec<LatticeNode>` inside `Lattice`), addressed by
// `NodeId`. This index maps each coordinate vector to its `NodeId`, so a
// neighbor query builds the 2d candidate vectors (one step down and one step
// up on each axis) and resolves each with a single hash lookup. Query cost is
// O(d), independent of lattice size; nothing here scans the node list.
//
// Adjacency itself is never stored: two nodes are adjacent iff their
// coordinates differ by exactly 1 on exactly one axis.

use crate::basis::Monzo;
use crate::lattice::{LatticeNode, NodeId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Neighbor list; an interior node of a 4-axis lattice fits inline.
pub type Neighbors = SmallVec<[NodeId; 8]>;

#[derive(Clone, Debug, Default)]
pub struct AdjacencyIndex {
    by_coords: FxHashMap<Monzo, NodeId>,
}

impl AdjacencyIndex {
    pub fn build(nodes: &[LatticeNode]) -> Self {
        let mut by_coords = FxHashMap::default();
        by_coords.reserve(nodes.len());
        for node in nodes {
            by_coords.insert(node.coords.clone(), node.id);
        }
        AdjacencyIndex { by_coords }
    }

    pub fn get(&self, coords: &Monzo) -> Option<NodeId> {
        self.by_coords.get(coords).copied()
    }

    pub fn len(&self) -> usize {
        self.by_coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_coords.is_empty()
    }

    /// Every indexed node one unit step from `coords` along a single axis.
    ///
    /// Order is axis by axis, the `-1` neighbor before the `+1` neighbor.
    /// Boundary nodes simply have fewer entries.
    pub fn neighbors(&self, coords: &Monzo) -> Neighbors {
        let mut out = Neighbors::new();
        let mut probe = coords.clone();
        for axis in 0..coords.len() {
            let base = coords.0[axis];
            for delta in [-1, 1] {
                probe.0[axis] = base + delta;
                if let Some(id) = self.get(&probe) {
                    out.push(id);
                }
            }
            probe.0[axis] = base;
        }
        out
    }
}
