// Adjacency-constrained random walks over a lattice.
//
// A `RandomWalker` borrows an immutable `Lattice` and owns only its own
// traversal state: the current node, the node it just left, and the
// no-immediate-repeat flag. Each `step` draws uniformly among the current
// node's neighbors. With no-repeat on (the default) and more than one
// neighbor available, the node just left is excluded from the draw, so walks
// do not bounce A -> B -> A. A node whose only neighbor is the previous one
// still steps back rather than stalling.
//
// Randomness comes through the `RandomSource` trait. Production walks use
// the seeded `WalkRng` from `harmonic_prng`, so equal seeds replay equal
// walks; tests can plug in scripted sources.
//
// Error conditions are named rather than looped on: an origin outside the
// lattice is `NodeNotFound`, a node with no neighbors at all is
// `IsolatedNode`.

use crate::adjacency::Neighbors;
use crate::basis::Monzo;
use crate::error::{HarmonicError, Result};
use crate::lattice::{Lattice, NodeId};
use crate::ratio::Ratio;
use harmonic_prng::WalkRng;
use serde::Serialize;

/// Uniform index source for walk steps.
pub trait RandomSource {
    /// Uniform integer in `[0, len)`. Called only with `len > 0`.
    fn pick(&mut self, len: usize) -> usize;
}

impl RandomSource for WalkRng {
    fn pick(&mut self, len: usize) -> usize {
        self.range_usize(0, len)
    }
}

/// An ordered sequence of nodes in which consecutive entries are adjacent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Path {
    nodes: Vec<NodeId>,
}

impl Path {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn coords(&self, lattice: &Lattice) -> Vec<Monzo> {
        self.nodes
            .iter()
            .map(|&id| lattice.node(id).coords.clone())
            .collect()
    }

    pub fn ratios(&self, lattice: &Lattice) -> Vec<Ratio> {
        self.nodes.iter().map(|&id| lattice.node(id).ratio).collect()
    }

    /// True when every consecutive pair is lattice-adjacent.
    pub fn is_adjacent_chain(&self, lattice: &Lattice) -> bool {
        self.nodes
            .windows(2)
            .all(|pair| lattice.are_adjacent(pair[0], pair[1]))
    }
}

pub struct RandomWalker<'a, R: RandomSource = WalkRng> {
    lattice: &'a Lattice,
    rng: R,
    current: Option<NodeId>,
    previous: Option<NodeId>,
    no_repeat: bool,
}

impl<'a> RandomWalker<'a, WalkRng> {
    /// Walker driven by a `WalkRng` seeded with `seed`.
    pub fn seeded(lattice: &'a Lattice, seed: u64) -> Self {
        RandomWalker::new(lattice, WalkRng::new(seed))
    }
}

impl<'a, R: RandomSource> RandomWalker<'a, R> {
    pub fn new(lattice: &'a Lattice, rng: R) -> Self {
        RandomWalker {
            lattice,
            rng,
            current: None,
            previous: None,
            no_repeat: true,
        }
    }

    pub fn set_no_repeat(&mut self, no_repeat: bool) {
        self.no_repeat = no_repeat;
    }

    pub fn no_repeat(&self) -> bool {
        self.no_repeat
    }

    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    /// Move to `node` and forget the previous position.
    pub fn place(&mut self, node: NodeId) -> Result<()> {
        if self.lattice.get(node).is_none() {
            return Err(HarmonicError::NodeNotFound {
                coords: node.to_string(),
            });
        }
        self.current = Some(node);
        self.previous = None;
        Ok(())
    }

    /// Move to the node at `coords`.
    pub fn place_at(&mut self, coords: &Monzo) -> Result<NodeId> {
        let node = self
            .lattice
            .find(coords)
            .ok_or_else(|| HarmonicError::NodeNotFound {
                coords: coords.to_string(),
            })?;
        self.place(node)?;
        Ok(node)
    }

    /// Take one step to a uniformly drawn neighbor.
    pub fn step(&mut self) -> Result<NodeId> {
        let current = self.current.ok_or_else(|| HarmonicError::NodeNotFound {
            coords: "<walker not placed>".to_string(),
        })?;
        let neighbors = self.lattice.neighbors(current);
        if neighbors.is_empty() {
            return Err(HarmonicError::IsolatedNode {
                coords: self.lattice.node(current).coords.to_string(),
            });
        }

        let candidates: Neighbors = match self.previous {
            Some(prev) if self.no_repeat && neighbors.len() > 1 => {
                let filtered: Neighbors =
                    neighbors.iter().copied().filter(|&n| n != prev).collect();
                if filtered.is_empty() {
                    neighbors
                } else {
                    filtered
                }
            }
            _ => neighbors,
        };

        let next = candidates[self.rng.pick(candidates.len())];
        tracing::trace!(from = %current, to = %next, choices = candidates.len(), "walk step");
        self.previous = Some(current);
        self.current = Some(next);
        Ok(next)
    }

    /// Walk `steps` steps from `origin`; the path holds `steps + 1` nodes.
    pub fn walk(&mut self, origin: &Monzo, steps: usize) -> Result<Path> {
        let start = self.place_at(origin)?;
        self.walk_from(start, steps)
    }

    pub fn walk_from(&mut self, start: NodeId, steps: usize) -> Result<Path> {
        self.place(start)?;
        let mut nodes = Vec::with_capacity(steps + 1);
        nodes.push(start);
        for _ in 0..steps {
            nodes.push(self.step()?);
        }
        Ok(Path { nodes })
    }
}
