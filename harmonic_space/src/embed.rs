// Embedding scales into a lattice.
//
// Each ratio of a scale is mapped to lattice coordinates (its prime-2
// exponent dropped) and looked up. Ratios beyond the lattice resolution are
// collected as not embeddable; ratios with primes outside the basis are an
// error, as everywhere else.
//
// Connectivity is judged on the embedded subgraph alone: two members are
// linked only when they are directly adjacent to each other. A path that
// would pass through a lattice node outside the scale does not count. An
// embedding with no resolved nodes is not connected.

use crate::error::{HarmonicError, Result};
use crate::lattice::{Lattice, NodeId};
use crate::ratio::Ratio;
use rustc_hash::FxHashSet;
use serde::Serialize;

/// One scale ratio and the node it landed on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmbeddedRatio {
    pub ratio: Ratio,
    pub node: NodeId,
}

#[derive(Clone, Debug, Serialize)]
pub struct Embedding {
    /// Embedded ratios in input order.
    pub members: Vec<EmbeddedRatio>,
    /// Distinct nodes hit, in first-seen order.
    pub nodes: Vec<NodeId>,
    /// Ratios whose coordinates fall outside the lattice.
    pub not_embeddable: Vec<Ratio>,
    pub connected: bool,
}

pub struct ScaleEmbedder<'a> {
    lattice: &'a Lattice,
}

impl<'a> ScaleEmbedder<'a> {
    pub fn new(lattice: &'a Lattice) -> Self {
        ScaleEmbedder { lattice }
    }

    /// Embed what fits and report the rest in `not_embeddable`.
    pub fn embed(&self, ratios: &[Ratio]) -> Result<Embedding> {
        let mut members = Vec::with_capacity(ratios.len());
        let mut not_embeddable = Vec::new();
        let mut nodes = Vec::new();
        let mut seen = FxHashSet::default();

        for ratio in ratios {
            match self.lattice.node_for_ratio(ratio)? {
                Some(node) => {
                    members.push(EmbeddedRatio {
                        ratio: *ratio,
                        node,
                    });
                    if seen.insert(node) {
                        nodes.push(node);
                    }
                }
                None => not_embeddable.push(*ratio),
            }
        }

        let connected = is_connected(self.lattice, &nodes);
        tracing::debug!(
            embedded = nodes.len(),
            missing = not_embeddable.len(),
            connected,
            "embedded scale"
        );
        Ok(Embedding {
            members,
            nodes,
            not_embeddable,
            connected,
        })
    }

    /// Embed every ratio or fail with `NotEmbeddable` on the first miss.
    pub fn embed_strict(&self, ratios: &[Ratio]) -> Result<Embedding> {
        let embedding = self.embed(ratios)?;
        match embedding.not_embeddable.first() {
            Some(ratio) => Err(HarmonicError::NotEmbeddable {
                ratio: ratio.to_string(),
            }),
            None => Ok(embedding),
        }
    }
}

/// Whether `nodes` form one component under direct adjacency among themselves.
pub fn is_connected(lattice: &Lattice, nodes: &[NodeId]) -> bool {
    let Some(&start) = nodes.first() else {
        return false;
    };
    let members: FxHashSet<NodeId> = nodes.iter().copied().collect();
    let mut reached = FxHashSet::default();
    reached.insert(start);
    let mut frontier = vec![start];
    while let Some(node) = frontier.pop() {
        for next in lattice.neighbors(node) {
            if members.contains(&next) && reached.insert(next) {
                frontier.push(next);
            }
        }
    }
    reached.len() == members.len()
}
