// Data-driven engine configuration.
//
// Everything the `harmonic` binary needs to build lattices, walks, product
// sets, shape searches, and projections comes from one `EngineConfig`,
// loaded from JSON. Every field has a default, so a config file only has to
// name what it changes; `{}` is a valid config describing a 5-limit lattice
// of resolution 2 and the {1,3,5,7} hexany.
//
// The library itself never reads files; only `EngineConfig::load` touches
// the filesystem.

use crate::error::Result;
use crate::lattice::{LatticeConfig, LatticeMetric};
use crate::ratio::Ratio;
use crate::shape::{DEFAULT_EPSILON, Shape, ShapeMatcher};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    pub seed: u64,
    pub steps: usize,
    /// Exclude the node just left when another neighbor is available.
    pub no_repeat: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            seed: 0,
            steps: 16,
            no_repeat: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CpsConfig {
    pub factors: Vec<u64>,
    pub k: usize,
}

impl Default for CpsConfig {
    fn default() -> Self {
        CpsConfig {
            factors: vec![1, 3, 5, 7],
            k: 2,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    /// Intervals above the root, as "p/q" strings.
    pub intervals: Vec<Ratio>,
    pub epsilon: f64,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        ShapeConfig {
            intervals: vec![Ratio::UNISON, Ratio::new_const(5, 4), Ratio::new_const(3, 2)],
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl ShapeConfig {
    pub fn shape(&self) -> Shape {
        Shape::from_ratios(&self.intervals)
    }

    pub fn matcher(&self) -> Result<ShapeMatcher> {
        ShapeMatcher::new(self.epsilon)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub target_dim: usize,
    pub metric: LatticeMetric,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            target_dim: 2,
            metric: LatticeMetric::Euclidean,
        }
    }
}

/// Complete configuration for one engine session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lattice: LatticeConfig,
    pub walk: WalkConfig,
    pub cps: CpsConfig,
    pub shape: ShapeConfig,
    pub projection: ProjectionConfig,
}

impl EngineConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}
