// Error type shared by every component of the engine.
//
// Malformed inputs fail fast with a named variant; nothing is silently
// coerced or dropped. Numerical degeneracies inside MDS are normally clipped
// and logged instead (see `mds.rs`), so `DegenerateDistanceMatrix` only
// surfaces when the caller opts into strict mode.

use thiserror::Error;

/// Everything that can go wrong while building or querying harmonic space.
#[derive(Debug, Error)]
pub enum HarmonicError {
    /// A non-positive integer, malformed ratio, or otherwise invalid argument.
    #[error("invalid input for {what}: {value}")]
    InvalidInput { what: &'static str, value: String },

    /// The ratio contains a prime the configured basis has no axis for.
    #[error("ratio {ratio} has prime factor {prime} outside the basis")]
    UnsupportedPrimeFactor { prime: u128, ratio: String },

    /// A coordinate exceeds the lattice resolution on some axis.
    #[error("coordinate {coords} lies outside lattice of resolution {resolution}")]
    CoordinateOutOfLattice { coords: String, resolution: u32 },

    /// A walk origin or walker position that is not a lattice node.
    #[error("no lattice node at {coords}")]
    NodeNotFound { coords: String },

    /// The walk cannot continue: the current node has no neighbors.
    #[error("node {coords} has no neighbors")]
    IsolatedNode { coords: String },

    /// A scale ratio whose coordinate falls outside the lattice.
    #[error("ratio {ratio} cannot be embedded in the lattice")]
    NotEmbeddable { ratio: String },

    /// Subset size `k` is outside `[1, n]`.
    #[error("invalid combination parameters: k = {k} with n = {n} factors")]
    InvalidCombinationParameters { n: usize, k: usize },

    /// Strict-mode MDS found a negative eigenvalue beyond tolerance.
    #[error("degenerate distance matrix: eigenvalue {eigenvalue} below -{tolerance}")]
    DegenerateDistanceMatrix { eigenvalue: f64, tolerance: f64 },

    /// Exact integer arithmetic left the representable range.
    #[error("arithmetic overflow while computing {what}")]
    Overflow { what: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HarmonicError {
    pub(crate) fn invalid(what: &'static str, value: impl ToString) -> Self {
        HarmonicError::InvalidInput {
            what,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarmonicError>;
