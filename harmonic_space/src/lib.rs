// Harmonic Space Engine
//
// Represents just-intonation intervals as exponent vectors over a chosen
// prime basis, builds bounded lattices of those vectors, walks them under
// adjacency constraints, generates Combination Product Sets, searches them
// for transposed interval shapes, and projects high-dimensional lattices to
// 2-D/3-D with classical multidimensional scaling. Rendering, audio, and
// persistence live elsewhere; they consume the node lists, paths, product
// sets, and projected coordinates produced here.
//
// Architecture (leaves first):
// - error.rs: `HarmonicError`, the single error enum
// - ratio.rs: exact positive rationals in lowest terms (u128 parts)
// - factor.rs: trial-division prime factorization
// - basis.rs: prime bases, exponent vectors (`Monzo`), ratio <-> vector mapping
// - octave.rs: exact octave normalization into [1, 2)
// - lattice.rs: lattice construction, node arena, metrics, projection
// - adjacency.rs: coordinate-keyed O(1) neighbor index
// - walk.rs: seeded random walks with no-immediate-repeat policy
// - embed.rs: scale embedding and member-only connectivity
// - cps.rs: combination product sets via combinatorial-number-system unranking
// - shape.rs: transposition search of interval shapes in product sets
// - mds.rs: distance matrices and classical MDS
// - config.rs: JSON configuration for the `harmonic` binary
//
// Built lattices and product sets are immutable. The only mutable state is a
// walker's own position and its random stream, which is seeded, so every
// output is reproducible.

pub mod adjacency;
pub mod basis;
pub mod config;
pub mod cps;
pub mod embed;
pub mod error;
pub mod factor;
pub mod lattice;
pub mod mds;
pub mod octave;
pub mod ratio;
pub mod shape;
pub mod walk;

pub use error::{HarmonicError, Result};
