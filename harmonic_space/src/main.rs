// Harmonic space engine: CLI entry point.
//
// Builds lattices, walks, product sets, shape searches, and projections from
// an optional JSON config plus command-line overrides, and prints the result
// as pretty JSON on stdout for visualization or playback tools to consume.
// Logs go to stderr (`RUST_LOG=debug` for construction details).
//
// Usage:
//   cargo run -p harmonic_space -- [--config FILE] [--limit P] [--resolution R]
//     [--seed N] <COMMAND>
//
// Commands: lattice, walk, cps, shape, embed, project

use clap::{Parser, Subcommand};
use harmonic_space::basis::Monzo;
use harmonic_space::config::EngineConfig;
use harmonic_space::cps::CombinationProductSet;
use harmonic_space::embed::ScaleEmbedder;
use harmonic_space::lattice::{Lattice, LatticeMetric, NodeId};
use harmonic_space::ratio::Ratio;
use harmonic_space::shape::{Shape, ShapeMatcher};
use harmonic_space::walk::RandomWalker;
use harmonic_space::{HarmonicError, Result};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(version, about = "Prime-limit lattices, CPS structures, and MDS projection")]
struct Cli {
    /// JSON config file; every field is optional.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Prime limit of the lattice basis (overrides config).
    #[arg(long)]
    limit: Option<u64>,

    /// Lattice resolution r: coordinates run over [-r, r] (overrides config).
    #[arg(long)]
    resolution: Option<u32>,

    /// Walk seed (overrides config).
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every lattice node with its ratio and cents.
    Lattice,
    /// Random walk from the origin.
    Walk {
        #[arg(long)]
        steps: Option<usize>,
        /// Allow stepping straight back to the previous node.
        #[arg(long)]
        allow_repeat: bool,
    },
    /// Combination product set members.
    Cps {
        #[arg(long, value_delimiter = ',')]
        factors: Option<Vec<u64>>,
        #[arg(long)]
        k: Option<usize>,
    },
    /// Transpositions of a shape inside the configured CPS.
    Shape {
        /// Ratios such as 1/1,5/4,3/2.
        #[arg(long, value_delimiter = ',', conflicts_with = "semitones")]
        intervals: Option<Vec<Ratio>>,
        /// 12-TET semitone counts such as 0,4,7.
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        semitones: Option<Vec<i32>>,
        #[arg(long)]
        epsilon: Option<f64>,
    },
    /// Place scale ratios on the lattice and test connectivity.
    Embed {
        #[arg(required = true)]
        ratios: Vec<Ratio>,
    },
    /// Project lattice nodes to 2-D or 3-D.
    Project {
        #[arg(long)]
        dim: Option<usize>,
        #[arg(long, value_enum)]
        metric: Option<MetricArg>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum MetricArg {
    Euclidean,
    Taxicab,
    Tenney,
}

impl From<MetricArg> for LatticeMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Euclidean => LatticeMetric::Euclidean,
            MetricArg::Taxicab => LatticeMetric::Taxicab,
            MetricArg::Tenney => LatticeMetric::Tenney,
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<serde_json::Value> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(limit) = cli.limit {
        config.lattice.limit = Some(limit);
        config.lattice.primes = None;
    }
    if let Some(r) = cli.resolution {
        config.lattice.resolution = r;
    }
    if let Some(seed) = cli.seed {
        config.walk.seed = seed;
    }

    match cli.command {
        Command::Lattice => {
            let lattice = config.lattice.build()?;
            tracing::info!(nodes = lattice.len(), dimension = lattice.dimension(), "lattice ready");
            Ok(json!({
                "basis": lattice.basis().primes(),
                "resolution": lattice.resolution(),
                "nodes": lattice.nodes(),
            }))
        }
        Command::Walk { steps, allow_repeat } => {
            let lattice = config.lattice.build()?;
            let mut walker = RandomWalker::seeded(&lattice, config.walk.seed);
            walker.set_no_repeat(config.walk.no_repeat && !allow_repeat);
            let origin = lattice.node(lattice.origin()).coords.clone();
            let path = walker.walk(&origin, steps.unwrap_or(config.walk.steps))?;
            Ok(json!({
                "seed": config.walk.seed,
                "coords": path.coords(&lattice),
                "ratios": path.ratios(&lattice),
            }))
        }
        Command::Cps { factors, k } => {
            let cps = CombinationProductSet::new(
                &factors.unwrap_or(config.cps.factors),
                k.unwrap_or(config.cps.k),
            )?;
            // Products are u128; go through to_value so an oversized one is an error.
            let set = serde_json::to_value(&cps)?;
            Ok(json!({ "name": cps.name(), "set": set }))
        }
        Command::Shape {
            intervals,
            semitones,
            epsilon,
        } => {
            let cps = CombinationProductSet::new(&config.cps.factors, config.cps.k)?;
            let shape = match (intervals, semitones) {
                (_, Some(semis)) => Shape::from_semitones(&semis),
                (Some(ratios), None) => Shape::from_ratios(&ratios),
                (None, None) => config.shape.shape(),
            };
            let matcher = match epsilon {
                Some(eps) => ShapeMatcher::new(eps)?,
                None => config.shape.matcher()?,
            };
            let matches = matcher.find_in_cps(&cps, &shape)?;
            Ok(json!({ "shape": shape, "epsilon": matcher.epsilon(), "matches": matches }))
        }
        Command::Embed { ratios } => {
            let lattice = config.lattice.build()?;
            let embedding = ScaleEmbedder::new(&lattice).embed(&ratios)?;
            Ok(json!({
                "coords": node_coords(&lattice, &embedding.nodes),
                "embedding": embedding,
            }))
        }
        Command::Project { dim, metric } => {
            let lattice = config.lattice.build()?;
            let target = dim.unwrap_or(config.projection.target_dim);
            if !(2..=3).contains(&target) {
                return Err(HarmonicError::InvalidInput {
                    what: "projection dimension",
                    value: target.to_string(),
                });
            }
            let metric = metric.map(LatticeMetric::from).unwrap_or(config.projection.metric);
            let projected = lattice.project(target, metric)?;
            Ok(json!({
                "ratios": lattice.nodes().iter().map(|n| n.ratio).collect::<Vec<_>>(),
                "projection": projected,
            }))
        }
    }
}

#[derive(Serialize)]
struct NodeCoords<'a> {
    node: u32,
    coords: &'a Monzo,
}

fn node_coords<'a>(lattice: &'a Lattice, nodes: &[NodeId]) -> Vec<NodeCoords<'a>> {
    nodes
        .iter()
        .map(|&id| NodeCoords {
            node: id.0,
            coords: &lattice.node(id).coords,
        })
        .collect()
}
