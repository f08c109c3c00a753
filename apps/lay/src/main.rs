// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lays out racks on a floor, wires them and prints the cost.
//!
//! ```text
//! lay 128r8 df sky~900m
//! lay -c 128r8+df.edges do-2-300
//! lay -u 64r8 db-2-6 ucut-5%
//! ```

use anyhow::{bail, Context};
use env_logger::Target;
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use topogen::{CablingScheme, Config, Descriptor, FloorSpec, Layout, LayoutScheme, Network};

#[derive(StructOpt, Debug)]
#[structopt(name = "lay", about = "Rack-aware interconnect topology generator")]
struct Arguments {
    /// overwrite existing output files
    #[structopt(short = "f", long = "force")]
    overwrite: bool,
    /// report warnings and errors only
    #[structopt(short, long)]
    quiet: bool,
    /// directed network: links are pairs of arcs and the output is `.arcs`
    #[structopt(short = "u", long)]
    unidirectional: bool,
    /// also write the rack-to-rack edge list and its log
    #[structopt(short = "c", long = "cluster")]
    clustered: bool,
    /// cabling overhead OUTER,INNER [cm]
    #[structopt(long)]
    overhead: Option<String>,
    /// supported layouts: mesh, room
    #[structopt(long)]
    layout: Option<LayoutScheme>,
    /// diagonal instead of rectilinear cabling
    #[structopt(long)]
    euclidean: bool,
    #[structopt(long)]
    seed: Option<u64>,
    /// YAML run configuration; command-line options take precedence
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(long, parse(from_os_str), default_value = ".")]
    output_dir: PathBuf,
    /// floor such as 128r8, or an existing edge list
    input: String,
    /// topologies to add, in order
    #[structopt(required = true)]
    topologies: Vec<String>,
}

fn load_config(args: &Arguments) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(overhead) = &args.overhead {
        config = config.with_overhead(overhead)?;
    }
    if let Some(layout) = args.layout {
        config.floor.layout = layout;
    }
    if args.euclidean {
        config.floor.cabling = CablingScheme::Euclidean;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.unidirectional {
        config.directed = true;
    }
    config.validate()?;
    Ok(config)
}

/// the floor part of a run name, `128r8` for `128r8+df`
fn floor_name(base: &str) -> &str {
    base.split('+').next().unwrap_or(base)
}

/// `<base>+<topology>...`, with `--<seed>` appended for explicit seeds
fn run_name(base: &str, topologies: &[String], seed: Option<u64>) -> String {
    let name = std::iter::once(base)
        .chain(topologies.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("+");
    match seed {
        Some(seed) => format!("{}--{}", name, seed),
        None => name,
    }
}

struct Outputs {
    edges: PathBuf,
    coord: PathBuf,
    clustered: PathBuf,
}

impl Outputs {
    fn new(dir: &Path, run_name: &str, floor_name: &str, directed: bool) -> Self {
        let ext = if directed { "arcs" } else { "edges" };
        Self {
            edges: dir.join(format!("{}.{}", run_name, ext)),
            coord: dir.join(format!("{}.coord", floor_name)),
            clustered: dir.join(format!("{}.clu.{}", run_name, ext)),
        }
    }
}

fn run(args: &Arguments) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let descriptors = args
        .topologies
        .iter()
        .map(|token| Descriptor::parse(token))
        .collect::<topogen::Result<Vec<_>>>()?;

    let input = Path::new(&args.input);
    let from_edges = input.is_file();
    let base = if from_edges {
        input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .with_context(|| format!("Cannot name a run after {}", input.display()))?
    } else {
        args.input.clone()
    };
    let floor_name = floor_name(&base);
    let run_name = run_name(&base, &args.topologies, args.seed);
    let outputs = Outputs::new(&args.output_dir, &run_name, floor_name, config.directed);

    let mut network = if from_edges {
        let coord_input = input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{}.coord", floor_name));
        if !coord_input.is_file() {
            bail!(
                "{} is required to place the nodes of {}",
                coord_input.display(),
                input.display()
            );
        }
        let expected_racks = FloorSpec::parse(floor_name)
            .ok()
            .map(|floor| (floor.nodes + floor.rack_size - 1) / floor.rack_size);
        let layout = Layout::load(&coord_input, &config.floor, expected_racks)
            .with_context(|| format!("Failed to load {}", coord_input.display()))?;
        let edges = topogen::io::load_edge_list(input)
            .with_context(|| format!("Failed to load {}", input.display()))?;
        Network::from_edge_list(layout, edges.into_iter().map(|(i, j, _)| (i, j)), &config)
            .with_context(|| format!("{} does not fit {}", input.display(), coord_input.display()))?
    } else {
        if outputs.edges.exists() && !args.overwrite {
            log::warn!(
                "Output file '{}' exists. Use -f to overwrite",
                outputs.edges.display()
            );
            return Ok(());
        }
        let floor = FloorSpec::parse(&args.input)?;
        let layout = Layout::generate(floor.nodes, floor.rack_size, &config.floor)?;
        Network::new(layout, &config)
    };

    network.wire_all(&descriptors)?;

    if !from_edges {
        topogen::io::save_edge_list(&network, &outputs.edges)?;
        topogen::io::save_coordinates(network.layout(), &outputs.coord)?;
    }
    if args.clustered {
        topogen::io::save_clustered(&network, &outputs.clustered)?;
    }
    for report in network.reports() {
        log::debug!("{}", report);
    }
    println!("{}\t{}", run_name, network.cost_summary());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::from_args();

    let level = if args.quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    let _logger = env_logger::builder()
        .filter(Some("topogen"), level)
        .filter(Some("lay"), level)
        .target(Target::Stderr)
        .parse_default_env()
        .try_init();

    run(&args)
}
