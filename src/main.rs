// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Dijkstra,
    Astar,
}

#[derive(Parser)]
#[command(version, about = "Shortest paths over .osm and .xodr road networks")]
struct Cli {
    /// The path to the map file (.osm, .osm.gz, .osm.bz2 or .xodr)
    map_file: PathBuf,

    /// Index of the start node
    source: usize,

    /// Index of the end node
    target: usize,

    /// The shortest-path algorithm to run
    #[arg(long, value_enum, default_value_t = Algorithm::Dijkstra)]
    algorithm: Algorithm,

    /// Heuristic weight for the astar algorithm; 1 is standard A*,
    /// larger values trade path quality for search speed
    #[arg(long, default_value_t = 1.0)]
    weight: f64,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let g = mapgraph::map::graph_from_file(&cli.map_file)?;
    let n = mapgraph::CostMatrix::node_count(&g);
    log::info!("loaded {} with {} nodes", cli.map_file.display(), n);

    if cli.source >= n || cli.target >= n {
        return Err(format!("node indices must be below {}", n).into());
    }

    let paths = match cli.algorithm {
        Algorithm::Dijkstra => mapgraph::run_dijkstra(&g, cli.source),
        Algorithm::Astar => {
            mapgraph::run_weighted_astar(&g, cli.source, cli.target, cli.weight)?
        }
    };

    match paths.path_to(cli.target) {
        Some(path) => {
            println!("cost: {}", paths.distances[cli.target]);
            println!(
                "path: {}",
                path.iter()
                    .map(|&node| (node + 1).to_string())
                    .collect::<Vec<_>>()
                    .join(" -> "),
            );
        }
        None => println!("node {} is unreachable from node {}", cli.target + 1, cli.source + 1),
    }

    Ok(())
}
