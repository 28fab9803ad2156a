// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Road-network maps as weighted graphs with shortest-path search.
//!
//! `mapgraph` converts road-network map files — [OpenStreetMap](https://www.openstreetmap.org/)
//! XML (`.osm`, also gzip/bzip2-compressed) and [OpenDRIVE](https://www.asam.net/standards/detail/opendrive/)
//! (`.xodr`) — into a canonical dense weighted graph ([GraphData]), and computes
//! shortest paths over it with two interchangeable solvers: array-based
//! Dijkstra ([run_dijkstra]) and a heuristic-weighted A* ([WeightedAStar]).
//!
//! The graph is a dense N×N adjacency matrix with [f64::INFINITY] denoting
//! "no edge", suitable for moderate node counts. Unreachable nodes are not
//! errors: they come back with an infinite distance and no predecessor.
//!
//! # Example
//!
//! ```no_run
//! let g = mapgraph::map::graph_from_file("path/to/town.osm").expect("failed to load town.osm");
//!
//! let paths = mapgraph::run_dijkstra(&g, 0);
//! match paths.path_to(4) {
//!     Some(path) => println!("cost {}: {:?}", paths.distances[4], path),
//!     None => println!("unreachable"),
//! }
//! ```

mod distance;
mod graph;
pub mod map;
mod search;

pub use distance::{euclidean_distance, haversine_distance};
pub use graph::{CostMatrix, GraphData};
pub use search::{run_dijkstra, run_weighted_astar, SearchError, ShortestPaths, WeightedAStar};

/// A coordinate of a [GraphData] node.
///
/// The interpretation depends on the source format: OpenStreetMap nodes carry
/// `(longitude, latitude, elevation)`, while OpenDRIVE nodes carry planar
/// `(x, y, 0)` in the map's inertial frame. Callers must not mix the two
/// interpretations; within one graph all points share one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}
