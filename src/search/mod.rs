// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod astar;
mod dijkstra;

pub use astar::{run_weighted_astar, WeightedAStar};
pub use dijkstra::run_dijkstra;

/// Error conditions rejected when configuring a solver.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// The heuristic weight passed to [WeightedAStar::new] must be a
    /// non-negative finite number.
    #[error("heuristic weight must be non-negative, got {0}")]
    InvalidWeight(f64),
}

/// Result of one solver run: per-node best-known costs and the predecessor
/// of every node on its cheapest path from the source.
///
/// Unreachable nodes carry [f64::INFINITY] and no predecessor; that is data,
/// not an error, and callers must check for it before walking a path.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPaths {
    /// Cost of the cheapest known path from the source, per node index.
    pub distances: Vec<f64>,

    /// Previous node index on the cheapest path, per node index.
    /// `None` for the source itself and for unreachable nodes.
    pub predecessors: Vec<Option<usize>>,
}

impl ShortestPaths {
    /// Reconstructs the source-to-`target` path by walking [predecessors](Self::predecessors)
    /// backwards. Returns `None` if `target` was not reached.
    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        if !self.distances[target].is_finite() {
            return None;
        }

        let mut path = vec![target];
        let mut at = target;
        while let Some(previous) = self.predecessors[at] {
            path.push(previous);
            at = previous;
        }

        path.reverse();
        Some(path)
    }
}
