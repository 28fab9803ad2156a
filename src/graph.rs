// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::{euclidean_distance, Point};

/// Read-only view over a dense edge-cost table, as consumed by the
/// shortest-path solvers.
///
/// `cost(from, to)` returns the weight of the directed edge, or
/// [f64::INFINITY] if no such edge exists. Solvers operate purely on this
/// trait, so the backing representation can be swapped without touching them.
pub trait CostMatrix {
    /// Returns the number of nodes in the graph.
    fn node_count(&self) -> usize;

    /// Returns the cost of the directed edge from `from` to `to`,
    /// or [f64::INFINITY] if there is no such edge.
    fn cost(&self, from: usize, to: usize) -> f64;
}

/// A road network as a dense weighted directed graph.
///
/// Owns three co-indexed structures: an N×N adjacency matrix
/// ([f64::INFINITY] = no edge), one [Point] per node, and a map from the
/// source file's textual identifiers (OSM node ids, or synthesized
/// `road:<id>:start` / `junction:<id>` keys for OpenDRIVE) to dense indices.
/// The id map is the only place external identifiers survive; everything
/// downstream works on integer indices.
///
/// A `GraphData` is built once by a map builder and read-only afterwards;
/// it can be shared freely between concurrent solver runs.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphData {
    node_count: usize,
    matrix: Vec<f64>,
    coordinates: Vec<Point>,
    id_to_index: HashMap<String, usize>,
}

impl GraphData {
    /// Creates a graph with the given nodes and no edges.
    ///
    /// Every value of `id_to_index` must be a distinct index into `coordinates`.
    pub fn new(coordinates: Vec<Point>, id_to_index: HashMap<String, usize>) -> Self {
        let node_count = coordinates.len();
        debug_assert!(id_to_index.values().all(|&idx| idx < node_count));

        Self {
            node_count,
            matrix: vec![f64::INFINITY; node_count * node_count],
            coordinates,
            id_to_index,
        }
    }

    /// Creates a graph from a caller-supplied dense weight matrix using the
    /// legacy `0` = "no edge" convention: non-positive and non-finite entries
    /// become [f64::INFINITY]. The resulting graph has no external ids.
    pub fn from_weight_matrix(weights: &[Vec<f64>], coordinates: Vec<Point>) -> Self {
        assert_eq!(weights.len(), coordinates.len());

        let mut g = Self::new(coordinates, HashMap::default());
        for (from, row) in weights.iter().enumerate() {
            assert_eq!(row.len(), g.node_count);
            for (to, &weight) in row.iter().enumerate() {
                if weight.is_finite() && weight > 0.0 {
                    g.set_edge(from, to, weight);
                }
            }
        }
        g
    }

    /// Creates or overwrites the directed edge from `from` to `to`.
    /// Duplicate writes are not accumulated; the last write wins.
    pub fn set_edge(&mut self, from: usize, to: usize, weight: f64) {
        assert!(from < self.node_count && to < self.node_count);
        self.matrix[from * self.node_count + to] = weight;
    }

    /// Returns the coordinates of all nodes, indexed by node index.
    pub fn coordinates(&self) -> &[Point] {
        &self.coordinates
    }

    /// Returns the coordinate of the node with the given index.
    pub fn coordinate(&self, index: usize) -> Point {
        self.coordinates[index]
    }

    /// Looks up the dense index of a node by its original textual identifier.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }

    /// Finds the node closest to the given `(x, y)` position by straight-line
    /// distance. Walks every node and is not suitable for large graphs.
    pub fn nearest_index(&self, x: f64, y: f64) -> Option<usize> {
        let at = Point::new(x, y, 0.0);
        self.coordinates
            .iter()
            .enumerate()
            .map(|(idx, point)| (euclidean_distance(&at, point), idx))
            .min_by(|(a_dist, _), (b_dist, _)| a_dist.total_cmp(b_dist))
            .map(|(_, idx)| idx)
    }
}

impl CostMatrix for GraphData {
    fn node_count(&self) -> usize {
        self.node_count
    }

    fn cost(&self, from: usize, to: usize) -> f64 {
        assert!(from < self.node_count && to < self.node_count);
        self.matrix[from * self.node_count + to]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_graph_has_no_edges() {
        let g = GraphData::new(vec![Point::ZERO; 3], HashMap::default());
        assert_eq!(g.node_count(), 3);
        for from in 0..3 {
            for to in 0..3 {
                assert!(g.cost(from, to).is_infinite());
            }
        }
    }

    #[test]
    fn set_edge_overwrites() {
        let mut g = GraphData::new(vec![Point::ZERO; 2], HashMap::default());
        g.set_edge(0, 1, 10.0);
        g.set_edge(0, 1, 4.0);
        assert_eq!(g.cost(0, 1), 4.0);
        assert!(g.cost(1, 0).is_infinite());
    }

    #[test]
    fn from_weight_matrix_treats_zeros_as_no_edge() {
        let weights = vec![vec![0.0, 2.5], vec![f64::INFINITY, 0.0]];
        let g = GraphData::from_weight_matrix(&weights, vec![Point::ZERO; 2]);
        assert_eq!(g.cost(0, 1), 2.5);
        assert!(g.cost(0, 0).is_infinite());
        assert!(g.cost(1, 0).is_infinite());
        assert!(g.cost(1, 1).is_infinite());
    }

    #[test]
    fn index_lookup() {
        let ids = HashMap::from_iter([("road:1:start".to_string(), 0), ("junction:5".to_string(), 1)]);
        let g = GraphData::new(vec![Point::ZERO; 2], ids);
        assert_eq!(g.index_of("junction:5"), Some(1));
        assert_eq!(g.index_of("road:1:end"), None);
    }

    #[test]
    fn nearest_index_picks_closest() {
        let coords = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(10.0, 0.0, 0.0),
            Point::new(10.0, 10.0, 0.0),
        ];
        let g = GraphData::new(coords, HashMap::default());
        assert_eq!(g.nearest_index(9.0, 1.0), Some(1));
        assert_eq!(g.nearest_index(-1.0, -1.0), Some(0));
    }

    #[test]
    fn nearest_index_on_empty_graph() {
        let g = GraphData::new(vec![], HashMap::default());
        assert_eq!(g.nearest_index(0.0, 0.0), None);
    }
}
