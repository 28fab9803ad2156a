// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{euclidean_distance, CostMatrix, GraphData, Point};

use super::{SearchError, ShortestPaths};

/// Weighted [A* search](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// over a dense cost matrix, expanding nodes by `f = g + w·h`.
///
/// `h` is the straight-line distance between node coordinates (regardless of
/// the source map format), and the weight `w` trades solution quality for
/// search effort: `w = 1` is standard A*, `w > 1` leans on the heuristic and
/// may return a suboptimal path faster, `w < 1` leans on measured cost.
/// Without a coordinate table the heuristic is zero and the search degrades
/// to Dijkstra's algorithm.
///
/// The solver holds no per-run state; every [run](Self::run) starts from
/// scratch, so one configured instance can serve many queries.
#[derive(Debug, Clone, Copy)]
pub struct WeightedAStar<'a> {
    coordinates: Option<&'a [Point]>,
    weight: f64,
}

impl<'a> WeightedAStar<'a> {
    /// Configures a weighted A* solver.
    ///
    /// Returns [SearchError::InvalidWeight] unless `weight` is a finite,
    /// non-negative number.
    pub fn new(coordinates: Option<&'a [Point]>, weight: f64) -> Result<Self, SearchError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(SearchError::InvalidWeight(weight));
        }

        Ok(Self {
            coordinates,
            weight,
        })
    }

    /// Computes the cheapest path from `source` towards `target`.
    ///
    /// The search stops as soon as `target` is selected for expansion, so the
    /// returned [ShortestPaths] is complete only for the part of the graph
    /// explored up to that point; the reported path is optimal when `w ≤ 1`
    /// and the heuristic never overestimates. If the open set drains first,
    /// `target` is unreachable and comes back at infinity.
    ///
    /// Both indices must be valid for the graph; out-of-range values panic.
    pub fn run(&self, graph: &impl CostMatrix, source: usize, target: usize) -> ShortestPaths {
        let n = graph.node_count();
        assert!(source < n, "source index {} out of range for {} nodes", source, n);
        assert!(target < n, "target index {} out of range for {} nodes", target, n);

        let mut g_score = vec![f64::INFINITY; n];
        let mut f_score = vec![f64::INFINITY; n];
        let mut predecessors: Vec<Option<usize>> = vec![None; n];

        // The open set stays a plain insertion-ordered vector on purpose:
        // the linear min-f scan breaks ties by first insertion, and that
        // order decides which of several equal-f paths is reported.
        let mut open: Vec<usize> = vec![source];
        let mut closed = vec![false; n];

        g_score[source] = 0.0;
        f_score[source] = self.weight * self.heuristic(source, target);

        while !open.is_empty() {
            let position = min_f_position(&open, &f_score);
            let current = open[position];
            if current == target {
                break;
            }
            open.remove(position);
            closed[current] = true;

            for neighbor in 0..n {
                let weight = graph.cost(current, neighbor);
                if !weight.is_finite() || closed[neighbor] {
                    continue;
                }

                let tentative = g_score[current] + weight;
                if !open.contains(&neighbor) {
                    open.push(neighbor);
                } else if tentative >= g_score[neighbor] {
                    continue;
                }

                predecessors[neighbor] = Some(current);
                g_score[neighbor] = tentative;
                f_score[neighbor] = tentative + self.weight * self.heuristic(neighbor, target);
            }
        }

        ShortestPaths {
            distances: g_score,
            predecessors,
        }
    }

    fn heuristic(&self, from: usize, to: usize) -> f64 {
        match self.coordinates {
            Some(coordinates) => euclidean_distance(&coordinates[from], &coordinates[to]),
            None => 0.0,
        }
    }
}

/// Returns the position of the open-set entry with the smallest `f` score.
/// On ties the earliest-inserted entry wins.
fn min_f_position(open: &[usize], f_score: &[f64]) -> usize {
    let mut best = 0;
    for (position, &node) in open.iter().enumerate() {
        if f_score[node] < f_score[open[best]] {
            best = position;
        }
    }
    best
}

/// Runs weighted A* over a [GraphData] using its own coordinate table as the
/// heuristic source. See [WeightedAStar] for the semantics of `weight`.
pub fn run_weighted_astar(
    graph: &GraphData,
    source: usize,
    target: usize,
    weight: f64,
) -> Result<ShortestPaths, SearchError> {
    Ok(WeightedAStar::new(Some(graph.coordinates()), weight)?.run(graph, source, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphData;

    fn line_graph() -> GraphData {
        // 0 -- 1 -- 2 laid out on the x axis, plus a costly 0 -> 2 shortcut.
        let weights = vec![
            vec![0.0, 1.0, 5.0],
            vec![1.0, 0.0, 1.0],
            vec![5.0, 1.0, 0.0],
        ];
        let coordinates = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
        ];
        GraphData::from_weight_matrix(&weights, coordinates)
    }

    #[test]
    fn negative_weight_is_rejected() {
        assert_eq!(
            WeightedAStar::new(None, -0.5).unwrap_err(),
            SearchError::InvalidWeight(-0.5),
        );
    }

    #[test]
    fn nan_weight_is_rejected() {
        assert!(WeightedAStar::new(None, f64::NAN).is_err());
    }

    #[test]
    fn zero_weight_is_allowed() {
        // w = 0 discards the heuristic entirely.
        let g = line_graph();
        let paths = run_weighted_astar(&g, 0, 2, 0.0).unwrap();
        assert_eq!(paths.distances[2], 2.0);
    }

    #[test]
    fn admissible_heuristic_finds_the_optimum() {
        let g = line_graph();
        let paths = run_weighted_astar(&g, 0, 2, 1.0).unwrap();
        assert_eq!(paths.distances[2], 2.0);
        assert_eq!(paths.path_to(2), Some(vec![0, 1, 2]));
    }

    #[test]
    fn source_equal_to_target_terminates_immediately() {
        let g = line_graph();
        let paths = run_weighted_astar(&g, 1, 1, 1.0).unwrap();
        assert_eq!(paths.distances[1], 0.0);
        assert_eq!(paths.path_to(1), Some(vec![1]));
    }

    #[test]
    fn heavy_heuristic_weight_prefers_the_direct_edge() {
        // With w large enough, f is dominated by the remaining straight-line
        // distance, so the search expands the costly direct edge first and
        // returns the suboptimal 0 -> 2 hop.
        let g = line_graph();
        let paths = run_weighted_astar(&g, 0, 2, 10.0).unwrap();
        assert_eq!(paths.distances[2], 5.0);
        assert_eq!(paths.path_to(2), Some(vec![0, 2]));
    }

    #[test]
    #[should_panic]
    fn out_of_range_target_panics() {
        let g = line_graph();
        let _ = WeightedAStar::new(None, 1.0).unwrap().run(&g, 0, 3);
    }
}
