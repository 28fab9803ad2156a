// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::{haversine_distance, GraphData, Point};

use super::model::{Feature, Node, Way};

/// Helper object used for storing state related to converting
/// [OSM features](Feature) into a [GraphData].
///
/// Only `way`s carrying a `highway` tag contribute to the graph; the graph's
/// nodes are exactly the known nodes referenced by those ways, indexed in
/// first-seen order over the ways' node references. Edge weights are
/// great-circle distances in meters.
pub(super) struct GraphBuilder {
    nodes: HashMap<i64, Point>,
    ways: Vec<Way>,
}

impl GraphBuilder {
    pub(super) fn new() -> Self {
        Self {
            nodes: HashMap::default(),
            ways: Vec::default(),
        }
    }

    /// Consumes all features from the provided iterator.
    /// The first parse error aborts the build.
    pub(super) fn add_features<I>(&mut self, features: I) -> Result<(), quick_xml::Error>
    where
        I: Iterator<Item = Result<Feature, quick_xml::Error>>,
    {
        for f in features {
            match f? {
                Feature::Node(n) => self.add_node(n),
                Feature::Way(w) => self.add_way(w),
            }
        }
        Ok(())
    }

    fn add_node(&mut self, n: Node) {
        self.nodes.insert(n.id, Point::new(n.lon, n.lat, n.ele));
    }

    fn add_way(&mut self, w: Way) {
        if w.tags.contains_key("highway") {
            self.ways.push(w);
        }
    }

    /// Assembles the collected features into a [GraphData].
    pub(super) fn build(self) -> GraphData {
        let (order, index) = self.assign_indices();

        let coordinates: Vec<Point> = order.iter().map(|id| self.nodes[id]).collect();
        let id_to_index: HashMap<String, usize> = order
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.to_string(), idx))
            .collect();

        let mut g = GraphData::new(coordinates, id_to_index);
        let mut edges: usize = 0;

        for way in &self.ways {
            let (forward, backward) = way_direction(&way.tags);

            // Dangling references are dropped up front; edges connect
            // consecutive *retained* references.
            let retained: Vec<usize> = way
                .nodes
                .iter()
                .filter_map(|node_id| index.get(node_id).copied())
                .collect();

            for pair in retained.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                let a = g.coordinate(from);
                let b = g.coordinate(to);
                let distance = haversine_distance(a.y, a.x, b.y, b.x);

                if forward {
                    g.set_edge(from, to, distance);
                    edges += 1;
                }
                if backward {
                    g.set_edge(to, from, distance);
                    edges += 1;
                }
            }
        }

        log::debug!(
            "osm: {} nodes, {} highway ways, {} edges",
            order.len(),
            self.ways.len(),
            edges,
        );

        g
    }

    /// Assigns dense indices to every known node referenced by a selected way,
    /// in first-seen order. References to unknown nodes are dropped.
    fn assign_indices(&self) -> (Vec<i64>, HashMap<i64, usize>) {
        let mut order: Vec<i64> = Vec::default();
        let mut index: HashMap<i64, usize> = HashMap::default();
        let mut dangling: usize = 0;

        for way in &self.ways {
            for &node_id in &way.nodes {
                if !self.nodes.contains_key(&node_id) {
                    dangling += 1;
                } else if !index.contains_key(&node_id) {
                    index.insert(node_id, order.len());
                    order.push(node_id);
                }
            }
        }

        if dangling > 0 {
            log::debug!("osm: dropped {} dangling node references", dangling);
        }

        (order, index)
    }
}

/// Classifies a way as traversable forward and/or backward from its `oneway`
/// tag: `yes`/`true`/`1` is forward-only, `-1` is reverse-only, anything else
/// (including no tag at all) is bidirectional.
fn way_direction(tags: &HashMap<String, String>) -> (bool, bool) {
    match tags.get("oneway").map(String::as_str) {
        Some("yes") | Some("true") | Some("1") => (true, false),
        Some("-1") => (false, true),
        _ => (true, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn way_direction_classification() {
        assert_eq!(way_direction(&tags(&[("oneway", "yes")])), (true, false));
        assert_eq!(way_direction(&tags(&[("oneway", "true")])), (true, false));
        assert_eq!(way_direction(&tags(&[("oneway", "1")])), (true, false));
        assert_eq!(way_direction(&tags(&[("oneway", "-1")])), (false, true));
        assert_eq!(way_direction(&tags(&[("oneway", "no")])), (true, true));
        assert_eq!(way_direction(&tags(&[("oneway", "reversible")])), (true, true));
        assert_eq!(way_direction(&tags(&[])), (true, true));
    }
}
