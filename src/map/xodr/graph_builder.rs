// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};

use crate::{CostMatrix, GraphData, Point};

use super::model::{
    Connection, ContactPoint, Feature, Geometry, GeometryKind, Junction, Link, LinkTarget,
};

/// Weight of a synthetic edge joining two roads (or a road and a junction).
/// These edges express topological adjacency, not travel distance, so they
/// carry a near-zero cost instead of a measured length.
const JOINT_WEIGHT: f64 = 1e-3;

/// Curvatures below this threshold are indistinguishable from a straight
/// line and would blow up the `1/curvature` radius.
const MIN_CURVATURE: f64 = 1e-10;

/// A road after geometric reconstruction: its two synthetic endpoint nodes
/// and everything edge assembly needs to know about it.
#[derive(Debug, Clone, PartialEq)]
struct Road {
    start: Point,
    end: Point,
    length: f64,
    bidirectional: bool,
    /// Set when the road does not belong to any junction.
    standalone: bool,
    predecessor: Option<Link>,
    successor: Option<Link>,
}

/// Helper object used for storing state related to converting
/// [OpenDRIVE features](Feature) into a [GraphData].
///
/// Every road contributes two synthetic nodes (`road:<id>:start` and
/// `road:<id>:end`) and every junction one (`junction:<id>`), with dense
/// indices assigned in lexicographic key order. Edges come from three passes:
/// intra-road traversal, road-level links, and junction connections; later
/// passes overwrite earlier ones for the same ordered node pair.
pub(super) struct GraphBuilder {
    roads: BTreeMap<String, Road>,
    junctions: Vec<Junction>,
}

impl GraphBuilder {
    pub(super) fn new() -> Self {
        Self {
            roads: BTreeMap::default(),
            junctions: Vec::default(),
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
                Feature::Road(r) => self.add_road(r),
                Feature::Junction(j) => self.junctions.push(j),
            }
        }
        Ok(())
    }

    fn add_road(&mut self, raw: super::model::Road) {
        if raw.geometry.is_empty() {
            log::debug!("xodr: skipping road {} without plan view geometry", raw.id);
            return;
        }

        let mut geometry = raw.geometry;
        geometry.sort_by(|a, b| a.s.total_cmp(&b.s));

        let first = &geometry[0];
        let last = geometry.last().unwrap();

        // A road with lane data is only traversable both ways when both
        // sides carry a driving lane. This conflates lane counts with lane
        // directions, which is enough for graph-level routing.
        let bidirectional = if raw.has_lane_section {
            raw.left_driving && raw.right_driving
        } else {
            true
        };

        self.roads.insert(
            raw.id,
            Road {
                start: Point::new(first.x, first.y, 0.0),
                end: project_endpoint(last),
                length: raw.length,
                bidirectional,
                standalone: raw.junction == "-1",
                predecessor: raw.predecessor,
                successor: raw.successor,
            },
        );
    }

    /// Assembles the collected features into a [GraphData].
    pub(super) fn build(self) -> GraphData {
        let centroids = self.junction_centroids();

        let mut points: BTreeMap<String, Point> = BTreeMap::default();
        for (id, road) in &self.roads {
            points.insert(road_node_id(id, ContactPoint::Start), road.start);
            points.insert(road_node_id(id, ContactPoint::End), road.end);
        }
        for junction in &self.junctions {
            points.insert(junction_node_id(&junction.id), centroids[&junction.id]);
        }

        let coordinates: Vec<Point> = points.values().copied().collect();
        let id_to_index: HashMap<String, usize> = points
            .keys()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        let mut g = GraphData::new(coordinates, id_to_index);
        self.add_road_edges(&mut g);
        for (id, road) in &self.roads {
            self.add_link_edges(&mut g, id, road);
        }
        self.add_junction_edges(&mut g);

        log::debug!(
            "xodr: {} roads, {} junctions, {} nodes",
            self.roads.len(),
            self.junctions.len(),
            g.node_count(),
        );

        g
    }

    /// Estimates each junction's coordinate as the arithmetic mean of all
    /// road endpoints whose links reference it. A junction nothing links to
    /// sits at the origin.
    fn junction_centroids(&self) -> HashMap<String, Point> {
        let mut sums: HashMap<&str, (Point, usize)> = HashMap::default();

        for road in self.roads.values() {
            for (link, endpoint) in [(&road.predecessor, road.start), (&road.successor, road.end)]
            {
                if let Some(link) = link {
                    if link.target == LinkTarget::Junction {
                        let (sum, count) =
                            sums.entry(&link.element_id).or_insert((Point::ZERO, 0));
                        sum.x += endpoint.x;
                        sum.y += endpoint.y;
                        sum.z += endpoint.z;
                        *count += 1;
                    }
                }
            }
        }

        self.junctions
            .iter()
            .map(|junction| {
                let centroid = match sums.get(junction.id.as_str()) {
                    Some(&(sum, count)) => Point::new(
                        sum.x / count as f64,
                        sum.y / count as f64,
                        sum.z / count as f64,
                    ),
                    None => Point::ZERO,
                };
                (junction.id.clone(), centroid)
            })
            .collect()
    }

    /// First pass: roads outside of junctions are traversed start-to-end at
    /// their real length, and back again when bidirectional. Roads belonging
    /// to a junction are wired up by [Self::add_junction_edges] instead.
    fn add_road_edges(&self, g: &mut GraphData) {
        for (id, road) in &self.roads {
            if !road.standalone {
                continue;
            }

            let start = road_node_id(id, ContactPoint::Start);
            let end = road_node_id(id, ContactPoint::End);
            set_edge_by_id(g, &start, &end, road.length);
            if road.bidirectional {
                set_edge_by_id(g, &end, &start, road.length);
            }
        }
    }

    /// Second pass: a road's predecessor joins the road's start node, and
    /// its successor extends from the road's end node. Links to unknown
    /// elements are skipped.
    fn add_link_edges(&self, g: &mut GraphData, road_id: &str, road: &Road) {
        if let Some(ref link) = road.predecessor {
            match self.link_node_id(link) {
                Some(from) => {
                    set_edge_by_id(g, &from, &road_node_id(road_id, ContactPoint::Start), JOINT_WEIGHT)
                }
                None => log::warn!(
                    "xodr: road {} has a predecessor link to unknown element {}",
                    road_id,
                    link.element_id,
                ),
            }
        }

        if let Some(ref link) = road.successor {
            match self.link_node_id(link) {
                Some(to) => {
                    set_edge_by_id(g, &road_node_id(road_id, ContactPoint::End), &to, JOINT_WEIGHT)
                }
                None => log::warn!(
                    "xodr: road {} has a successor link to unknown element {}",
                    road_id,
                    link.element_id,
                ),
            }
        }
    }

    /// Third pass: every junction connection joins the incoming road's end
    /// to the connecting road at its contact point. The connecting road's
    /// own traversal and links are re-emitted here, so the topology around a
    /// junction is complete even though its member roads are not standalone.
    fn add_junction_edges(&self, g: &mut GraphData) {
        let mut skipped: usize = 0;

        for junction in &self.junctions {
            for connection in &junction.connections {
                if !self.add_connection_edges(g, connection) {
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            log::warn!("xodr: skipped {} junction connections to unknown roads", skipped);
        }
    }

    /// Wires one junction connection. Returns false if the incoming or
    /// connecting road is unknown.
    fn add_connection_edges(&self, g: &mut GraphData, connection: &Connection) -> bool {
        let Some(connecting) = self.roads.get(&connection.connecting_road) else {
            return false;
        };
        if !self.roads.contains_key(&connection.incoming_road) {
            return false;
        }

        let incoming_end = road_node_id(&connection.incoming_road, ContactPoint::End);
        let entry = road_node_id(&connection.connecting_road, connection.contact_point);
        set_edge_by_id(g, &incoming_end, &entry, JOINT_WEIGHT);

        set_edge_by_id(
            g,
            &road_node_id(&connection.connecting_road, ContactPoint::Start),
            &road_node_id(&connection.connecting_road, ContactPoint::End),
            connecting.length,
        );

        self.add_link_edges(g, &connection.connecting_road, connecting);
        true
    }

    /// Resolves a link to the node it attaches to: the linked road's
    /// contact-point endpoint, or the linked junction's node. `None` when the
    /// referenced element does not exist in the document.
    fn link_node_id(&self, link: &Link) -> Option<String> {
        match link.target {
            LinkTarget::Road => self
                .roads
                .contains_key(&link.element_id)
                .then(|| road_node_id(&link.element_id, link.contact_point)),
            LinkTarget::Junction => self
                .junctions
                .iter()
                .any(|junction| junction.id == link.element_id)
                .then(|| junction_node_id(&link.element_id)),
        }
    }
}

/// Projects the end point of a road's final geometry entry.
///
/// Lines continue straight along the heading; arcs sweep a circle of radius
/// `1/curvature` by `length·curvature` radians. Near-zero curvatures and
/// unsupported shapes degrade to the straight-line projection.
fn project_endpoint(geometry: &Geometry) -> Point {
    match geometry.kind {
        GeometryKind::Arc { curvature } if curvature.abs() >= MIN_CURVATURE => {
            let sweep = geometry.length * curvature;
            Point::new(
                geometry.x + ((geometry.hdg + sweep).sin() - geometry.hdg.sin()) / curvature,
                geometry.y - ((geometry.hdg + sweep).cos() - geometry.hdg.cos()) / curvature,
                0.0,
            )
        }
        _ => Point::new(
            geometry.x + geometry.length * geometry.hdg.cos(),
            geometry.y + geometry.length * geometry.hdg.sin(),
            0.0,
        ),
    }
}

fn road_node_id(road_id: &str, contact_point: ContactPoint) -> String {
    format!("road:{}:{}", road_id, contact_point.as_str())
}

fn junction_node_id(junction_id: &str) -> String {
    format!("junction:{}", junction_id)
}

fn set_edge_by_id(g: &mut GraphData, from: &str, to: &str, weight: f64) {
    if let (Some(from), Some(to)) = (g.index_of(from), g.index_of(to)) {
        g.set_edge(from, to, weight);
    }
}
