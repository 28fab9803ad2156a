// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::io;
use std::str::from_utf8;

use crate::map::xml::{BufParser, IoParser, Parser};

use super::model::{
    defaults, Connection, ContactPoint, Feature, Geometry, GeometryKind, Junction, Link,
    LinkTarget, Road,
};

/// Reader streams OpenDRIVE [Features](Feature) from an XML document.
///
/// Roads and junctions are deeply nested, so the reader keeps track of which
/// sections of the current `road` element it is inside of. Lane-level links
/// (`lane/link/predecessor`) must not be confused with road-level ones, and
/// only the first `laneSection` decides drivability. Missing optional
/// attributes take the defaults from [defaults]; only a structurally broken
/// document surfaces an error. Roads and junctions without an `id` cannot be
/// referenced and are dropped.
pub(super) struct Reader<P: Parser> {
    parser: P,
    state: State,
    eof: bool,
}

/// Accumulated parse context for the feature currently being read.
/// Kept apart from the parser so both can be borrowed at once.
#[derive(Default)]
struct State {
    road: Option<Road>,
    junction: Option<Junction>,
    geometry: Option<Geometry>,
    in_plan_view: bool,
    in_road_link: bool,
    in_lanes: bool,
    lane_sections: u32,
    lane_side: Option<LaneSide>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LaneSide {
    Left,
    Right,
}

impl<P: Parser> Reader<P> {
    fn new(parser: P) -> Self {
        Self {
            parser,
            state: State::default(),
            eof: false,
        }
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<Feature, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.eof {
            let event = match self.parser.read_event() {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };

            let feature = match event {
                quick_xml::events::Event::Start(ref start) => {
                    self.state.handle_start(start);
                    None
                }
                quick_xml::events::Event::Empty(ref start) => self.state.handle_empty(start),
                quick_xml::events::Event::End(ref end) => self.state.handle_end(end),
                quick_xml::events::Event::Eof => {
                    self.eof = true;
                    None
                }
                _ => None,
            };

            if let Some(feature) = feature {
                return Some(Ok(feature));
            }
        }

        None
    }
}

impl State {
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Opening tags only ever accumulate context; features complete on
    /// closing tags.
    fn handle_start(&mut self, start: &quick_xml::events::BytesStart<'_>) {
        match start.local_name().as_ref() {
            b"road" => {
                self.reset();
                self.road = parse_road(start);
            }
            b"junction" => {
                self.reset();
                self.junction = parse_junction(start);
            }

            b"planView" if self.road.is_some() => self.in_plan_view = true,
            b"geometry" if self.in_plan_view => {
                self.geometry = Some(parse_geometry(start));
            }
            b"line" | b"arc" | b"spiral" | b"poly3" | b"paramPoly3" => {
                if let Some(ref mut geometry) = self.geometry {
                    geometry.kind = parse_geometry_kind(start);
                }
            }

            b"link" if self.road.is_some() && !self.in_lanes => self.in_road_link = true,
            b"predecessor" if self.in_road_link => {
                if let Some(ref mut road) = self.road {
                    road.predecessor = parse_link(start);
                }
            }
            b"successor" if self.in_road_link => {
                if let Some(ref mut road) = self.road {
                    road.successor = parse_link(start);
                }
            }

            b"lanes" if self.road.is_some() => self.in_lanes = true,
            b"laneSection" if self.in_lanes => {
                self.lane_sections += 1;
                if self.lane_sections == 1 {
                    if let Some(ref mut road) = self.road {
                        road.has_lane_section = true;
                    }
                }
            }
            b"left" if self.lane_sections == 1 => self.lane_side = Some(LaneSide::Left),
            b"right" if self.lane_sections == 1 => self.lane_side = Some(LaneSide::Right),
            b"lane" => self.handle_lane(start),

            b"connection" => {
                if let Some(ref mut junction) = self.junction {
                    if let Some(connection) = parse_connection(start) {
                        junction.connections.push(connection);
                    }
                }
            }

            _ => {}
        }
    }

    fn handle_end(&mut self, end: &quick_xml::events::BytesEnd<'_>) -> Option<Feature> {
        match end.local_name().as_ref() {
            b"road" => return self.road.take().map(Feature::Road),
            b"junction" => return self.junction.take().map(Feature::Junction),

            b"planView" => self.in_plan_view = false,
            b"geometry" => {
                if let (Some(geometry), Some(ref mut road)) = (self.geometry.take(), &mut self.road)
                {
                    road.geometry.push(geometry);
                }
            }
            b"link" => self.in_road_link = false,
            b"lanes" => {
                self.in_lanes = false;
                self.lane_side = None;
            }
            b"left" | b"right" => self.lane_side = None,
            _ => {}
        }

        None
    }

    /// Handles a self-closing element: a complete empty road/junction, a
    /// childless geometry entry, or any of the leaf elements.
    fn handle_empty(&mut self, start: &quick_xml::events::BytesStart<'_>) -> Option<Feature> {
        match start.local_name().as_ref() {
            b"road" => {
                self.reset();
                return parse_road(start).map(Feature::Road);
            }
            b"junction" => {
                self.reset();
                return parse_junction(start).map(Feature::Junction);
            }
            b"geometry" if self.in_plan_view => {
                if let Some(ref mut road) = self.road {
                    road.geometry.push(parse_geometry(start));
                }
            }
            _ => {
                self.handle_start(start);
                // Section openers close again immediately when self-closing.
                match start.local_name().as_ref() {
                    b"planView" => self.in_plan_view = false,
                    b"link" => self.in_road_link = false,
                    b"lanes" => self.in_lanes = false,
                    b"left" | b"right" => self.lane_side = None,
                    _ => {}
                }
            }
        }

        None
    }

    fn handle_lane(&mut self, start: &quick_xml::events::BytesStart<'_>) {
        let Some(side) = self.lane_side else { return };
        let Some(ref mut road) = self.road else { return };

        let mut lane_type = defaults::LANE_TYPE.to_string();
        for attr in start.attributes() {
            let Ok(attr) = attr else { continue };
            if attr.key.as_ref() == b"type" {
                if let Ok(value) = from_utf8(&attr.value) {
                    lane_type = value.to_string();
                }
            }
        }

        if lane_type == "driving" {
            match side {
                LaneSide::Left => road.left_driving = true,
                LaneSide::Right => road.right_driving = true,
            }
        }
    }
}

fn get_f64(start: &quick_xml::events::BytesStart<'_>, key: &[u8], default: f64) -> f64 {
    for attr in start.attributes() {
        let Ok(attr) = attr else { continue };
        if attr.key.as_ref() == key {
            return from_utf8(&attr.value)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default);
        }
    }
    default
}

fn get_string(start: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Option<String> {
    for attr in start.attributes() {
        let Ok(attr) = attr else { continue };
        if attr.key.as_ref() == key {
            return from_utf8(&attr.value).ok().map(|s| s.to_string());
        }
    }
    None
}

fn parse_road(start: &quick_xml::events::BytesStart<'_>) -> Option<Road> {
    let Some(id) = get_string(start, b"id").filter(|id| !id.is_empty()) else {
        log::debug!("dropping road without an id");
        return None;
    };

    Some(Road {
        id,
        length: get_f64(start, b"length", defaults::ROAD_LENGTH),
        junction: get_string(start, b"junction")
            .unwrap_or_else(|| defaults::ROAD_JUNCTION.to_string()),
        geometry: Vec::default(),
        predecessor: None,
        successor: None,
        has_lane_section: false,
        left_driving: false,
        right_driving: false,
    })
}

fn parse_junction(start: &quick_xml::events::BytesStart<'_>) -> Option<Junction> {
    let Some(id) = get_string(start, b"id").filter(|id| !id.is_empty()) else {
        log::debug!("dropping junction without an id");
        return None;
    };

    Some(Junction {
        id,
        connections: Vec::default(),
    })
}

fn parse_geometry(start: &quick_xml::events::BytesStart<'_>) -> Geometry {
    Geometry {
        s: get_f64(start, b"s", defaults::GEOMETRY_S),
        x: get_f64(start, b"x", defaults::GEOMETRY_X),
        y: get_f64(start, b"y", defaults::GEOMETRY_Y),
        hdg: get_f64(start, b"hdg", defaults::GEOMETRY_HDG),
        length: get_f64(start, b"length", defaults::GEOMETRY_LENGTH),
        kind: GeometryKind::Other,
    }
}

fn parse_geometry_kind(start: &quick_xml::events::BytesStart<'_>) -> GeometryKind {
    match start.local_name().as_ref() {
        b"line" => GeometryKind::Line,
        b"arc" => GeometryKind::Arc {
            curvature: get_f64(start, b"curvature", defaults::ARC_CURVATURE),
        },
        _ => GeometryKind::Other,
    }
}

fn parse_link(start: &quick_xml::events::BytesStart<'_>) -> Option<Link> {
    let target = match get_string(start, b"elementType").as_deref() {
        Some("road") => LinkTarget::Road,
        Some("junction") => LinkTarget::Junction,
        _ => return None,
    };

    let element_id = get_string(start, b"elementId").filter(|id| !id.is_empty())?;

    let contact_point = match get_string(start, b"contactPoint") {
        Some(value) => ContactPoint::parse(value.as_bytes()),
        None => ContactPoint::default(),
    };

    Some(Link {
        target,
        element_id,
        contact_point,
    })
}

fn parse_connection(start: &quick_xml::events::BytesStart<'_>) -> Option<Connection> {
    let incoming_road = get_string(start, b"incomingRoad").filter(|id| !id.is_empty())?;
    let connecting_road = get_string(start, b"connectingRoad").filter(|id| !id.is_empty())?;

    let contact_point = match get_string(start, b"contactPoint") {
        Some(value) => ContactPoint::parse(value.as_bytes()),
        None => ContactPoint::default(),
    };

    Some(Connection {
        incoming_road,
        connecting_road,
        contact_point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_all(data: &[u8]) -> (Vec<Road>, Vec<Junction>) {
        let mut roads = Vec::default();
        let mut junctions = Vec::default();

        for f in Reader::from_buffer(data) {
            match f.expect("parse error") {
                Feature::Road(r) => roads.push(r),
                Feature::Junction(j) => junctions.push(j),
            }
        }

        (roads, junctions)
    }

    #[test]
    fn parses_road_geometry_and_links() {
        let (roads, _) = collect_all(
            br#"<OpenDRIVE>
              <road id="1" length="120.5" junction="-1">
                <link>
                  <predecessor elementType="road" elementId="7" contactPoint="end"/>
                  <successor elementType="junction" elementId="10"/>
                </link>
                <planView>
                  <geometry s="0.0" x="3.5" y="-2.0" hdg="0.25" length="100.0">
                    <line/>
                  </geometry>
                  <geometry s="100.0" x="99.0" y="20.0" hdg="0.3" length="20.5">
                    <arc curvature="0.02"/>
                  </geometry>
                </planView>
              </road>
            </OpenDRIVE>"#,
        );

        assert_eq!(roads.len(), 1);
        let road = &roads[0];
        assert_eq!(road.id, "1");
        assert_eq!(road.length, 120.5);
        assert_eq!(road.junction, "-1");
        assert_eq!(
            road.predecessor,
            Some(Link {
                target: LinkTarget::Road,
                element_id: "7".to_string(),
                contact_point: ContactPoint::End,
            })
        );
        assert_eq!(
            road.successor,
            Some(Link {
                target: LinkTarget::Junction,
                element_id: "10".to_string(),
                contact_point: ContactPoint::End,
            })
        );

        assert_eq!(road.geometry.len(), 2);
        assert_eq!(road.geometry[0].kind, GeometryKind::Line);
        assert_eq!(road.geometry[0].x, 3.5);
        assert_eq!(road.geometry[1].kind, GeometryKind::Arc { curvature: 0.02 });
        assert_eq!(road.geometry[1].length, 20.5);
    }

    #[test]
    fn missing_attributes_take_defaults() {
        let (roads, _) = collect_all(
            br#"<OpenDRIVE>
              <road id="5">
                <planView>
                  <geometry/>
                </planView>
              </road>
            </OpenDRIVE>"#,
        );

        assert_eq!(roads.len(), 1);
        assert_eq!(roads[0].length, 0.0);
        assert_eq!(roads[0].junction, "-1");
        assert_eq!(roads[0].geometry.len(), 1);
        assert_eq!(roads[0].geometry[0].kind, GeometryKind::Other);
        assert_eq!(roads[0].geometry[0].x, 0.0);
    }

    #[test]
    fn road_without_id_is_dropped() {
        let (roads, _) = collect_all(br#"<OpenDRIVE><road length="10"/></OpenDRIVE>"#);
        assert!(roads.is_empty());
    }

    #[test]
    fn lane_sections_decide_drivability() {
        let (roads, _) = collect_all(
            br#"<OpenDRIVE>
              <road id="1" length="50" junction="-1">
                <planView><geometry x="0" y="0" hdg="0" length="50"><line/></geometry></planView>
                <lanes>
                  <laneSection s="0">
                    <left>
                      <lane id="1" type="sidewalk"/>
                    </left>
                    <right>
                      <lane id="-1" type="driving"/>
                      <lane id="-2" type="shoulder"/>
                    </right>
                  </laneSection>
                  <laneSection s="25">
                    <left>
                      <lane id="1" type="driving"/>
                    </left>
                  </laneSection>
                </lanes>
              </road>
            </OpenDRIVE>"#,
        );

        assert_eq!(roads.len(), 1);
        assert!(roads[0].has_lane_section);
        // Only the first laneSection counts: left side is not drivable.
        assert!(!roads[0].left_driving);
        assert!(roads[0].right_driving);
    }

    #[test]
    fn lane_level_links_do_not_shadow_road_links() {
        let (roads, _) = collect_all(
            br#"<OpenDRIVE>
              <road id="1" length="50" junction="-1">
                <planView><geometry x="0" y="0" hdg="0" length="50"><line/></geometry></planView>
                <lanes>
                  <laneSection s="0">
                    <right>
                      <lane id="-1" type="driving">
                        <link>
                          <predecessor id="-1"/>
                        </link>
                      </lane>
                    </right>
                  </laneSection>
                </lanes>
              </road>
            </OpenDRIVE>"#,
        );

        assert_eq!(roads.len(), 1);
        assert_eq!(roads[0].predecessor, None);
    }

    #[test]
    fn parses_junction_connections() {
        let (_, junctions) = collect_all(
            br#"<OpenDRIVE>
              <junction id="10">
                <connection id="0" incomingRoad="1" connectingRoad="5" contactPoint="start">
                  <laneLink from="-1" to="-1"/>
                </connection>
                <connection id="1" incomingRoad="2" connectingRoad="6"/>
                <connection id="2" connectingRoad="7"/>
              </junction>
            </OpenDRIVE>"#,
        );

        assert_eq!(junctions.len(), 1);
        // The connection without an incoming road is unusable and dropped.
        assert_eq!(
            junctions[0].connections,
            vec![
                Connection {
                    incoming_road: "1".to_string(),
                    connecting_road: "5".to_string(),
                    contact_point: ContactPoint::Start,
                },
                Connection {
                    incoming_road: "2".to_string(),
                    connecting_road: "6".to_string(),
                    contact_point: ContactPoint::End,
                },
            ]
        );
    }
}
