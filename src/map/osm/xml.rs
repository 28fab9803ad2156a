// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::str::from_utf8;

use crate::map::xml::{BufParser, IoParser, Parser};

use super::model::{defaults, Feature, Node, Way};

/// Reader streams OSM [Features](Feature) from an XML document.
///
/// Missing optional attributes take the defaults from [defaults]; only a
/// structurally broken document surfaces an error. Nodes without an `id`
/// cannot be referenced and are dropped.
pub(super) struct Reader<P: Parser> {
    parser: P,
    eof: bool,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self { parser, eof: false }
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
        let mut f: Option<Feature> = None;

        while !self.eof {
            let event = match self.parser.read_event() {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };

            match event {
                quick_xml::events::Event::Empty(start) => match start.local_name().as_ref() {
                    b"node" => {
                        if let Some(n) = parse_node(start) {
                            return Some(Ok(Feature::Node(n)));
                        }
                    }
                    // "way" can't be self-closing - it would have no nodes
                    b"tag" => {
                        if let Some(Feature::Way(ref mut w)) = f {
                            if let Some((k, v)) = parse_tag(start) {
                                w.tags.insert(k, v);
                            }
                        }
                    }
                    b"nd" => {
                        if let Some(Feature::Way(ref mut w)) = f {
                            if let Some(ref_) = parse_nd(start) {
                                w.nodes.push(ref_);
                            }
                        }
                    }
                    _ => {}
                },

                quick_xml::events::Event::Start(start) => match start.local_name().as_ref() {
                    b"node" => f = parse_node(start).map(Feature::Node),
                    b"way" => f = Some(Feature::Way(parse_way(start))),
                    // "tag" and "nd" must be self-closing
                    _ => {}
                },

                quick_xml::events::Event::End(end) => match end.local_name().as_ref() {
                    b"node" | b"way" => {
                        if let Some(f) = f.take() {
                            return Some(Ok(f));
                        }
                    }
                    _ => {}
                },

                quick_xml::events::Event::Eof => {
                    self.eof = true;
                }

                _ => {}
            }
        }

        f.map(Ok)
    }
}

fn parse_f64(value: &[u8], default: f64) -> f64 {
    from_utf8(value)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn parse_node(start: quick_xml::events::BytesStart<'_>) -> Option<Node> {
    let mut id: Option<i64> = None;
    let mut lat = defaults::NODE_LAT;
    let mut lon = defaults::NODE_LON;
    let mut ele = defaults::NODE_ELE;

    for attr in start.attributes() {
        let Ok(attr) = attr else { continue };
        match attr.key.as_ref() {
            b"id" => id = from_utf8(&attr.value).ok().and_then(|s| s.parse().ok()),
            b"lat" => lat = parse_f64(&attr.value, defaults::NODE_LAT),
            b"lon" => lon = parse_f64(&attr.value, defaults::NODE_LON),
            b"ele" => ele = parse_f64(&attr.value, defaults::NODE_ELE),
            _ => {}
        }
    }

    match id {
        Some(id) => Some(Node { id, lat, lon, ele }),
        None => {
            log::debug!("dropping node without an id");
            None
        }
    }
}

fn parse_way(start: quick_xml::events::BytesStart<'_>) -> Way {
    let mut id = defaults::WAY_ID;

    for attr in start.attributes() {
        let Ok(attr) = attr else { continue };
        if attr.key.as_ref() == b"id" {
            id = from_utf8(&attr.value)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::WAY_ID);
        }
    }

    Way {
        id,
        nodes: Vec::default(),
        tags: HashMap::default(),
    }
}

fn parse_tag(start: quick_xml::events::BytesStart<'_>) -> Option<(String, String)> {
    let mut k = None;
    let mut v = None;

    for attr in start.attributes() {
        let Ok(attr) = attr else { continue };
        match attr.key.as_ref() {
            b"k" => k = from_utf8(&attr.value).ok().map(|s| s.to_string()),
            b"v" => v = from_utf8(&attr.value).ok().map(|s| s.to_string()),
            _ => {}
        }
    }

    k.map(|k| (k, v.unwrap_or_default()))
}

fn parse_nd(start: quick_xml::events::BytesStart<'_>) -> Option<i64> {
    for attr in start.attributes() {
        let Ok(attr) = attr else { continue };
        if attr.key.as_ref() == b"ref" {
            return from_utf8(&attr.value).ok().and_then(|s| s.parse().ok());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_all(data: &[u8]) -> (Vec<Node>, Vec<Way>) {
        let mut nodes = Vec::default();
        let mut ways = Vec::default();

        for f in Reader::from_buffer(data) {
            match f.expect("parse error") {
                Feature::Node(n) => nodes.push(n),
                Feature::Way(w) => ways.push(w),
            }
        }

        (nodes, ways)
    }

    #[test]
    fn parses_nodes_and_ways() {
        let (nodes, ways) = collect_all(
            br#"<?xml version="1.0"?>
            <osm>
              <node id="1" lat="52.1" lon="21.2" ele="110.5"/>
              <node id="2" lat="52.2" lon="21.3"/>
              <way id="10">
                <nd ref="1"/>
                <nd ref="2"/>
                <tag k="highway" v="residential"/>
                <tag k="oneway" v="yes"/>
              </way>
            </osm>"#,
        );

        assert_eq!(
            nodes,
            vec![
                Node { id: 1, lat: 52.1, lon: 21.2, ele: 110.5 },
                Node { id: 2, lat: 52.2, lon: 21.3, ele: 0.0 },
            ]
        );

        assert_eq!(ways.len(), 1);
        assert_eq!(ways[0].id, 10);
        assert_eq!(ways[0].nodes, vec![1, 2]);
        assert_eq!(ways[0].tags.get("highway").map(String::as_str), Some("residential"));
        assert_eq!(ways[0].tags.get("oneway").map(String::as_str), Some("yes"));
    }

    #[test]
    fn missing_coordinates_default_to_zero() {
        let (nodes, _) = collect_all(br#"<osm><node id="7"/></osm>"#);
        assert_eq!(nodes, vec![Node { id: 7, lat: 0.0, lon: 0.0, ele: 0.0 }]);
    }

    #[test]
    fn node_without_id_is_dropped() {
        let (nodes, _) = collect_all(br#"<osm><node lat="1.0" lon="2.0"/></osm>"#);
        assert!(nodes.is_empty());
    }

    #[test]
    fn node_with_children_is_parsed_from_start_event() {
        let (nodes, _) = collect_all(
            br#"<osm><node id="3" lat="1.5" lon="2.5"><tag k="amenity" v="bench"/></node></osm>"#,
        );
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, 3);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let result: Result<Vec<_>, _> =
            Reader::from_buffer(br#"<osm><way id="1"><nd ref="2"/></osm>"#).collect();
        assert!(result.is_err());
    }

    #[test]
    fn io_and_buffer_paths_agree() {
        const DATA: &[u8] =
            br#"<osm><node id="1" lat="1" lon="2"/><node id="2" lat="3" lon="4"/></osm>"#;
        let from_buf = collect_all(DATA);
        let mut nodes = Vec::default();
        for f in Reader::from_io(io::Cursor::new(DATA)) {
            if let Feature::Node(n) = f.unwrap() {
                nodes.push(n);
            }
        }
        assert_eq!(from_buf.0, nodes);
    }
}
