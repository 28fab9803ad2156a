// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Fallback values for optional attributes of OSM XML elements, by element
/// kind. Missing attributes never fail the parse; they take these defaults.
pub(super) mod defaults {
    /// `node` element.
    pub const NODE_LON: f64 = 0.0;
    pub const NODE_LAT: f64 = 0.0;
    pub const NODE_ELE: f64 = 0.0;

    /// `way` element. Ids are only used for diagnostics.
    pub const WAY_ID: i64 = 0;
}

/// Represents an [OSM node](https://wiki.openstreetmap.org/wiki/Node).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub ele: f64,
}

/// Represents an [OSM way](https://wiki.openstreetmap.org/wiki/Way).
#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: i64,
    pub nodes: Vec<i64>,
    pub tags: HashMap<String, String>,
}

/// Union over the OSM features relevant for graph building. Relations carry
/// no road geometry and are not represented.
#[derive(Debug, Clone)]
pub enum Feature {
    Node(Node),
    Way(Way),
}
