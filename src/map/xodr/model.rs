// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Fallback values for optional attributes of OpenDRIVE XML elements, by
/// element kind. Missing attributes never fail the parse; they take these
/// defaults. Numeric attributes are parsed with [str::parse], which always
/// uses the `.` decimal separator.
pub(super) mod defaults {
    /// `road` element. A junction id of `-1` marks a road outside of any junction.
    pub const ROAD_LENGTH: f64 = 0.0;
    pub const ROAD_JUNCTION: &str = "-1";

    /// `planView/geometry` element.
    pub const GEOMETRY_S: f64 = 0.0;
    pub const GEOMETRY_X: f64 = 0.0;
    pub const GEOMETRY_Y: f64 = 0.0;
    pub const GEOMETRY_HDG: f64 = 0.0;
    pub const GEOMETRY_LENGTH: f64 = 0.0;

    /// `arc` element.
    pub const ARC_CURVATURE: f64 = 0.0;

    /// `lane` element.
    pub const LANE_TYPE: &str = "";
}

/// Which end of a road an OpenDRIVE link or junction connection attaches to.
///
/// Anything other than an explicit `start` (including a missing attribute)
/// resolves to [ContactPoint::End].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactPoint {
    Start,
    #[default]
    End,
}

impl ContactPoint {
    pub fn parse(value: &[u8]) -> Self {
        match value {
            b"start" => Self::Start,
            _ => Self::End,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// What kind of element a road-level link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    Road,
    Junction,
}

/// A road's `link/predecessor` or `link/successor` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub target: LinkTarget,
    pub element_id: String,
    pub contact_point: ContactPoint,
}

/// A single `planView/geometry` entry of a road.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub hdg: f64,
    pub length: f64,
    pub kind: GeometryKind,
}

/// The parametric shape of a [Geometry] entry. Shapes this crate does not
/// reconstruct exactly (spirals, polynomials, ...) are [GeometryKind::Other]
/// and get the straight-line treatment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryKind {
    Line,
    Arc { curvature: f64 },
    Other,
}

/// Represents an OpenDRIVE `road` element, reduced to what graph
/// construction needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    pub id: String,
    pub length: f64,
    /// Id of the junction this road belongs to, `-1` for none.
    pub junction: String,
    pub geometry: Vec<Geometry>,
    pub predecessor: Option<Link>,
    pub successor: Option<Link>,
    /// Whether the road's first `laneSection` was present at all, and whether
    /// it carries a `driving` lane on each side. A road with a lane section
    /// is treated as one-way unless both sides can be driven on.
    pub has_lane_section: bool,
    pub left_driving: bool,
    pub right_driving: bool,
}

/// A `junction/connection` entry: the incoming road joins the connecting
/// road at the given contact point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub incoming_road: String,
    pub connecting_road: String,
    pub contact_point: ContactPoint,
}

/// Represents an OpenDRIVE `junction` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Junction {
    pub id: String,
    pub connections: Vec<Connection>,
}

/// Union over the OpenDRIVE features relevant for graph building.
#[derive(Debug, Clone)]
pub enum Feature {
    Road(Road),
    Junction(Junction),
}
