// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! [OpenDRIVE](https://www.asam.net/standards/detail/opendrive/) (`.xodr`)
//! graph builder.
//!
//! OpenDRIVE describes roads as parametric geometry rather than point
//! sequences, so the builder reconstructs a routable graph out of synthetic
//! nodes: two endpoints per road (projected from the plan-view geometry) and
//! one estimated centroid per junction.

use std::io;

use graph_builder::GraphBuilder;

use crate::GraphData;

use super::Error;

mod graph_builder;
mod model;
mod xml;

/// Builds a [GraphData] from OpenDRIVE XML read from the provided buffered stream.
pub(super) fn graph_from_io<R: io::BufRead>(reader: R) -> Result<GraphData, Error> {
    let mut builder = GraphBuilder::new();
    builder.add_features(xml::Reader::from_io(reader))?;
    Ok(builder.build())
}

/// Builds a [GraphData] from in-memory OpenDRIVE XML.
pub(super) fn graph_from_buffer(data: &[u8]) -> Result<GraphData, Error> {
    let mut builder = GraphBuilder::new();
    builder.add_features(xml::Reader::from_buffer(data))?;
    Ok(builder.build())
}
