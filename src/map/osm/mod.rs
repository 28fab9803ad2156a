// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! [OpenStreetMap XML](https://wiki.openstreetmap.org/wiki/OSM_XML) graph builder.

use std::io;

use graph_builder::GraphBuilder;

use crate::GraphData;

use super::Error;

mod graph_builder;
mod model;
mod xml;

/// Builds a [GraphData] from OSM XML read from the provided buffered stream.
pub(super) fn graph_from_io<R: io::BufRead>(reader: R) -> Result<GraphData, Error> {
    let mut builder = GraphBuilder::new();
    builder.add_features(xml::Reader::from_io(reader))?;
    Ok(builder.build())
}

/// Builds a [GraphData] from in-memory OSM XML.
pub(super) fn graph_from_buffer(data: &[u8]) -> Result<GraphData, Error> {
    let mut builder = GraphBuilder::new();
    builder.add_features(xml::Reader::from_buffer(data))?;
    Ok(builder.build())
}
