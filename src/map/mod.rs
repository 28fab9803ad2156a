// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Map file loading: format dispatch and the per-format graph builders.
//!
//! [graph_from_file] is the single entry point: it inspects the file
//! extension (case-insensitively) and routes to the matching builder.
//! Parsing is deliberately permissive - missing optional attributes take
//! documented defaults and dangling references are dropped - but a
//! structurally invalid document aborts the build with no partial graph.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::GraphData;

mod osm;
mod xml;
mod xodr;

/// Format of an input map file, as determined by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFormat {
    /// Uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML) (`.osm`)
    Osm,

    /// [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression (`.osm.gz`)
    OsmGz,

    /// [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression (`.osm.bz2`)
    OsmBz2,

    /// [OpenDRIVE](https://www.asam.net/standards/detail/opendrive/) (`.xodr`)
    Xodr,
}

impl MapFormat {
    /// Determines the map format from a file path, case-insensitively.
    /// Unrecognized extensions are an [Error::UnsupportedFormat].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if name.ends_with(".osm.gz") {
            Ok(Self::OsmGz)
        } else if name.ends_with(".osm.bz2") {
            Ok(Self::OsmBz2)
        } else if name.ends_with(".osm") {
            Ok(Self::Osm)
        } else if name.ends_with(".xodr") {
            Ok(Self::Xodr)
        } else {
            let extension = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            Err(Error::UnsupportedFormat(extension))
        }
    }
}

/// Error conditions which may occur when loading a map file.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The file extension matches none of the supported [formats](MapFormat).
    #[error("unsupported map format: {0:?} (expected .osm, .osm.gz, .osm.bz2 or .xodr)")]
    UnsupportedFormat(String),

    /// The document is not well-formed XML. Nothing of the graph is kept.
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    /// The file could not be read.
    #[error(transparent)]
    Io(#[from] Arc<io::Error>),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(Arc::new(e))
    }
}

/// Parses the map file at the provided path into a [GraphData],
/// routing to a builder based on the file extension.
pub fn graph_from_file<P: AsRef<Path>>(path: P) -> Result<GraphData, Error> {
    let format = MapFormat::from_path(&path)?;
    let file = File::open(path)?;
    graph_from_io(format, file)
}

/// Parses map data in the given format from a reader into a [GraphData].
///
/// The provided stream is wrapped in a buffered reader (and a decompressor,
/// for the compressed formats) as needed.
pub fn graph_from_io<R: io::Read>(format: MapFormat, reader: R) -> Result<GraphData, Error> {
    match format {
        MapFormat::Osm => osm::graph_from_io(io::BufReader::new(reader)),
        MapFormat::OsmGz => {
            let d = flate2::read::MultiGzDecoder::new(reader);
            osm::graph_from_io(io::BufReader::new(d))
        }
        MapFormat::OsmBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(reader);
            osm::graph_from_io(io::BufReader::new(d))
        }
        MapFormat::Xodr => xodr::graph_from_io(io::BufReader::new(reader)),
    }
}

/// Parses map data in the given format from a static buffer into a [GraphData].
pub fn graph_from_buffer(format: MapFormat, data: &[u8]) -> Result<GraphData, Error> {
    match format {
        // Fast paths are available for in-memory XML data
        MapFormat::Osm => osm::graph_from_buffer(data),
        MapFormat::Xodr => xodr::graph_from_buffer(data),

        // Compressed data takes the IO path through a cursor
        MapFormat::OsmGz | MapFormat::OsmBz2 => graph_from_io(format, io::Cursor::new(data)),
    }
}
