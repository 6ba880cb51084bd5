//! OpenStreetMap PBF ingestion.
//!
//! Blocks are decoded in parallel by `osmpbf`. Node coordinates from every
//! block are kept until all blocks are merged, because a way may reference
//! nodes stored in a later block.

use camino::{Utf8Path, Utf8PathBuf};
use geo::{Coord, Rect};
use log::{info, warn};
use osmpbf::ElementReader;
use streetscape_core::{BoundingBox, OsmElement};
use thiserror::Error;

mod accumulator;
mod tags;

use accumulator::OsmElementAccumulator;

/// Summary of raw OSM elements discovered during ingestion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OsmIngestSummary {
    /// Number of nodes discovered, including dense-node entries.
    pub nodes: u64,
    /// Number of ways discovered.
    pub ways: u64,
    /// Number of relations discovered. Relations are counted, not mapped.
    pub relations: u64,
    /// Bounding box covering all valid node coordinates.
    /// Coordinates are WGS84 with `x = longitude`, `y = latitude`.
    pub bounds: Option<Rect<f64>>,
}

impl OsmIngestSummary {
    fn combine(mut self, other: Self) -> Self {
        self.nodes += other.nodes;
        self.ways += other.ways;
        self.relations += other.relations;
        if let Some(bounds) = other.bounds {
            self.include_bounds(bounds);
        }
        self
    }

    fn include_bounds(&mut self, bounds: Rect<f64>) {
        match &mut self.bounds {
            Some(existing) => {
                let min = Coord {
                    x: existing.min().x.min(bounds.min().x),
                    y: existing.min().y.min(bounds.min().y),
                };
                let max = Coord {
                    x: existing.max().x.max(bounds.max().x),
                    y: existing.max().y.max(bounds.max().y),
                };
                *existing = Rect::new(min, max);
            }
            None => self.bounds = Some(bounds),
        }
    }

    fn record_node(&mut self, location: Option<Coord<f64>>) {
        self.nodes += 1;
        if let Some(coord) = location {
            self.include_bounds(Rect::new(coord, coord));
        }
    }

    fn record_way(&mut self) {
        self.ways += 1;
    }

    fn record_relation(&mut self) {
        self.relations += 1;
    }
}

/// Elements loaded for one bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct OsmLoadReport {
    /// Counts over the whole file.
    pub summary: OsmIngestSummary,
    /// Tagged elements touching the box, in WGS84, sorted by id.
    pub elements: Vec<OsmElement>,
    /// Tagged ways dropped for an unresolved node reference or fewer than
    /// two nodes.
    pub skipped_ways: u64,
}

/// Errors returned when ingesting an OSM PBF file.
#[derive(Debug, Error)]
pub enum OsmIngestError {
    /// The file could not be opened.
    #[error("failed to open OSM PBF file at {path}")]
    Open {
        /// Underlying reader error.
        #[source]
        source: osmpbf::Error,
        /// File that was requested.
        path: Utf8PathBuf,
    },
    /// The file opened but its blocks could not be decoded.
    #[error("failed to decode OSM PBF data at {path}")]
    Decode {
        /// Underlying decoder error.
        #[source]
        source: osmpbf::Error,
        /// File being decoded.
        path: Utf8PathBuf,
    },
}

/// Load the tagged elements of a PBF extract that touch `bbox`.
///
/// `bbox` is in WGS84 degrees. Tagged nodes become points; tagged ways
/// become areas when closed with at least four references and lines
/// otherwise. Ways referencing nodes missing from the file are skipped.
///
/// # Errors
/// Returns [`OsmIngestError::Open`] when the file cannot be opened and
/// [`OsmIngestError::Decode`] when a block is malformed.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use streetscape_core::BoundingBox;
/// use streetscape_data::load_osm_elements;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bbox: BoundingBox = "16.36,48.20,16.38,48.22".parse()?;
/// let report = load_osm_elements(Utf8Path::new("vienna.osm.pbf"), &bbox)?;
/// println!("Loaded {} elements", report.elements.len());
/// # Ok(())
/// # }
/// ```
pub fn load_osm_elements(
    path: &Utf8Path,
    bbox: &BoundingBox,
) -> Result<OsmLoadReport, OsmIngestError> {
    let reader = ElementReader::from_path(path).map_err(|source| OsmIngestError::Open {
        source,
        path: path.to_path_buf(),
    })?;

    let accumulator = reader
        .par_map_reduce(
            |element| {
                let mut accumulator = OsmElementAccumulator::default();
                accumulator.process_element(element);
                accumulator
            },
            OsmElementAccumulator::default,
            OsmElementAccumulator::combine,
        )
        .map_err(|source| OsmIngestError::Decode {
            source,
            path: path.to_path_buf(),
        })?;

    let report = accumulator.into_report(bbox);
    if report.skipped_ways > 0 {
        warn!(
            "Skipped {} way(s) with node references missing from {path}",
            report.skipped_ways
        );
    }
    info!(
        "Read {} nodes, {} ways and {} relations from {path}; {} element(s) touch the box",
        report.summary.nodes,
        report.summary.ways,
        report.summary.relations,
        report.elements.len()
    );
    Ok(report)
}
